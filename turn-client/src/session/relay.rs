#[cfg(test)]
mod relay_test;

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use stun::message::TransactionId;

use super::timer::TimerHandle;

/// A client-side permission for one peer IP.
///
/// Installed un-acked when the CREATE-PERMISSION request goes out; the
/// matching success response flips it to acked and arms the expiry
/// timer. Sending to a peer requires an acked entry for its IP (the
/// port does not participate in the match).
#[derive(Debug)]
pub(crate) struct Permission {
    /// Last transaction that installed or refreshed this permission.
    pub(crate) transaction_id: TransactionId,
    pub(crate) acked: bool,
    pub(crate) timer: Option<TimerHandle>,
}

/// Relayed-allocation state. At most one allocation per session.
///
/// `relayed_addr`, `lifetime` and `timer` are all present or all absent:
/// the allocation timer exists exactly while the allocation does.
#[derive(Default, Debug)]
pub(crate) struct Relay {
    pub(crate) relayed_addr: Option<SocketAddr>,
    pub(crate) lifetime: Option<Duration>,
    pub(crate) timer: Option<TimerHandle>,
    pub(crate) permissions: HashMap<IpAddr, Permission>,
}

impl Relay {
    pub(crate) fn is_active(&self) -> bool {
        self.relayed_addr.is_some()
    }

    /// Records a fresh (or refreshed) allocation and its lifetime timer.
    pub(crate) fn activate(&mut self, addr: SocketAddr, lifetime: Duration, timer: TimerHandle) {
        self.relayed_addr = Some(addr);
        self.lifetime = Some(lifetime);
        self.timer = Some(timer); // replacing the handle cancels the old timer
    }

    /// Re-arms the allocation timer after a successful refresh.
    pub(crate) fn refresh(&mut self, lifetime: Duration, timer: TimerHandle) {
        self.lifetime = Some(lifetime);
        self.timer = Some(timer);
    }

    /// Reverts to the empty state: allocation gone, every permission
    /// dropped and its timer cancelled. No network message is sent.
    pub(crate) fn clear(&mut self) {
        self.relayed_addr = None;
        self.lifetime = None;
        self.timer = None;
        self.permissions.clear();
    }

    /// Installs an un-acked permission for `ip` under `id`, or re-tags
    /// an existing one with the new transaction id.
    pub(crate) fn install_permission(&mut self, ip: IpAddr, id: TransactionId) {
        match self.permissions.get_mut(&ip) {
            Some(p) => p.transaction_id = id,
            None => {
                self.permissions.insert(
                    ip,
                    Permission {
                        transaction_id: id,
                        acked: false,
                        timer: None,
                    },
                );
            }
        }
    }

    /// Acks every permission installed under `id`, arming a fresh expiry
    /// timer for each via `arm`. Returns the acked peer IPs.
    pub(crate) fn ack_permissions(
        &mut self,
        id: TransactionId,
        mut arm: impl FnMut(IpAddr) -> TimerHandle,
    ) -> Vec<IpAddr> {
        let mut acked = vec![];
        for (ip, p) in self.permissions.iter_mut() {
            if p.transaction_id == id {
                p.acked = true;
                p.timer = Some(arm(*ip)); // old timer, if any, is cancelled on replace
                acked.push(*ip);
            }
        }
        acked
    }

    /// Removes the permission for `ip` if its expiry timer still is the
    /// one that fired (`seq`). A stale fire is ignored.
    pub(crate) fn expire_permission(&mut self, ip: IpAddr, seq: u64) -> bool {
        let matches = self
            .permissions
            .get(&ip)
            .and_then(|p| p.timer.as_ref())
            .map(|t| t.seq() == seq)
            .unwrap_or(false);
        if matches {
            self.permissions.remove(&ip);
        }
        matches
    }

    /// True if sending to `ip` is allowed: an acked permission exists.
    pub(crate) fn has_acked_permission(&self, ip: IpAddr) -> bool {
        self.permissions.get(&ip).map(|p| p.acked).unwrap_or(false)
    }
}
