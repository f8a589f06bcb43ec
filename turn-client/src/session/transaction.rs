#[cfg(test)]
mod transaction_test;

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use stun::message::TransactionId;
use tokio::sync::oneshot;
use tokio::time::Instant;

use super::timer::TimerHandle;
use crate::error::*;

/// What the session does with the matching response, tagged by the
/// request method that opened the transaction.
#[derive(Debug)]
pub(crate) enum TransactionKind {
    Binding,
    Allocate,
    Refresh,
    CreatePermission { peers: Vec<IpAddr> },
}

/// One-shot reply channel back to the suspended caller.
#[derive(Debug)]
pub(crate) enum Reply {
    Addr(oneshot::Sender<Result<SocketAddr>>),
    Unit(oneshot::Sender<Result<()>>),
}

impl Reply {
    pub(crate) fn fail(self, err: Error) {
        match self {
            Reply::Addr(tx) => {
                let _ = tx.send(Err(err));
            }
            Reply::Unit(tx) => {
                let _ = tx.send(Err(err));
            }
        }
    }
}

/// An in-flight request awaiting its response.
#[derive(Debug)]
pub(crate) struct Transaction {
    pub(crate) kind: TransactionKind,
    pub(crate) reply: Reply,
    pub(crate) timer: TimerHandle,
    pub(crate) sent_at: Instant,
}

/// Outstanding transactions keyed by their 96-bit id.
#[derive(Default, Debug)]
pub(crate) struct TransactionMap {
    map: HashMap<TransactionId, Transaction>,
}

impl TransactionMap {
    pub(crate) fn new() -> TransactionMap {
        TransactionMap {
            map: HashMap::new(),
        }
    }

    /// Draws a fresh id, re-drawing on collision with an in-flight one.
    pub(crate) fn new_id(&self) -> TransactionId {
        loop {
            let id = TransactionId::new();
            if !self.map.contains_key(&id) {
                return id;
            }
        }
    }

    pub(crate) fn insert(&mut self, id: TransactionId, tr: Transaction) {
        self.map.insert(id, tr);
    }

    pub(crate) fn contains(&self, id: &TransactionId) -> bool {
        self.map.contains_key(id)
    }

    pub(crate) fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.map.get(id)
    }

    pub(crate) fn remove(&mut self, id: &TransactionId) -> Option<Transaction> {
        self.map.remove(id)
    }

    /// Fails every outstanding transaction, used on session teardown.
    pub(crate) fn fail_all(&mut self, err: impl Fn() -> Error) {
        for (_, tr) in self.map.drain() {
            tr.timer.cancel();
            tr.reply.fail(err());
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
