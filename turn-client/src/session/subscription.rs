
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Payload of an inbound data indication delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indication {
    pub from: SocketAddr,
    pub data: Vec<u8>,
}

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

/// A local consumer of data indications.
///
/// Wraps the sending half of a channel; the session considers the
/// subscriber dead when the receiving half is dropped, and removes all
/// of its subscriptions.
#[derive(Debug, Clone)]
pub struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Indication>,
}

impl Subscriber {
    /// Creates a subscriber and the receiver its indications arrive on.
    pub fn new() -> (Subscriber, mpsc::Receiver<Indication>) {
        Subscriber::with_capacity(DEFAULT_SUBSCRIBER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Subscriber, mpsc::Receiver<Indication>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Subscriber {
                id: NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed),
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn sender(&self) -> &mpsc::Sender<Indication> {
        &self.tx
    }
}

/// Cancellable handle of one (peer, subscriber) liveness watch.
#[derive(Debug)]
pub(crate) struct Watch {
    token: CancellationToken,
}

impl Watch {
    pub(crate) fn new(token: CancellationToken) -> Watch {
        Watch { token }
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug)]
struct SubEntry {
    subscriber: Subscriber,
    watch: Watch,
}

/// Subscribers keyed by peer IP, then by subscriber id.
///
/// An inner map never stays empty: the last unsubscribe removes the
/// outer entry. Each (peer, subscriber) pair has exactly one watch.
#[derive(Default, Debug)]
pub(crate) struct SubscriptionTable {
    map: HashMap<IpAddr, HashMap<u64, SubEntry>>,
}

impl SubscriptionTable {
    pub(crate) fn new() -> SubscriptionTable {
        SubscriptionTable {
            map: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, peer: IpAddr, subscriber: Subscriber, watch: Watch) {
        self.map
            .entry(peer)
            .or_default()
            .insert(subscriber.id(), SubEntry { subscriber, watch });
    }

    /// Removes one (peer, subscriber) pair. A no-op when absent.
    pub(crate) fn remove(&mut self, peer: IpAddr, subscriber_id: u64) {
        if let Some(inner) = self.map.get_mut(&peer) {
            inner.remove(&subscriber_id);
            if inner.is_empty() {
                self.map.remove(&peer);
            }
        }
    }

    /// Removes a dead subscriber from every peer it was subscribed to.
    pub(crate) fn remove_subscriber(&mut self, subscriber_id: u64) {
        self.map.retain(|_, inner| {
            inner.remove(&subscriber_id);
            !inner.is_empty()
        });
    }

    pub(crate) fn contains(&self, peer: IpAddr, subscriber_id: u64) -> bool {
        self.map
            .get(&peer)
            .map(|inner| inner.contains_key(&subscriber_id))
            .unwrap_or(false)
    }

    /// Delivers `indication` to every live subscriber of `peer`.
    pub(crate) fn dispatch(&self, peer: IpAddr, indication: &Indication) {
        let Some(inner) = self.map.get(&peer) else {
            return;
        };
        for entry in inner.values() {
            if entry.subscriber.sender().try_send(indication.clone()).is_err() {
                log::warn!("subscriber {} receive buffer full", entry.subscriber.id());
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
