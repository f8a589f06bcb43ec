use tokio::sync::mpsc;
use tokio::time::Duration;

use super::*;
use crate::session::{timer, SessionEvent, TimerKind};

fn schedule_noop(events: &mpsc::Sender<SessionEvent>, id: TransactionId) -> TimerHandle {
    timer::schedule(
        events.clone(),
        Duration::from_secs(60),
        TimerKind::Transaction(id),
    )
}

#[tokio::test]
async fn test_new_id_avoids_in_flight_collision() {
    let (events, _rx) = mpsc::channel(1);
    let mut map = TransactionMap::new();

    let id = map.new_id();
    let (tx, _reply_rx) = tokio::sync::oneshot::channel();
    map.insert(
        id,
        Transaction {
            kind: TransactionKind::Binding,
            reply: Reply::Addr(tx),
            timer: schedule_noop(&events, id),
            sent_at: Instant::now(),
        },
    );

    let other = map.new_id();
    assert_ne!(other, id);
}

#[tokio::test]
async fn test_insert_remove() {
    let (events, _rx) = mpsc::channel(1);
    let mut map = TransactionMap::new();
    assert!(map.is_empty());

    let id = map.new_id();
    let (tx, mut reply_rx) = tokio::sync::oneshot::channel();
    map.insert(
        id,
        Transaction {
            kind: TransactionKind::Refresh,
            reply: Reply::Unit(tx),
            timer: schedule_noop(&events, id),
            sent_at: Instant::now(),
        },
    );
    assert_eq!(map.len(), 1);
    assert!(map.contains(&id));

    let tr = map.remove(&id).expect("transaction should be present");
    assert!(map.is_empty());
    assert!(map.remove(&id).is_none());

    tr.reply.fail(Error::ErrTimeout);
    assert_eq!(reply_rx.try_recv().unwrap(), Err(Error::ErrTimeout));
}

#[tokio::test]
async fn test_fail_all_replies_to_every_waiter() {
    let (events, _rx) = mpsc::channel(1);
    let mut map = TransactionMap::new();

    let mut receivers = vec![];
    for _ in 0..3 {
        let id = map.new_id();
        let (tx, rx) = tokio::sync::oneshot::channel();
        map.insert(
            id,
            Transaction {
                kind: TransactionKind::Refresh,
                reply: Reply::Unit(tx),
                timer: schedule_noop(&events, id),
                sent_at: Instant::now(),
            },
        );
        receivers.push(rx);
    }

    map.fail_all(|| Error::ErrClosed);
    assert!(map.is_empty());

    for mut rx in receivers {
        assert_eq!(rx.try_recv().unwrap(), Err(Error::ErrClosed));
    }
}
