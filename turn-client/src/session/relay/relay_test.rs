use std::net::SocketAddr;
use std::str::FromStr;

use tokio::sync::mpsc;

use super::*;
use crate::session::{timer, SessionEvent, TimerKind};

fn arm(events: &mpsc::Sender<SessionEvent>, kind: TimerKind) -> TimerHandle {
    timer::schedule(events.clone(), Duration::from_secs(300), kind)
}

#[tokio::test]
async fn test_activation_invariant() {
    let (events, _rx) = mpsc::channel(1);
    let mut relay = Relay::default();

    assert!(!relay.is_active());
    assert!(relay.lifetime.is_none());
    assert!(relay.timer.is_none());

    let addr = SocketAddr::from_str("198.51.100.7:49160").unwrap();
    relay.activate(
        addr,
        Duration::from_secs(30),
        arm(&events, TimerKind::Allocation),
    );

    // address, lifetime and timer are all present together
    assert!(relay.is_active());
    assert_eq!(relay.relayed_addr, Some(addr));
    assert_eq!(relay.lifetime, Some(Duration::from_secs(30)));
    assert!(relay.timer.is_some());

    relay.clear();
    assert!(!relay.is_active());
    assert!(relay.relayed_addr.is_none());
    assert!(relay.lifetime.is_none());
    assert!(relay.timer.is_none());
    assert!(relay.permissions.is_empty());
}

#[tokio::test]
async fn test_permission_install_and_ack() {
    let (events, _rx) = mpsc::channel(1);
    let mut relay = Relay::default();

    let peer_a = IpAddr::from_str("203.0.113.4").unwrap();
    let peer_b = IpAddr::from_str("203.0.113.5").unwrap();
    let id = stun::message::TransactionId::new();

    relay.install_permission(peer_a, id);
    relay.install_permission(peer_b, id);

    // un-acked permissions do not allow sending
    assert!(!relay.has_acked_permission(peer_a));
    assert!(!relay.has_acked_permission(peer_b));
    assert!(relay.permissions[&peer_a].timer.is_none());

    let acked = relay.ack_permissions(id, |ip| arm(&events, TimerKind::Permission(ip)));
    assert_eq!(acked.len(), 2);
    assert!(relay.has_acked_permission(peer_a));
    assert!(relay.has_acked_permission(peer_b));
    // acked implies an expiry timer
    assert!(relay.permissions[&peer_a].timer.is_some());
    assert!(relay.permissions[&peer_b].timer.is_some());
}

#[tokio::test]
async fn test_ack_only_matching_transaction() {
    let (events, _rx) = mpsc::channel(1);
    let mut relay = Relay::default();

    let peer_a = IpAddr::from_str("203.0.113.4").unwrap();
    let peer_b = IpAddr::from_str("203.0.113.5").unwrap();
    let first = stun::message::TransactionId::new();
    let second = stun::message::TransactionId::new();

    relay.install_permission(peer_a, first);
    relay.install_permission(peer_b, second);

    let acked = relay.ack_permissions(second, |ip| arm(&events, TimerKind::Permission(ip)));
    assert_eq!(acked, vec![peer_b]);
    assert!(!relay.has_acked_permission(peer_a));
    assert!(relay.has_acked_permission(peer_b));
}

#[tokio::test]
async fn test_permission_expiry_ignores_stale_seq() {
    let (events, _rx) = mpsc::channel(1);
    let mut relay = Relay::default();

    let peer = IpAddr::from_str("203.0.113.4").unwrap();
    let id = stun::message::TransactionId::new();
    relay.install_permission(peer, id);
    relay.ack_permissions(id, |ip| arm(&events, TimerKind::Permission(ip)));

    let current_seq = relay.permissions[&peer].timer.as_ref().unwrap().seq();

    // a fire from a timer that was since replaced is ignored
    assert!(!relay.expire_permission(peer, current_seq + 1));
    assert!(relay.has_acked_permission(peer));

    assert!(relay.expire_permission(peer, current_seq));
    assert!(!relay.has_acked_permission(peer));
    assert!(!relay.permissions.contains_key(&peer));
}

#[tokio::test]
async fn test_reinstall_keeps_acked_state_until_response() {
    let (events, _rx) = mpsc::channel(1);
    let mut relay = Relay::default();

    let peer = IpAddr::from_str("203.0.113.4").unwrap();
    let first = stun::message::TransactionId::new();
    relay.install_permission(peer, first);
    relay.ack_permissions(first, |ip| arm(&events, TimerKind::Permission(ip)));

    // a refresh re-tags the permission with the new transaction
    let second = stun::message::TransactionId::new();
    relay.install_permission(peer, second);
    assert!(relay.has_acked_permission(peer));
    assert_eq!(relay.permissions[&peer].transaction_id, second);
}
