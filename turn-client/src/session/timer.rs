use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{SessionEvent, TimerKind};

static NEXT_TIMER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Cancellable handle of a scheduled timer.
///
/// The handle is stored alongside the state it guards; dropping or
/// cancelling it stops the timer task before it can fire. A fire that
/// was already queued when the handle went away is detected by the
/// sequence number: the event loop compares the event's `seq` against
/// the handle it currently holds and ignores stale fires.
#[derive(Debug)]
pub(crate) struct TimerHandle {
    seq: u64,
    token: CancellationToken,
}

impl TimerHandle {
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Schedules `kind` to fire on the session event queue after `delay`.
pub(crate) fn schedule(
    events: mpsc::Sender<SessionEvent>,
    delay: Duration,
    kind: TimerKind,
) -> TimerHandle {
    let seq = NEXT_TIMER_SEQ.fetch_add(1, Ordering::Relaxed);
    let token = CancellationToken::new();
    let fire = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = fire.cancelled() => {}
            _ = tokio::time::sleep(delay) => {
                let _ = events.send(SessionEvent::Timer { kind, seq }).await;
            }
        }
    });

    TimerHandle { seq, token }
}
