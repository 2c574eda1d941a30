//! Single-slot debounce timer
//!
//! At most one timer is pending. Arming a new timer cancels the pending one;
//! each arm gets a fresh [`TimerId`] so cancellation is observable.

use std::fmt;
use std::future::pending;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Instant, Sleep};

/// Identifier of one armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

struct PendingTimer {
    id: TimerId,
    sleep: Pin<Box<Sleep>>,
}

pub struct Debouncer {
    delay: Duration,
    next_id: u64,
    pending: Option<PendingTimer>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm a timer `delay` from now, cancelling any pending one
    pub fn arm(&mut self) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);

        if let Some(previous) = self.pending.take() {
            tracing::trace!(cancelled = %previous.id, armed = %id, "Re-arming debounce timer");
        }

        self.pending = Some(PendingTimer {
            id,
            sleep: Box::pin(sleep(self.delay)),
        });
        id
    }

    /// Cancel the pending timer, if any
    pub fn cancel(&mut self) -> Option<TimerId> {
        self.pending.take().map(|timer| timer.id)
    }

    /// The pending timer, if one is armed and has not fired
    pub fn pending(&self) -> Option<TimerId> {
        self.pending.as_ref().map(|timer| timer.id)
    }

    /// When the pending timer fires
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|timer| timer.sleep.deadline())
    }

    /// Resolve when the pending timer fires, disarming it.
    ///
    /// Never resolves while nothing is armed. Cancel safe: dropping the future
    /// leaves the timer pending.
    pub async fn fired(&mut self) -> TimerId {
        match self.pending.as_mut() {
            Some(timer) => {
                timer.sleep.as_mut().await;
                let id = timer.id;
                self.pending = None;
                id
            }
            None => pending().await,
        }
    }
}

impl fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_pending() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        assert_eq!(debouncer.pending(), None);

        let first = debouncer.arm();
        let second = debouncer.arm();

        assert!(second > first);
        assert_eq!(debouncer.pending(), Some(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let start = Instant::now();

        debouncer.arm();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let last = debouncer.arm();

        assert_eq!(debouncer.fired().await, last);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(800));
        assert!(elapsed < Duration::from_millis(810));
        assert_eq!(debouncer.pending(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_disarms() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let id = debouncer.arm();

        assert_eq!(debouncer.cancel(), Some(id));
        assert_eq!(debouncer.cancel(), None);

        let fired =
            tokio::time::timeout(Duration::from_secs(5), debouncer.fired()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_wait_keeps_timer() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let id = debouncer.arm();

        let early = tokio::time::timeout(Duration::from_millis(100), debouncer.fired()).await;
        assert!(early.is_err());
        assert_eq!(debouncer.pending(), Some(id));

        assert_eq!(debouncer.fired().await, id);
    }
}
