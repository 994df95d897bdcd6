//! Input debouncing and stale-response suppression for food search.
//!
//! [`Debouncer`] waits for the input to go quiet before handing back the most
//! recent value. [`LatestOnly`] hands out increasing tickets so that when
//! several searches are in flight, only the newest may publish its results;
//! a slow early response can no longer overwrite a fast later one.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Collapses bursts of input into their last value.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    interval: Duration,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block for the next settled value.
    ///
    /// Waits for one value, then keeps replacing it while new values arrive
    /// within `interval` of each other. Returns the last one once the input
    /// has been quiet for `interval`, or when the sender hangs up. Returns
    /// `None` only when the channel is closed with nothing pending.
    pub fn next<T>(&self, rx: &Receiver<T>) -> Option<T> {
        let mut latest = rx.recv().ok()?;
        loop {
            match rx.recv_timeout(self.interval) {
                Ok(value) => latest = value,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return Some(latest);
                }
            }
        }
    }
}

/// Ticket issued by [`LatestOnly::issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Sequence guard: only the most recently issued ticket is current.
#[derive(Debug, Default)]
pub struct LatestOnly {
    issued: Mutex<u64>,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    fn latest(&self) -> MutexGuard<'_, u64> {
        self.issued.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new request; every earlier ticket becomes stale.
    pub fn issue(&self) -> Ticket {
        let mut latest = self.latest();
        *latest += 1;
        Ticket(*latest)
    }

    /// Whether `ticket` is still the newest one.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        *self.latest() == ticket.0
    }

    /// Run `publish` only if `ticket` is still the newest one.
    ///
    /// The guard stays locked while `publish` runs, so no ticket can be
    /// issued between the check and the output.
    pub fn publish_if_current(&self, ticket: Ticket, publish: impl FnOnce()) -> bool {
        let latest = self.latest();
        if *latest != ticket.0 {
            return false;
        }
        publish();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    #[test]
    fn burst_collapses_to_last_value() {
        let (tx, rx) = mpsc::channel();
        for q in ["a", "ap", "app", "appl", "apple"] {
            tx.send(q.to_string()).unwrap();
        }
        drop(tx);

        let debouncer = Debouncer::from_millis(50);
        assert_eq!(debouncer.next(&rx).as_deref(), Some("apple"));
        assert_eq!(debouncer.next(&rx), None);
    }

    #[test]
    fn quiet_gap_separates_values() {
        let (tx, rx) = mpsc::channel();
        let sender = thread::spawn(move || {
            tx.send("rice").unwrap();
            thread::sleep(Duration::from_millis(150));
            tx.send("beans").unwrap();
        });

        let debouncer = Debouncer::from_millis(40);
        assert_eq!(debouncer.next(&rx), Some("rice"));
        assert_eq!(debouncer.next(&rx), Some("beans"));
        sender.join().unwrap();
        assert_eq!(debouncer.next(&rx), None);
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let guard = LatestOnly::new();
        let first = guard.issue();
        assert!(guard.is_current(first));

        let second = guard.issue();
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn late_response_from_stale_ticket_is_dropped() {
        let guard = std::sync::Arc::new(LatestOnly::new());
        let slow = guard.issue();
        let fast = guard.issue();

        // The fast (newer) search lands first, the slow one afterwards.
        let mut shown = Vec::new();
        for (ticket, result) in [(fast, "fast"), (slow, "slow")] {
            if guard.is_current(ticket) {
                shown.push(result);
            }
        }
        assert_eq!(shown, vec!["fast"]);
    }

    #[test]
    fn publish_runs_only_for_current_ticket() {
        let guard = LatestOnly::new();
        let stale = guard.issue();
        let current = guard.issue();

        let mut shown = Vec::new();
        assert!(!guard.publish_if_current(stale, || shown.push("stale")));
        assert!(guard.publish_if_current(current, || shown.push("current")));
        assert_eq!(shown, vec!["current"]);
    }

    #[test]
    fn issue_waits_for_a_running_publish() {
        let guard = std::sync::Arc::new(LatestOnly::new());
        let first = guard.issue();
        let (started_tx, started_rx) = mpsc::channel();

        let publisher = {
            let guard = std::sync::Arc::clone(&guard);
            thread::spawn(move || {
                guard.publish_if_current(first, || {
                    started_tx.send(()).unwrap();
                    thread::sleep(Duration::from_millis(100));
                })
            })
        };

        started_rx.recv().unwrap();
        // Blocks until the publish above has finished.
        let second = guard.issue();
        assert!(publisher.join().unwrap());
        assert!(guard.is_current(second));
        assert!(!guard.publish_if_current(first, || panic!("stale output")));
    }
}
