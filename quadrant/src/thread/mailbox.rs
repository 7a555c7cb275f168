//! # Request Mailbox
//!
//! A single-slot hand-off point between the dispatcher and the worker pool.
//!
//! ## Key Concepts
//! - The slot holds at most one unclaimed request. Publishing while a
//!   request is still unclaimed overwrites it: the older request is
//!   superseded and no worker ever sees it.
//! - One mutex guards the slot and one condition variable signals it. The
//!   wait predicate is compound, `ready || cancelled`, so a publish wakes a
//!   single waiter while shutdown wakes every waiter, and the two reasons
//!   can never be confused.
//! - Claiming copies the request out and clears the ready flag under the
//!   lock, so two workers can never receive the same request.
//!
//! ## Wake protocol
//! ```text
//!   publish:  lock -> slot = req, ready = true -> unlock -> notify_one
//!   cancel:   token.cancel() -> lock -> unlock -> notify_all
//!   claim:    lock -> wait while !(ready || cancelled) -> take slot -> unlock
//! ```

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use quadrant_api::PendingRequest;
use tracing::{debug, trace};

use crate::thread::cancel::CancellationToken;

/// State guarded by the mailbox mutex.
///
/// `ready` is true exactly when `current` holds a request no worker has
/// claimed yet.
#[derive(Debug, Default)]
struct Slot {
    current: Option<PendingRequest>,
    ready: bool,
}

pub struct Mailbox {
    slot: Mutex<Slot>,
    ready_cond: Condvar,
    cancel: CancellationToken,
}

impl Mailbox {
    /// Creates an empty mailbox that stops claims once `cancel` fires.
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            slot: Mutex::new(Slot::default()),
            ready_cond: Condvar::new(),
            cancel,
        }
    }

    /// Every mutation of the slot is a plain assignment, so the state behind
    /// a poisoned lock is still consistent and safe to keep using.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `request` as the current request and wakes one waiting worker.
    ///
    /// An unclaimed request already in the slot is overwritten.
    pub fn publish(&self, request: PendingRequest) {
        {
            let mut slot = self.lock();
            if let Some(previous) = slot.current.replace(request) {
                debug!(superseded = %previous.id(), by = %request.id(), "unclaimed request superseded");
            }
            slot.ready = true;
        }
        self.ready_cond.notify_one();
        trace!(request = %request.id(), "request published");
    }

    /// Blocks until a request is ready or cancellation is requested.
    ///
    /// Returns the claimed request, or `None` when the mailbox is cancelled
    /// and empty. A ready request wins over cancellation, so anything
    /// published before shutdown is still handed to a worker.
    pub fn claim(&self) -> Option<PendingRequest> {
        let guard = self.lock();
        let mut slot = self
            .ready_cond
            .wait_while(guard, |slot| !slot.ready && !self.cancel.is_cancelled())
            .unwrap_or_else(PoisonError::into_inner);
        Self::take(&mut slot)
    }

    /// Claims the current request without blocking.
    pub fn try_claim(&self) -> Option<PendingRequest> {
        let mut slot = self.lock();
        Self::take(&mut slot)
    }

    fn take(slot: &mut Slot) -> Option<PendingRequest> {
        debug_assert_eq!(slot.ready, slot.current.is_some());
        if !slot.ready {
            return None;
        }
        slot.ready = false;
        slot.current.take()
    }

    /// Wakes every blocked worker so each can re-check the cancellation
    /// token.
    ///
    /// The lock is taken before notifying: a worker that read the token
    /// before it was set is then guaranteed to already be parked on the
    /// condition variable and receive this notification.
    pub fn wake_all(&self) {
        drop(self.lock());
        self.ready_cond.notify_all();
    }

    /// Whether an unclaimed request is waiting.
    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    /// A copy of the unclaimed request, if any, without claiming it.
    pub fn peek(&self) -> Option<PendingRequest> {
        self.lock().current
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.lock();
        f.debug_struct("Mailbox")
            .field("current", &slot.current)
            .field("ready", &slot.ready)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn mailbox() -> Mailbox {
        Mailbox::new(CancellationToken::new())
    }

    #[test]
    fn starts_empty() {
        let mailbox = mailbox();
        assert!(!mailbox.is_ready());
        assert!(mailbox.peek().is_none());
        assert!(mailbox.try_claim().is_none());
    }

    #[test]
    fn claim_clears_ready_flag() {
        let mailbox = mailbox();
        let request = PendingRequest::new(0.0, 1.0, 1e-9);
        mailbox.publish(request);
        assert!(mailbox.is_ready());

        assert_eq!(mailbox.claim(), Some(request));
        assert!(!mailbox.is_ready());
        assert!(mailbox.try_claim().is_none());
    }

    #[test]
    fn newer_publish_supersedes_unclaimed_request() {
        let mailbox = mailbox();
        let first = PendingRequest::new(0.0, 1.0, 1e-9);
        let second = PendingRequest::new(1.0, 2.0, 1e-9);
        mailbox.publish(first);
        mailbox.publish(second);

        assert_eq!(mailbox.claim(), Some(second));
        assert!(mailbox.try_claim().is_none());
    }

    #[test]
    fn cancelled_empty_mailbox_stops_claim() {
        let cancel = CancellationToken::new();
        let mailbox = Mailbox::new(cancel.clone());
        cancel.cancel();
        assert!(mailbox.claim().is_none());
    }

    #[test]
    fn ready_request_wins_over_cancellation() {
        let cancel = CancellationToken::new();
        let mailbox = Mailbox::new(cancel.clone());
        let request = PendingRequest::new(0.0, 1.0, 1e-9);
        mailbox.publish(request);
        cancel.cancel();

        assert_eq!(mailbox.claim(), Some(request));
        assert!(mailbox.claim().is_none());
    }

    #[test]
    fn wake_all_releases_blocked_claimers() {
        let cancel = CancellationToken::new();
        let mailbox = Arc::new(Mailbox::new(cancel.clone()));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let mailbox = Arc::clone(&mailbox);
                thread::spawn(move || mailbox.claim())
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        cancel.cancel();
        mailbox.wake_all();

        for waiter in waiters {
            assert!(waiter.join().unwrap().is_none());
        }
    }

    #[test]
    fn publish_wakes_a_blocked_claimer() {
        let mailbox = Arc::new(Mailbox::new(CancellationToken::new()));
        let waiter = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || mailbox.claim())
        };

        thread::sleep(Duration::from_millis(20));
        let request = PendingRequest::new(2.0, 3.0, 1e-6);
        mailbox.publish(request);

        assert_eq!(waiter.join().unwrap(), Some(request));
    }
}
