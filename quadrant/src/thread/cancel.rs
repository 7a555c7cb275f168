use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One-shot, process-wide cancellation signal.
///
/// Clones share the same flag. Once cancelled the token never resets.
/// Workers only look at it while waiting in [`Mailbox::claim`], never while
/// a computation is running.
///
/// [`Mailbox::claim`]: crate::thread::mailbox::Mailbox::claim
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// token had already been cancelled.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
