use std::sync::Arc;

use quadrant_api::PendingRequest;

use crate::thread::mailbox::Mailbox;

/// Feeds operator requests into the mailbox, one at a time.
///
/// `submit` takes `&mut self`, so a dispatcher can never run two submissions
/// concurrently. Every submission is published immediately and wakes exactly
/// one waiting worker; a submission that arrives before the previous one was
/// claimed supersedes it.
#[derive(Debug)]
pub struct Dispatcher {
    mailbox: Arc<Mailbox>,
    submitted: u64,
}

impl Dispatcher {
    pub fn new(mailbox: Arc<Mailbox>) -> Self {
        Self {
            mailbox,
            submitted: 0,
        }
    }

    pub fn submit(&mut self, request: PendingRequest) {
        self.mailbox.publish(request);
        self.submitted += 1;
        crate::log_request!(request.id(), "submitted", sequence = self.submitted);
    }

    /// Number of requests submitted so far, superseded ones included.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}
