use std::sync::atomic::{AtomicU64, Ordering};

/// Proof that an operation was started at a given generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Supersedes in-flight operations when a newer one starts
///
/// An interactive caller takes a ticket before each operation and delivers
/// the result only while the ticket is current. Starting a new operation
/// makes every older ticket stale, so late results are dropped instead of
/// interleaving with newer ones. The underlying request is not cancelled.
#[derive(Debug, Default)]
pub struct RequestGate {
    generation: AtomicU64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new operation, invalidating all earlier tickets
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }

    /// Passes `value` through only if `ticket` is still current
    pub fn deliver<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!("Dropping superseded result (ticket {})", ticket.0);
            None
        }
    }
}
