//! Ticket registry: correlation state for outbound invocations.

use std::collections::HashMap;

use crate::error::SessionError;
use crate::message::Ticket;
use crate::session::Continuation;

/// Tracks the pending continuation for each outstanding outbound call.
///
/// Owned by one session; there is no process-wide ticket state. Every
/// ticket present here corresponds to exactly one in-flight invocation
/// that has not yet received its reply.
pub struct TicketRegistry {
    next: u64,
    pending: HashMap<Ticket, Continuation>,
}

impl TicketRegistry {
    pub fn new() -> Self {
        Self {
            next: 1,
            pending: HashMap::new(),
        }
    }

    /// Return a ticket unique among this side's outbound calls for the
    /// lifetime of the session.
    pub fn allocate(&mut self) -> Ticket {
        let ticket = Ticket::new(self.next.to_string());
        self.next += 1;
        ticket
    }

    /// Store the continuation to run when the ticket's reply arrives.
    pub fn register(&mut self, ticket: Ticket, continuation: Continuation) {
        self.pending.insert(ticket, continuation);
    }

    /// Remove and return the continuation for a reply's ticket.
    ///
    /// A ticket with no pending entry means the peer echoed a ticket it
    /// was never given; the dispatcher treats that as fatal.
    pub fn resolve(&mut self, ticket: &Ticket) -> Result<Continuation, SessionError> {
        self.pending
            .remove(ticket)
            .ok_or_else(|| SessionError::UnknownTicket(ticket.clone()))
    }

    pub fn contains(&self, ticket: &Ticket) -> bool {
        self.pending.contains_key(ticket)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Default for TicketRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Continuation {
        Box::new(|_, _| Ok(()))
    }

    #[test]
    fn sequential_allocations_are_distinct() {
        let mut registry = TicketRegistry::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(registry.allocate()));
        }
    }

    #[test]
    fn resolve_removes_the_entry() {
        let mut registry = TicketRegistry::new();
        let ticket = registry.allocate();
        registry.register(ticket.clone(), noop());
        assert!(registry.contains(&ticket));

        registry.resolve(&ticket).unwrap();
        assert!(!registry.contains(&ticket));
        assert_eq!(registry.pending(), 0);
    }

    #[test]
    fn second_resolve_fails() {
        let mut registry = TicketRegistry::new();
        let ticket = registry.allocate();
        registry.register(ticket.clone(), noop());

        assert!(registry.resolve(&ticket).is_ok());
        let Err(err) = registry.resolve(&ticket) else {
            panic!("resolved the same ticket twice");
        };
        assert!(matches!(err, SessionError::UnknownTicket(t) if t == ticket));
    }

    #[test]
    fn never_issued_ticket_is_unknown() {
        let mut registry = TicketRegistry::new();
        let Err(err) = registry.resolve(&Ticket::from("42")) else {
            panic!("resolved a ticket that was never issued");
        };
        assert!(matches!(err, SessionError::UnknownTicket(_)));
    }
}
