//! Request generations.
//!
//! Every fetch takes a ticket; only the newest ticket may write its
//! response back into view state. Older responses are dropped.

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct RequestGenerations {
    current: u64,
}

impl RequestGenerations {
    /// Issue a ticket, superseding all earlier ones.
    pub fn next(&mut self) -> FetchTicket {
        self.current += 1;
        FetchTicket {
            generation: self.current,
        }
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let mut generations = RequestGenerations::default();
        let first = generations.next();
        assert!(generations.is_current(first));

        let second = generations.next();
        assert!(!generations.is_current(first));
        assert!(generations.is_current(second));
    }
}
