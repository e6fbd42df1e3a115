//! # Request Sequencing
//!
//! Guards desk state against stale responses.
//!
//! ```text
//! t0  search "98765"  ──► ticket #1 ───────────────────────┐
//! t1  search "INV-7"  ──► ticket #2 ──────┐                │
//! t2                            response #2 ► applied       │
//! t3                                         response #1 ► dropped (stale)
//! ```
//!
//! Each [`Slot`] has its own counter, so a slow branch-stock fetch never
//! invalidates a bill search.

use std::sync::atomic::{AtomicU64, Ordering};

/// Independent request lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    BillSearch,
    ProductSearch,
    BranchStock,
    Transfers,
    Allocation,
}

impl Slot {
    const COUNT: usize = 5;

    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::BillSearch,
        Slot::ProductSearch,
        Slot::BranchStock,
        Slot::Transfers,
        Slot::Allocation,
    ];

    const fn index(self) -> usize {
        match self {
            Slot::BillSearch => 0,
            Slot::ProductSearch => 1,
            Slot::BranchStock => 2,
            Slot::Transfers => 3,
            Slot::Allocation => 4,
        }
    }
}

/// Proof that a request was issued; compare against the sequencer before
/// applying its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    slot: Slot,
    seq: u64,
}

impl Ticket {
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

/// Monotonic per-slot counters.
#[derive(Debug, Default)]
pub struct Sequencer {
    counters: [AtomicU64; Slot::COUNT],
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket, superseding every earlier ticket of the slot.
    pub fn issue(&self, slot: Slot) -> Ticket {
        let seq = self.counters[slot.index()].fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { slot, seq }
    }

    /// True if no newer ticket was issued for the slot.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.counters[ticket.slot.index()].load(Ordering::SeqCst) == ticket.seq
    }

    /// Invalidates every outstanding ticket of the slot.
    pub fn invalidate(&self, slot: Slot) {
        self.counters[slot.index()].fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let seq = Sequencer::new();
        let first = seq.issue(Slot::BillSearch);
        assert!(seq.is_current(&first));
        let second = seq.issue(Slot::BillSearch);
        assert!(!seq.is_current(&first));
        assert!(seq.is_current(&second));
    }

    #[test]
    fn test_slots_are_independent() {
        let seq = Sequencer::new();
        let bills = seq.issue(Slot::BillSearch);
        seq.issue(Slot::BranchStock);
        assert!(seq.is_current(&bills));
    }

    #[test]
    fn test_invalidate() {
        let seq = Sequencer::new();
        let t = seq.issue(Slot::ProductSearch);
        seq.invalidate(Slot::ProductSearch);
        assert!(!seq.is_current(&t));
    }

    #[test]
    fn test_invalidate_every_slot() {
        let seq = Sequencer::new();
        let tickets: Vec<Ticket> = Slot::ALL.iter().map(|&slot| seq.issue(slot)).collect();
        for slot in Slot::ALL {
            seq.invalidate(slot);
        }
        assert!(tickets.iter().all(|t| !seq.is_current(t)));
        assert!(seq.is_current(&seq.issue(Slot::BillSearch)));
    }
}
