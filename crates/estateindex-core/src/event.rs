//! Typed lifecycle events consumed by the mapping engine.
//!
//! Events arrive pre-decoded from the host's log decoder; the mapping
//! layer never inspects raw log bytes, topics, or block metadata. The
//! [`EventEnvelope`] carries the canonical chain-ordering key so hosts can
//! sort a batch before replaying it — the engine itself never reorders.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A decoded real-estate lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A new property token was minted.
    PropertyMinted {
        /// 256-bit property identifier (unique per property upstream).
        property_id: U256,
        /// Opaque descriptive payload.
        info: Bytes,
    },
    /// Ownership (and valuation) of an existing property changed hands.
    PropertyTransferred {
        property_id: U256,
        new_owner: Address,
        new_valuation: U256,
    },
    /// A governance proposal was opened.
    ProposalCreated {
        proposal_id: U256,
        creator: Address,
        voting_closing_time: u64,
        description: String,
    },
}

impl Event {
    /// The routing discriminant for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PropertyMinted { .. } => EventKind::PropertyMinted,
            Self::PropertyTransferred { .. } => EventKind::PropertyTransferred,
            Self::ProposalCreated { .. } => EventKind::ProposalCreated,
        }
    }
}

/// Event discriminant — registry routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    PropertyMinted,
    PropertyTransferred,
    ProposalCreated,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PropertyMinted => write!(f, "PropertyMinted"),
            Self::PropertyTransferred => write!(f, "PropertyTransferred"),
            Self::ProposalCreated => write!(f, "ProposalCreated"),
        }
    }
}

// ─── EventEnvelope ────────────────────────────────────────────────────────────

/// An event plus its position in canonical chain order.
///
/// Ordering contract: events for a chain must be applied in ascending
/// `(block_number, tx_index, log_index)` order, exactly once per logical
/// processing pass. Enforcing that order is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Block the event was emitted in.
    pub block_number: u64,
    /// Transaction index within the block.
    pub tx_index: u32,
    /// Log index within the transaction.
    pub log_index: u32,
    /// The decoded event payload.
    pub event: Event,
}

impl EventEnvelope {
    /// The canonical chain-ordering key.
    pub fn position(&self) -> (u64, u32, u32) {
        (self.block_number, self.tx_index, self.log_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let e = Event::PropertyMinted {
            property_id: U256::from(1),
            info: Bytes::from_static(b"x"),
        };
        assert_eq!(e.kind(), EventKind::PropertyMinted);
    }

    #[test]
    fn envelope_position_orders_by_block_then_tx_then_log() {
        let ev = |b, t, l| EventEnvelope {
            block_number: b,
            tx_index: t,
            log_index: l,
            event: Event::PropertyMinted {
                property_id: U256::from(1),
                info: Bytes::new(),
            },
        };
        let mut batch = vec![ev(2, 0, 0), ev(1, 3, 0), ev(1, 0, 5), ev(1, 0, 2)];
        batch.sort_by_key(|e| e.position());
        let order: Vec<_> = batch.iter().map(|e| e.position()).collect();
        assert_eq!(order, vec![(1, 0, 2), (1, 0, 5), (1, 3, 0), (2, 0, 0)]);
    }

    #[test]
    fn event_json_is_tagged_by_type() {
        let e = Event::ProposalCreated {
            proposal_id: U256::from(9),
            creator: Address::ZERO,
            voting_closing_time: 1_700_000_000,
            description: "Build a park".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "ProposalCreated");
        assert_eq!(json["description"], "Build a park");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }
}
