//! Entity schema — the records the mapping engine materializes.
//!
//! Two entity types exist: [`Property`] (mutable ownership/valuation,
//! immutable descriptive payload) and [`Proposal`] (write-once-then-frozen).
//! Entity ids are the minimal lowercase hex rendering of the 256-bit
//! identifier supplied by the event source.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Render a 256-bit on-chain identifier as an entity id (`0x1`, `0xabc`, …).
///
/// Minimal hex, lowercase, `0x`-prefixed. This is the primary key format
/// for both entity tables.
pub fn entity_id(raw: U256) -> String {
    format!("{raw:#x}")
}

/// Discriminant for the two entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Property,
    Proposal,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Property => write!(f, "property"),
            Self::Proposal => write!(f, "proposal"),
        }
    }
}

// ─── Property ─────────────────────────────────────────────────────────────────

/// A tokenized real-estate property.
///
/// `info` is write-once (set at mint, never touched by transfers). `owner`
/// and `valuation` hold only the most recent transfer's values; no history
/// is retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Entity id: hex of the 256-bit property id. Immutable primary key.
    pub id: String,
    /// Opaque descriptive payload from the mint event.
    pub info: Bytes,
    /// Current owner. The zero address until the first transfer.
    pub owner: Address,
    /// Current valuation. Zero until the first transfer.
    pub valuation: U256,
}

impl Property {
    /// A freshly minted property: fixed initial defaults, never derived
    /// from event fields other than `info`.
    pub fn minted(property_id: U256, info: Bytes) -> Self {
        Self {
            id: entity_id(property_id),
            info,
            owner: Address::ZERO,
            valuation: U256::ZERO,
        }
    }
}

// ─── Proposal ─────────────────────────────────────────────────────────────────

/// A governance proposal. Frozen after creation — no handler mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Entity id: hex of the 256-bit proposal id. Immutable primary key.
    pub id: String,
    /// Proposal author.
    pub creator: Address,
    /// Unix timestamp (seconds) after which voting closes.
    pub voting_closing_time: u64,
    /// Human-readable proposal text.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_is_minimal_hex() {
        assert_eq!(entity_id(U256::from(1)), "0x1");
        assert_eq!(entity_id(U256::from(0)), "0x0");
        assert_eq!(entity_id(U256::from(0xabcdefu64)), "0xabcdef");
    }

    #[test]
    fn minted_property_has_fixed_defaults() {
        let p = Property::minted(U256::from(7), Bytes::from_static(b"Lot A"));
        assert_eq!(p.id, "0x7");
        assert_eq!(p.info.as_ref(), b"Lot A");
        assert_eq!(p.owner, Address::ZERO);
        assert_eq!(p.valuation, U256::ZERO);
    }
}
