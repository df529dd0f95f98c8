//! Entity store trait — the persistence seam between the mapping engine
//! and its host.
//!
//! The store is the only shared mutable resource in the pipeline. Each
//! handler invocation performs at most one point read followed by at most
//! one point write; there are no multi-entity transactions, so backends
//! need only guarantee atomicity of a single upsert.

use async_trait::async_trait;

use crate::entity::{Property, Proposal};
use crate::error::MappingError;

/// Keyed persistence for the two entity tables.
///
/// `save_*` are idempotent upserts: saving an id that already exists
/// replaces the record wholesale (last-write-wins). Listings are returned
/// in ascending id order for deterministic downstream consumption.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Point lookup of a property by entity id.
    async fn load_property(&self, id: &str) -> Result<Option<Property>, MappingError>;

    /// Upsert a property record.
    async fn save_property(&self, property: Property) -> Result<(), MappingError>;

    /// Point lookup of a proposal by entity id.
    async fn load_proposal(&self, id: &str) -> Result<Option<Proposal>, MappingError>;

    /// Upsert a proposal record.
    async fn save_proposal(&self, proposal: Proposal) -> Result<(), MappingError>;

    /// Full property listing, ordered by id.
    async fn properties(&self) -> Result<Vec<Property>, MappingError>;

    /// Full proposal listing, ordered by id.
    async fn proposals(&self) -> Result<Vec<Proposal>, MappingError>;
}

// ─── In-memory store (for testing) ────────────────────────────────────────────

use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory entity store for tests and ephemeral pipelines.
#[derive(Default)]
pub struct MemoryEntityStore {
    properties: Mutex<BTreeMap<String, Property>>,
    proposals: Mutex<BTreeMap<String, Proposal>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn load_property(&self, id: &str) -> Result<Option<Property>, MappingError> {
        Ok(self.properties.lock().unwrap().get(id).cloned())
    }

    async fn save_property(&self, property: Property) -> Result<(), MappingError> {
        self.properties
            .lock()
            .unwrap()
            .insert(property.id.clone(), property);
        Ok(())
    }

    async fn load_proposal(&self, id: &str) -> Result<Option<Proposal>, MappingError> {
        Ok(self.proposals.lock().unwrap().get(id).cloned())
    }

    async fn save_proposal(&self, proposal: Proposal) -> Result<(), MappingError> {
        self.proposals
            .lock()
            .unwrap()
            .insert(proposal.id.clone(), proposal);
        Ok(())
    }

    async fn properties(&self) -> Result<Vec<Property>, MappingError> {
        Ok(self.properties.lock().unwrap().values().cloned().collect())
    }

    async fn proposals(&self) -> Result<Vec<Proposal>, MappingError> {
        Ok(self.proposals.lock().unwrap().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, U256};

    #[tokio::test]
    async fn property_roundtrip_and_upsert() {
        let store = MemoryEntityStore::new();
        assert!(store.load_property("0x1").await.unwrap().is_none());

        store
            .save_property(Property::minted(U256::from(1), Bytes::from_static(b"a")))
            .await
            .unwrap();
        store
            .save_property(Property::minted(U256::from(1), Bytes::from_static(b"b")))
            .await
            .unwrap();

        // Second save replaces the first
        let p = store.load_property("0x1").await.unwrap().unwrap();
        assert_eq!(p.info.as_ref(), b"b");
        assert_eq!(store.properties().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listings_are_id_ordered() {
        let store = MemoryEntityStore::new();
        for raw in [3u64, 1, 2] {
            store
                .save_property(Property::minted(U256::from(raw), Bytes::new()))
                .await
                .unwrap();
        }
        let ids: Vec<_> = store
            .properties()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["0x1", "0x2", "0x3"]);
    }
}
