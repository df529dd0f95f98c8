//! In-memory entity store backend.
//!
//! Keeps both entity tables in RAM. Useful for tests and short-lived
//! pipelines that don't need persistence across process restarts.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use estateindex_core::entity::{Property, Proposal};
use estateindex_core::error::MappingError;
use estateindex_core::store::EntityStore;

/// In-memory entity store.
///
/// All data is lost when the process exits. Tables are `BTreeMap`s keyed
/// by entity id so listings come back in deterministic id order.
#[derive(Default)]
pub struct InMemoryStore {
    properties: Mutex<BTreeMap<String, Property>>,
    proposals: Mutex<BTreeMap<String, Proposal>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked properties.
    pub fn property_count(&self) -> usize {
        self.properties.lock().unwrap().len()
    }

    /// Number of tracked proposals.
    pub fn proposal_count(&self) -> usize {
        self.proposals.lock().unwrap().len()
    }

    /// Drop all records (e.g. before a host-driven full reprocess).
    pub fn clear(&self) {
        self.properties.lock().unwrap().clear();
        self.proposals.lock().unwrap().clear();
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
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
    use alloy_primitives::{Address, Bytes, U256};

    #[tokio::test]
    async fn save_and_load_both_tables() {
        let store = InMemoryStore::new();

        store
            .save_property(Property::minted(U256::from(1), Bytes::from_static(b"a")))
            .await
            .unwrap();
        store
            .save_proposal(Proposal {
                id: "0x9".into(),
                creator: Address::repeat_byte(0xaa),
                voting_closing_time: 1_700_000_000,
                description: "Build a park".into(),
            })
            .await
            .unwrap();

        assert_eq!(store.property_count(), 1);
        assert_eq!(store.proposal_count(), 1);
        assert!(store.load_property("0x1").await.unwrap().is_some());
        assert!(store.load_proposal("0x9").await.unwrap().is_some());
        assert!(store.load_proposal("0x1").await.unwrap().is_none()); // table isolation
    }

    #[tokio::test]
    async fn clear_empties_both_tables() {
        let store = InMemoryStore::new();
        store
            .save_property(Property::minted(U256::from(1), Bytes::new()))
            .await
            .unwrap();
        store.clear();
        assert_eq!(store.property_count(), 0);
        assert!(store.properties().await.unwrap().is_empty());
    }
}
