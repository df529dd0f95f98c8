//! estateindex-core — event-to-state mapping engine for real-estate-token
//! lifecycle events.
//!
//! # Architecture
//!
//! ```text
//! host event feed (ordered) → MappingEngine
//!                                 ├── MappingRegistry  (one handler per event kind)
//!                                 │     ├── PropertyMinted      → create Property
//!                                 │     ├── PropertyTransferred → update owner/valuation
//!                                 │     └── ProposalCreated     → create Proposal
//!                                 └── EntityStore backend (memory / SQLite)
//! ```
//!
//! The engine is a single-threaded fold `(store, event) -> store'` with no
//! hidden state: ordering and exactly-once delivery are the caller's
//! contract, and every write is a deterministic overwrite so replay is
//! always safe.

pub mod entity;
pub mod error;
pub mod event;
pub mod handler;
pub mod mapping;
pub mod store;

pub use entity::{entity_id, EntityKind, Property, Proposal};
pub use error::MappingError;
pub use event::{Event, EventEnvelope, EventKind};
pub use handler::{EventHandler, MappingContext, MappingRegistry};
pub use mapping::{MappingConfig, MappingEngine, MappingStats};
pub use store::{EntityStore, MemoryEntityStore};
