//! The mapping engine — per-event handlers converting lifecycle events
//! into entity-store mutations.
//!
//! This is the only place the business rules live: what fields to set,
//! what to default, what to ignore. The engine is a single-threaded fold
//! over an externally-ordered event sequence; it keeps no state beyond
//! the entity store, so re-applying a corrected event sequence (the
//! host's reorg recovery path) is always safe.
//!
//! # Policies
//!
//! - Creation (`PropertyMinted`, `ProposalCreated`) is an unconditional
//!   upsert: a duplicate id overwrites the prior record, last-write-wins.
//!   [`MappingConfig::strict_creates`] switches duplicates to a rejection.
//! - A transfer for a property that was never minted is a silent no-op,
//!   counted in [`MappingStats::transfers_missed`].

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::entity::{EntityKind, Property, Proposal};
use crate::error::MappingError;
use crate::event::{Event, EventEnvelope, EventKind};
use crate::handler::{EventHandler, MappingContext, MappingRegistry};
use crate::store::EntityStore;

// ─── MappingConfig ────────────────────────────────────────────────────────────

/// Policy knobs for the mapping engine.
#[derive(Debug, Clone, Default)]
pub struct MappingConfig {
    /// When `true`, creating an entity whose id already exists returns
    /// [`MappingError::DuplicateEntity`] instead of overwriting. Off by
    /// default: id uniqueness is an assumption imposed on the upstream
    /// event source, and the default path performs no existence check.
    pub strict_creates: bool,
}

// ─── MappingStats ─────────────────────────────────────────────────────────────

/// Counters exposed for host observability.
///
/// `transfers_missed` is the anomaly signal: a non-zero value means a
/// transfer referenced an id that was never minted, which under a correct
/// upstream ordering contract should not happen.
#[derive(Debug, Default)]
pub struct MappingStats {
    properties_minted: AtomicU64,
    properties_transferred: AtomicU64,
    transfers_missed: AtomicU64,
    proposals_created: AtomicU64,
}

impl MappingStats {
    pub fn properties_minted(&self) -> u64 {
        self.properties_minted.load(Ordering::Relaxed)
    }

    pub fn properties_transferred(&self) -> u64 {
        self.properties_transferred.load(Ordering::Relaxed)
    }

    /// Transfers discarded because the referenced property did not exist.
    pub fn transfers_missed(&self) -> u64 {
        self.transfers_missed.load(Ordering::Relaxed)
    }

    pub fn proposals_created(&self) -> u64 {
        self.proposals_created.load(Ordering::Relaxed)
    }
}

// ─── Built-in handlers ────────────────────────────────────────────────────────

/// `PropertyMinted` → create the Property with fixed initial defaults.
struct PropertyMintedHandler;

#[async_trait]
impl EventHandler for PropertyMintedHandler {
    async fn handle(&self, event: &Event, ctx: &MappingContext<'_>) -> Result<(), MappingError> {
        let Event::PropertyMinted { property_id, info } = event else {
            return Ok(());
        };

        let property = Property::minted(*property_id, info.clone());

        if ctx.config.strict_creates
            && ctx.store.load_property(&property.id).await?.is_some()
        {
            return Err(MappingError::DuplicateEntity {
                kind: EntityKind::Property,
                id: property.id,
            });
        }

        debug!(id = %property.id, "property minted");
        ctx.store.save_property(property).await?;
        ctx.stats.properties_minted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn kind(&self) -> EventKind {
        EventKind::PropertyMinted
    }
}

/// `PropertyTransferred` → overwrite `owner` and `valuation`; `info` is
/// left untouched. Unknown id: deliberate no-op.
struct PropertyTransferredHandler;

#[async_trait]
impl EventHandler for PropertyTransferredHandler {
    async fn handle(&self, event: &Event, ctx: &MappingContext<'_>) -> Result<(), MappingError> {
        let Event::PropertyTransferred {
            property_id,
            new_owner,
            new_valuation,
        } = event
        else {
            return Ok(());
        };

        let id = crate::entity::entity_id(*property_id);
        let Some(mut property) = ctx.store.load_property(&id).await? else {
            debug!(%id, "transfer for unknown property, skipping");
            ctx.stats.transfers_missed.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        };

        property.owner = *new_owner;
        property.valuation = *new_valuation;

        debug!(%id, owner = %property.owner, "property transferred");
        ctx.store.save_property(property).await?;
        ctx.stats
            .properties_transferred
            .fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn kind(&self) -> EventKind {
        EventKind::PropertyTransferred
    }
}

/// `ProposalCreated` → create the Proposal with all fields copied verbatim
/// from the event. Proposals are frozen afterwards: no handler exists that
/// mutates one.
struct ProposalCreatedHandler;

#[async_trait]
impl EventHandler for ProposalCreatedHandler {
    async fn handle(&self, event: &Event, ctx: &MappingContext<'_>) -> Result<(), MappingError> {
        let Event::ProposalCreated {
            proposal_id,
            creator,
            voting_closing_time,
            description,
        } = event
        else {
            return Ok(());
        };

        let proposal = Proposal {
            id: crate::entity::entity_id(*proposal_id),
            creator: *creator,
            voting_closing_time: *voting_closing_time,
            description: description.clone(),
        };

        if ctx.config.strict_creates
            && ctx.store.load_proposal(&proposal.id).await?.is_some()
        {
            return Err(MappingError::DuplicateEntity {
                kind: EntityKind::Proposal,
                id: proposal.id,
            });
        }

        debug!(id = %proposal.id, "proposal created");
        ctx.store.save_proposal(proposal).await?;
        ctx.stats.proposals_created.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn kind(&self) -> EventKind {
        EventKind::ProposalCreated
    }
}

// ─── MappingEngine ────────────────────────────────────────────────────────────

/// The mapping engine: registry of built-in handlers over a shared store.
///
/// The host delivers events strictly in chain order and each event is
/// applied by at most one handler. Every write is a deterministic
/// overwrite, so replaying an identical sequence yields the same store
/// state (idempotent replay).
pub struct MappingEngine {
    store: Arc<dyn EntityStore>,
    registry: MappingRegistry,
    config: MappingConfig,
    stats: MappingStats,
}

impl MappingEngine {
    /// Engine with default policy (last-write-wins creation).
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self::with_config(store, MappingConfig::default())
    }

    /// Engine with an explicit policy.
    pub fn with_config(store: Arc<dyn EntityStore>, config: MappingConfig) -> Self {
        let mut registry = MappingRegistry::new();
        registry.register(Arc::new(PropertyMintedHandler));
        registry.register(Arc::new(PropertyTransferredHandler));
        registry.register(Arc::new(ProposalCreatedHandler));
        Self {
            store,
            registry,
            config,
            stats: MappingStats::default(),
        }
    }

    /// The entity store this engine writes to.
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Observability counters.
    pub fn stats(&self) -> &MappingStats {
        &self.stats
    }

    /// Apply a single decoded event.
    pub async fn apply(&self, event: &Event) -> Result<(), MappingError> {
        let ctx = MappingContext {
            store: self.store.as_ref(),
            config: &self.config,
            stats: &self.stats,
        };
        self.registry.dispatch(event, &ctx).await
    }

    /// Fold a batch of enveloped events in slice order.
    ///
    /// Precondition: the slice is already in canonical chain order
    /// (ascending [`EventEnvelope::position`]). Returns the number of
    /// events applied.
    pub async fn replay(&self, batch: &[EventEnvelope]) -> Result<u64, MappingError> {
        for envelope in batch {
            self.apply(&envelope.event).await?;
        }
        Ok(batch.len() as u64)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
