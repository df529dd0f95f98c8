//! Event handler trait + registry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::MappingError;
use crate::event::{Event, EventKind};
use crate::mapping::{MappingConfig, MappingStats};
use crate::store::EntityStore;

/// Context passed to handlers for a single event application.
///
/// Gives a handler exactly what the mapping rules need: the entity store,
/// the mapping policy, and the stats counters. No block metadata — the
/// mapping layer is deliberately chain-position-blind.
pub struct MappingContext<'a> {
    /// The shared entity store.
    pub store: &'a dyn EntityStore,
    /// The active mapping policy.
    pub config: &'a MappingConfig,
    /// Observability counters.
    pub stats: &'a MappingStats,
}

/// Trait for per-event-kind mapping handlers.
///
/// Each handler converts one decoded event into at most one entity-store
/// mutation. Handlers are pure with respect to each other: nothing flows
/// between them except what the store persists.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Apply the event's mapping rules.
    async fn handle(&self, event: &Event, ctx: &MappingContext<'_>) -> Result<(), MappingError>;

    /// The event kind this handler processes.
    fn kind(&self) -> EventKind;
}

/// Registry of event handlers — at most one handler per event kind.
///
/// Registering a second handler for the same kind replaces the first.
/// Dispatching an event with no registered handler is a no-op.
pub struct MappingRegistry {
    handlers: HashMap<EventKind, Arc<dyn EventHandler>>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for its event kind.
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    /// Returns `true` if a handler is registered for `kind`.
    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Dispatch an event to the matching handler, if any.
    pub async fn dispatch(
        &self,
        event: &Event,
        ctx: &MappingContext<'_>,
    ) -> Result<(), MappingError> {
        if let Some(handler) = self.handlers.get(&event.kind()) {
            handler.handle(event, ctx).await?;
        }
        Ok(())
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
