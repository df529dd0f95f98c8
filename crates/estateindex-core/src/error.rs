//! Error types for the mapping pipeline.

use thiserror::Error;

use crate::entity::EntityKind;

/// Errors that can surface while applying events.
///
/// The default mapping policy absorbs anomalies (missing entity on
/// transfer, duplicate creation) as no-ops or overwrites; only storage
/// failures and strict-mode duplicate rejections propagate.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Duplicate {kind} creation for id {id}")]
    DuplicateEntity { kind: EntityKind, id: String },

    #[error("{0}")]
    Other(String),
}

impl MappingError {
    /// Returns `true` if the error is a strict-mode duplicate rejection.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateEntity { .. })
    }
}
