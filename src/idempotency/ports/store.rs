//! Store port for idempotency records.

use crate::idempotency::domain::{
    IdempotencyAction, IdempotencyKey, IdempotencyRecord, NewIdempotencyRecord,
};
use crate::tenancy::WorkspaceScope;
use std::sync::Arc;
use thiserror::Error;

/// Result type for idempotency store operations.
pub type IdempotencyStoreResult<T> = Result<T, IdempotencyStoreError>;

/// Idempotency record persistence contract.
///
/// Records are unique per `(tenant, workspace, action, key)`; implementations
/// enforce that invariant on insert.
pub trait IdempotencyStore {
    /// Finds the record for a key within `scope` and `action`.
    ///
    /// Expired records are still returned.
    ///
    /// # Errors
    ///
    /// Returns [`IdempotencyStoreError::Persistence`] when the lookup fails.
    fn find_idempotency_record(
        &mut self,
        scope: &WorkspaceScope,
        action: IdempotencyAction,
        key: &IdempotencyKey,
    ) -> IdempotencyStoreResult<Option<IdempotencyRecord>>;

    /// Inserts a record and returns it with store-assigned fields.
    ///
    /// # Errors
    ///
    /// Returns [`IdempotencyStoreError::DuplicateKey`] when a record for the
    /// same scope, action and key already exists.
    fn insert_idempotency_record(
        &mut self,
        record: &NewIdempotencyRecord,
    ) -> IdempotencyStoreResult<IdempotencyRecord>;
}

/// Errors returned by idempotency store implementations.
#[derive(Debug, Clone, Error)]
pub enum IdempotencyStoreError {
    /// A record for the same scope, action and key already exists.
    #[error("duplicate idempotency key '{key}' for {action}")]
    DuplicateKey {
        /// Operation kind.
        action: IdempotencyAction,
        /// Conflicting key.
        key: IdempotencyKey,
    },

    /// The insert returned no row.
    #[error("idempotency key insert returned no row")]
    MissingReturnedRow,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdempotencyStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
