//! Unit-of-work port binding the three stores to one transaction.

use crate::idempotency::ports::IdempotencyStore;
use crate::task::ports::{TaskEventStore, TaskStore};
use async_trait::async_trait;
use std::cell::Cell;
use std::sync::Arc;
use thiserror::Error;

/// Transaction handle exposing every store the workflow writes to.
///
/// Store calls made through one handle commit or roll back together.
pub trait UnitOfWork: TaskStore + TaskEventStore + IdempotencyStore {}

impl<T> UnitOfWork for T where T: TaskStore + TaskEventStore + IdempotencyStore {}

/// Opens atomic units of work.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    /// Runs `work` inside a single transaction.
    ///
    /// `Ok` commits every write made through the handle; `Err` rolls all of
    /// them back. Implementations must reject calls made while a unit of work
    /// is already active on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a [`TransactionError`]
    /// converted into `E` when the transaction cannot be opened or committed.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TransactionError> + Send + 'static;
}

/// Errors raised by transaction executors.
#[derive(Debug, Clone, Error)]
pub enum TransactionError {
    /// A transaction was requested while another is active on this thread.
    #[error("nested transactions are not supported")]
    Nested,

    /// A connection could not be acquired.
    #[error("connection error: {0}")]
    Connection(String),

    /// The database rejected the transaction.
    #[error("database error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),

    /// The worker running the transaction failed.
    #[error("transaction worker failed: {0}")]
    Worker(String),

    /// Shared state was poisoned by a panic in an earlier transaction.
    #[error("transaction state poisoned")]
    Poisoned,
}

impl TransactionError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Wraps a database error.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Arc::new(err))
    }

    /// Creates a worker error.
    #[must_use]
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker(message.into())
    }
}

thread_local! {
    static ACTIVE_TRANSACTION: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running a unit of work.
///
/// Executors hold a scope for as long as the work closure runs. Dropping the
/// scope clears the mark.
#[derive(Debug)]
pub struct TransactionScope {
    _private: (),
}

impl TransactionScope {
    /// Enters a transaction scope on the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Nested`] when a scope is already active.
    pub fn enter() -> Result<Self, TransactionError> {
        Self::ensure_inactive()?;
        ACTIVE_TRANSACTION.with(|active| active.set(true));
        Ok(Self { _private: () })
    }

    /// Fails when a scope is active on the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Nested`] when a scope is already active.
    pub fn ensure_inactive() -> Result<(), TransactionError> {
        if ACTIVE_TRANSACTION.with(Cell::get) {
            return Err(TransactionError::Nested);
        }
        Ok(())
    }
}

impl Drop for TransactionScope {
    fn drop(&mut self) {
        ACTIVE_TRANSACTION.with(|active| active.set(false));
    }
}
