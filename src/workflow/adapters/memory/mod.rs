//! In-memory transaction executor for tests and local runs.
//!
//! Committed tables sit behind one mutex. Each transaction clones them,
//! runs the work against the copy and swaps the copy in only on success, so
//! a failed unit of work leaves no trace. Holding the mutex for the whole
//! transaction serialises writers the way row locks would.

mod stores;

use crate::idempotency::domain::IdempotencyRecord;
use crate::task::domain::{Task, TaskEvent, TaskId};
use crate::tenancy::WorkspaceScope;
use crate::workflow::ports::{TransactionError, TransactionExecutor, TransactionScope, UnitOfWork};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard};
use stores::{InMemoryUnitOfWork, Tables};

/// Thread-safe in-memory database exposing the workflow stores through
/// transactions.
#[derive(Debug)]
pub struct InMemoryDatabase<C> {
    tables: Arc<Mutex<Tables>>,
    clock: Arc<C>,
}

impl<C> Clone for InMemoryDatabase<C> {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> InMemoryDatabase<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty database stamping rows with `clock`.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            clock,
        }
    }

    /// Returns the number of committed tasks across all scopes.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Poisoned`] if a transaction panicked.
    pub fn task_count(&self) -> Result<usize, TransactionError> {
        Ok(self.lock()?.tasks.len())
    }

    /// Returns a committed task by scope and identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Poisoned`] if a transaction panicked.
    pub fn committed_task(
        &self,
        scope: &WorkspaceScope,
        id: TaskId,
    ) -> Result<Option<Task>, TransactionError> {
        Ok(self.lock()?.tasks.get(&(scope.clone(), id)).cloned())
    }

    /// Returns every committed outbox event in append order.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Poisoned`] if a transaction panicked.
    pub fn events(&self) -> Result<Vec<TaskEvent>, TransactionError> {
        Ok(self.lock()?.events.clone())
    }

    /// Returns every committed idempotency record.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Poisoned`] if a transaction panicked.
    pub fn idempotency_records(&self) -> Result<Vec<IdempotencyRecord>, TransactionError> {
        Ok(self.lock()?.idempotency.values().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, TransactionError> {
        self.tables.lock().map_err(|_| TransactionError::Poisoned)
    }
}

#[async_trait]
impl<C> TransactionExecutor for InMemoryDatabase<C>
where
    C: Clock + Send + Sync,
{
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TransactionError> + Send + 'static,
    {
        let _scope = TransactionScope::enter()?;
        let mut committed = self.lock()?;
        let mut unit = InMemoryUnitOfWork::new(committed.clone(), self.clock.as_ref());
        let outcome = work(&mut unit)?;
        *committed = unit.into_tables();
        Ok(outcome)
    }
}
