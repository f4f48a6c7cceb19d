//! Diesel-backed transaction executor.

use super::blocking::{PgPool, run_blocking};
use crate::workflow::ports::{TransactionError, TransactionExecutor, TransactionScope, UnitOfWork};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Runs units of work in `PostgreSQL` transactions drawn from a pool.
#[derive(Debug, Clone)]
pub struct PostgresTransactionExecutor {
    pool: PgPool,
}

impl PostgresTransactionExecutor {
    /// Creates an executor over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TransactionExecutor for PostgresTransactionExecutor {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TransactionError> + Send + 'static,
    {
        TransactionScope::ensure_inactive()?;
        let pool = self.pool.clone();
        let outcome = run_blocking(move || run_in_transaction(&pool, work)).await?;
        outcome.map_err(Aborted::into_error)
    }
}

fn run_in_transaction<T, E, F>(pool: &PgPool, work: F) -> Result<T, Aborted<E>>
where
    F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
{
    let _scope = TransactionScope::enter().map_err(Aborted::Executor)?;
    let mut pooled = pool
        .get()
        .map_err(|err| Aborted::Executor(TransactionError::connection(err.to_string())))?;
    let connection: &mut PgConnection = &mut pooled;
    connection.transaction::<T, Aborted<E>, _>(|tx| {
        let mut unit = PgUnitOfWork::new(tx);
        work(&mut unit).map_err(Aborted::Work)
    })
}

/// Reason a transaction closure did not commit.
enum Aborted<E> {
    Work(E),
    Database(diesel::result::Error),
    Executor(TransactionError),
}

impl<E> From<diesel::result::Error> for Aborted<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

impl<E: From<TransactionError>> Aborted<E> {
    fn into_error(self) -> E {
        match self {
            Self::Work(err) => err,
            Self::Database(err) => E::from(TransactionError::database(err)),
            Self::Executor(err) => E::from(err),
        }
    }
}

/// Store handle bound to one open `PostgreSQL` transaction.
pub(super) struct PgUnitOfWork<'c> {
    connection: &'c mut PgConnection,
}

impl<'c> PgUnitOfWork<'c> {
    const fn new(connection: &'c mut PgConnection) -> Self {
        Self { connection }
    }

    pub(super) const fn connection(&mut self) -> &mut PgConnection {
        self.connection
    }
}
