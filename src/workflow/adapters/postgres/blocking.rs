//! Pool construction and blocking-work helpers.
//!
//! Diesel is synchronous, so every transaction runs on tokio's blocking
//! thread pool rather than on an async worker thread.

use crate::workflow::ports::TransactionError;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

/// `PostgreSQL` connection pool type.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url` holding at most `max_size`
/// connections.
///
/// # Errors
///
/// Returns a [`PoolError`] when the initial connections cannot be opened.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
    Pool::builder()
        .max_size(max_size)
        .build(ConnectionManager::<PgConnection>::new(database_url))
}

/// Runs a blocking operation on a dedicated thread.
pub(super) async fn run_blocking<F, T>(f: F) -> Result<T, TransactionError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| TransactionError::worker(format!("task join error: {err}")))
}
