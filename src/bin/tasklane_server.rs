//! HTTP server entry point.
//!
//! Loads [`AppConfig`] from the environment, opens the `PostgreSQL` pool,
//! optionally applies the schema and serves the task API until interrupted.
//! The pool is created here and handed to the executor explicitly; nothing
//! else in the process opens connections.

use mockable::DefaultClock;
use std::sync::Arc;
use tasklane::api::router;
use tasklane::config::{AppConfig, ConfigError};
use tasklane::telemetry::init_tracing;
use tasklane::workflow::adapters::postgres::{
    PgPool, PostgresTransactionExecutor, apply_schema, build_pool,
};
use tasklane::workflow::services::TaskService;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to install tracing subscriber: {0}")]
    Tracing(#[from] tracing_subscriber::util::TryInitError),
    #[error("failed to open database pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("failed to apply schema: {0}")]
    Schema(#[from] diesel::result::Error),
    #[error("startup task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format)?;
    tracing::info!(
        bind = %config.bind_address(),
        pool_size = config.pool_size,
        "starting tasklane"
    );

    let pool = open_pool(&config).await?;
    let executor = Arc::new(PostgresTransactionExecutor::new(pool));
    let service = Arc::new(TaskService::new(executor, Arc::new(DefaultClock)));
    let app = router(service).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("tasklane stopped");
    Ok(())
}

async fn open_pool(config: &AppConfig) -> Result<PgPool, ServerError> {
    let database_url = config.database_url.clone();
    let pool_size = config.pool_size;
    let apply = config.apply_schema;
    tokio::task::spawn_blocking(move || -> Result<PgPool, ServerError> {
        let pool = build_pool(&database_url, pool_size)?;
        if apply {
            let mut connection = pool.get()?;
            apply_schema(&mut connection)?;
            tracing::info!("database schema applied");
        }
        Ok(pool)
    })
    .await?
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
