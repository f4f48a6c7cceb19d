//! Shared helpers for `PostgreSQL` workflow integration tests.
//!
//! Tests run against the embedded cluster managed by
//! `pg-embed-setup-unpriv`. The schema is applied once to a template
//! database; every test then works in its own database cloned from that
//! template, which is dropped again when the test finishes. When the suite
//! runs as root, `PG_EMBEDDED_WORKER` must name the privilege-dropping
//! worker binary.

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
pub use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::fixture;
use std::sync::Arc;
use tasklane::tenancy::UserRole;
use tasklane::workflow::adapters::postgres::{
    PgPool, PostgresTransactionExecutor, apply_schema, build_pool,
};
use tasklane::workflow::services::{CreateTaskRequest, TaskService};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "tasklane_test_template";

/// Connections per test database; racing tests need more than one.
const POOL_SIZE: u32 = 8;

/// Service type used by the `PostgreSQL` tests.
pub type PgService = TaskService<PostgresTransactionExecutor, DefaultClock>;

/// Creates a tokio runtime for driving the async service from a test.
///
/// # Errors
///
/// Returns an error when the runtime cannot be built.
pub fn test_runtime() -> eyre::Result<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or schema setup fails.
pub fn ensure_template(cluster: &TestCluster) -> eyre::Result<()> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            apply_schema(&mut conn).map_err(|e| eyre::eyre!("{e}"))?;
            Ok(())
        })
        .map_err(|e| eyre::eyre!("template setup failed: {e}"))
}

/// Database cloned from the template and dropped with the test.
pub struct TestDatabase {
    cluster: &'static TestCluster,
    name: String,
}

impl TestDatabase {
    fn create(cluster: &'static TestCluster) -> eyre::Result<Self> {
        let name = format!("tasklane_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|e| eyre::eyre!("database creation failed: {e}"))?;
        Ok(Self { cluster, name })
    }

    fn url(&self) -> String {
        self.cluster.connection().database_url(&self.name)
    }
}

impl Drop for TestDatabase {
    #[expect(
        clippy::print_stderr,
        reason = "Test cleanup warnings are informational"
    )]
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.name);
        }
    }
}

/// Per-test context over a fresh database.
///
/// `_database` is declared last so every pooled connection is closed before
/// the database is dropped.
pub struct PgContext {
    /// Pool over this test's database.
    pub pool: PgPool,
    /// Executor over the pool.
    pub executor: Arc<PostgresTransactionExecutor>,
    /// Service under test.
    pub service: PgService,
    /// Tenant owning every row this test writes.
    pub tenant_id: String,
    _database: TestDatabase,
}

impl PgContext {
    /// Builds a create request for this test's tenant.
    #[must_use]
    pub fn create_request(&self, title: &str) -> CreateTaskRequest {
        CreateTaskRequest::new(self.tenant_id.clone(), "ws", title, UserRole::Manager)
    }

    /// Counts this tenant's rows in `table`.
    ///
    /// # Errors
    ///
    /// Returns an error when the count query fails.
    pub fn count_rows(&self, table: &str) -> eyre::Result<i64> {
        #[derive(QueryableByName)]
        struct Count {
            #[diesel(sql_type = BigInt)]
            count: i64,
        }

        let mut connection = self.pool.get()?;
        let row: Count = sql_query(format!(
            "SELECT COUNT(*) AS count FROM {table} WHERE tenant_id = $1"
        ))
        .bind::<Text, _>(self.tenant_id.as_str())
        .get_result(&mut connection)?;
        Ok(row.count)
    }
}

/// Provides a context over a fresh database cloned from the template.
///
/// # Errors
///
/// Returns an error if template setup, database creation or pool
/// construction fails.
#[fixture]
pub fn pg_context(shared_test_cluster: &'static TestCluster) -> eyre::Result<PgContext> {
    ensure_template(shared_test_cluster)?;
    let database = TestDatabase::create(shared_test_cluster)?;
    let pool = build_pool(&database.url(), POOL_SIZE)?;
    let executor = Arc::new(PostgresTransactionExecutor::new(pool.clone()));
    let service = TaskService::new(Arc::clone(&executor), Arc::new(DefaultClock));
    Ok(PgContext {
        pool,
        executor,
        service,
        tenant_id: format!("tenant-{}", Uuid::new_v4()),
        _database: database,
    })
}
