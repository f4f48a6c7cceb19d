//! Diesel schema for task, outbox and idempotency persistence.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;

/// SQL creating every table used by the workflow. Safe to re-run.
pub const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_task_tables/up.sql");

/// Applies [`SCHEMA_SQL`] to the connected database.
///
/// # Errors
///
/// Returns a diesel error if any statement fails.
pub fn apply_schema(connection: &mut PgConnection) -> diesel::QueryResult<()> {
    connection.batch_execute(SCHEMA_SQL)
}

diesel::table! {
    /// Task rows scoped by tenant and workspace.
    tasks (id) {
        /// Store-assigned task identifier.
        id -> Uuid,
        /// Owning tenant.
        tenant_id -> Text,
        /// Owning workspace.
        workspace_id -> Text,
        /// Task title.
        #[max_length = 120]
        title -> Varchar,
        /// Priority name.
        #[max_length = 32]
        priority -> Varchar,
        /// Lifecycle state name.
        #[max_length = 32]
        state -> Varchar,
        /// Optional assignee reference.
        assignee_id -> Nullable<Text>,
        /// Optimistic-concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Latest mutation timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only outbox of task events.
    task_events (id) {
        /// Store-assigned event identifier.
        id -> Uuid,
        /// Owning tenant.
        tenant_id -> Text,
        /// Owning workspace.
        workspace_id -> Text,
        /// Task the event describes.
        task_id -> Uuid,
        /// Event type name.
        #[max_length = 64]
        event_type -> Varchar,
        /// Full task snapshot.
        snapshot -> Jsonb,
        /// Append timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Replayable outcomes of keyed writes.
    idempotency_keys (id) {
        /// Store-assigned record identifier.
        id -> Uuid,
        /// Owning tenant.
        tenant_id -> Text,
        /// Owning workspace.
        workspace_id -> Text,
        /// Action name.
        #[max_length = 64]
        action -> Varchar,
        /// Caller-supplied key.
        #[max_length = 255]
        key -> Varchar,
        /// Identifier of the produced or affected entity.
        reference_id -> Text,
        /// Reference type name.
        #[max_length = 32]
        reference_type -> Varchar,
        /// Request fingerprint.
        #[max_length = 64]
        request_fingerprint -> Varchar,
        /// Snapshot replayed for later requests.
        response_snapshot -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// End of the retention window.
        expired_at -> Timestamptz,
    }
}

diesel::joinable!(task_events -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_events, idempotency_keys);
