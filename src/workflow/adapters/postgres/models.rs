//! Diesel row models for workflow persistence.

use super::schema::{idempotency_keys, task_events, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning tenant.
    pub tenant_id: String,
    /// Owning workspace.
    pub workspace_id: String,
    /// Task title.
    pub title: String,
    /// Priority name.
    pub priority: String,
    /// Lifecycle state name.
    pub state: String,
    /// Optional assignee.
    pub assignee_id: Option<String>,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records. Identifier, version and timestamps come
/// from column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow<'a> {
    /// Owning tenant.
    pub tenant_id: &'a str,
    /// Owning workspace.
    pub workspace_id: &'a str,
    /// Task title.
    pub title: &'a str,
    /// Priority name.
    pub priority: &'a str,
    /// Lifecycle state name.
    pub state: &'a str,
}

/// Insert model for outbox events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_events)]
pub struct NewTaskEventRow<'a> {
    /// Owning tenant.
    pub tenant_id: &'a str,
    /// Owning workspace.
    pub workspace_id: &'a str,
    /// Task the event describes.
    pub task_id: uuid::Uuid,
    /// Event type name.
    pub event_type: &'a str,
    /// Full task snapshot.
    pub snapshot: &'a Value,
}

/// Query result row for idempotency records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = idempotency_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IdempotencyRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Owning tenant.
    pub tenant_id: String,
    /// Owning workspace.
    pub workspace_id: String,
    /// Action name.
    pub action: String,
    /// Caller-supplied key.
    pub key: String,
    /// Identifier of the produced or affected entity.
    pub reference_id: String,
    /// Reference type name.
    pub reference_type: String,
    /// Request fingerprint.
    pub request_fingerprint: String,
    /// Snapshot replayed for later requests.
    pub response_snapshot: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// End of the retention window.
    pub expired_at: DateTime<Utc>,
}

/// Insert model for idempotency records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = idempotency_keys)]
pub struct NewIdempotencyRow<'a> {
    /// Owning tenant.
    pub tenant_id: &'a str,
    /// Owning workspace.
    pub workspace_id: &'a str,
    /// Action name.
    pub action: &'a str,
    /// Caller-supplied key.
    pub key: &'a str,
    /// Identifier of the produced or affected entity.
    pub reference_id: &'a str,
    /// Reference type name.
    pub reference_type: &'a str,
    /// Request fingerprint.
    pub request_fingerprint: &'a str,
    /// Snapshot replayed for later requests.
    pub response_snapshot: &'a Value,
    /// End of the retention window.
    pub expired_at: DateTime<Utc>,
}
