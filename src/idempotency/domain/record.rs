//! Idempotency record types and their scalar values.

use super::{IdempotencyDomainError, ParseIdempotencyActionError, ParseReferenceTypeError};
use crate::task::domain::Task;
use crate::tenancy::WorkspaceScope;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Operation kind an idempotency key is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdempotencyAction {
    /// No action was recorded.
    Unspecified,
    /// Task creation.
    TaskCreate,
    /// Task assignment.
    TaskAssign,
    /// Task state update. Reserved; no workflow writes it yet.
    TaskStateUpdate,
}

impl IdempotencyAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::TaskCreate => "TASK_CREATE",
            Self::TaskAssign => "TASK_ASSIGN",
            Self::TaskStateUpdate => "TASK_STATE_UPDATE",
        }
    }
}

impl TryFrom<&str> for IdempotencyAction {
    type Error = ParseIdempotencyActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "UNSPECIFIED" => Ok(Self::Unspecified),
            "TASK_CREATE" => Ok(Self::TaskCreate),
            "TASK_ASSIGN" => Ok(Self::TaskAssign),
            "TASK_STATE_UPDATE" => Ok(Self::TaskStateUpdate),
            _ => Err(ParseIdempotencyActionError(value.to_owned())),
        }
    }
}

impl fmt::Display for IdempotencyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity an idempotent action produced or affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    /// No reference type was recorded.
    Unspecified,
    /// A task row.
    Task,
}

impl ReferenceType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Task => "TASK",
        }
    }
}

impl TryFrom<&str> for ReferenceType {
    type Error = ParseReferenceTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "UNSPECIFIED" => Ok(Self::Unspecified),
            "TASK" => Ok(Self::Task),
            _ => Err(ParseReferenceTypeError(value.to_owned())),
        }
    }
}

/// Caller-supplied idempotency token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Maximum number of characters in a key.
    pub const MAX_CHARS: usize = 255;

    /// Creates a validated key.
    ///
    /// # Errors
    ///
    /// Returns [`IdempotencyDomainError::BlankKey`] for blank input and
    /// [`IdempotencyDomainError::KeyTooLong`] above the character limit.
    pub fn new(value: impl Into<String>) -> Result<Self, IdempotencyDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(IdempotencyDomainError::BlankKey);
        }
        let actual = raw.chars().count();
        if actual > Self::MAX_CHARS {
            return Err(IdempotencyDomainError::KeyTooLong {
                max: Self::MAX_CHARS,
                actual,
            });
        }
        Ok(Self(raw))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex-encoded SHA-256 digest of the logical request behind a keyed write.
///
/// Stored with every record so that key reuse with a different payload can
/// be detected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    /// Fingerprints the JSON encoding of `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if `request` cannot be encoded.
    pub fn of<T: Serialize>(request: &T) -> Result<Self, serde_json::Error> {
        let encoded = serde_json::to_vec(request)?;
        Ok(Self(hex::encode(Sha256::digest(&encoded))))
    }

    /// Wraps a fingerprint read back from storage.
    #[must_use]
    pub const fn from_persisted(value: String) -> Self {
        Self(value)
    }

    /// Returns the fingerprint as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for an idempotency record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyRecordId(Uuid);

impl IdempotencyRecordId {
    /// Creates a new random record identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a record identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for IdempotencyRecordId {
    fn default() -> Self {
        Self::new()
    }
}

/// Record payload handed to the idempotency store for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdempotencyRecord {
    /// Owning tenant and workspace.
    pub scope: WorkspaceScope,
    /// Operation kind.
    pub action: IdempotencyAction,
    /// Caller-supplied key.
    pub key: IdempotencyKey,
    /// Identifier of the produced or affected entity.
    pub reference_id: String,
    /// Kind of the produced or affected entity.
    pub reference_type: ReferenceType,
    /// Fingerprint of the logical request.
    pub request_fingerprint: RequestFingerprint,
    /// Exact result to replay.
    pub response_snapshot: Value,
    /// End of the retention window.
    pub expired_at: DateTime<Utc>,
}

impl NewIdempotencyRecord {
    /// Hours a record is retained after creation.
    pub const RETENTION_HOURS: i64 = 24;

    /// Builds a record that replays `task` for later requests with `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the task snapshot cannot be
    /// produced.
    pub fn for_task(
        action: IdempotencyAction,
        key: IdempotencyKey,
        task: &Task,
        request_fingerprint: RequestFingerprint,
        now: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            scope: task.scope(),
            action,
            key,
            reference_id: task.id().to_string(),
            reference_type: ReferenceType::Task,
            request_fingerprint,
            response_snapshot: task.to_snapshot()?,
            expired_at: now + Duration::hours(Self::RETENTION_HOURS),
        })
    }
}

/// Stored outcome of a keyed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyRecord {
    /// Store-assigned identifier.
    pub id: IdempotencyRecordId,
    /// Owning tenant and workspace.
    pub scope: WorkspaceScope,
    /// Operation kind.
    pub action: IdempotencyAction,
    /// Caller-supplied key.
    pub key: IdempotencyKey,
    /// Identifier of the produced or affected entity.
    pub reference_id: String,
    /// Kind of the produced or affected entity.
    pub reference_type: ReferenceType,
    /// Fingerprint of the logical request that produced the record.
    pub request_fingerprint: RequestFingerprint,
    /// Exact result to replay.
    pub response_snapshot: Value,
    /// Store-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
    /// End of the retention window. Not enforced on lookup.
    pub expired_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    /// Completes an inserted record with its store-assigned fields.
    #[must_use]
    pub fn from_new(
        record: NewIdempotencyRecord,
        id: IdempotencyRecordId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let NewIdempotencyRecord {
            scope,
            action,
            key,
            reference_id,
            reference_type,
            request_fingerprint,
            response_snapshot,
            expired_at,
        } = record;
        Self {
            id,
            scope,
            action,
            key,
            reference_id,
            reference_type,
            request_fingerprint,
            response_snapshot,
            created_at,
            expired_at,
        }
    }
}
