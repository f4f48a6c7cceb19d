//! Idempotency record store over an open transaction.

use super::executor::PgUnitOfWork;
use super::models::{IdempotencyRow, NewIdempotencyRow};
use super::schema::idempotency_keys;
use crate::idempotency::domain::{
    IdempotencyAction, IdempotencyKey, IdempotencyRecord, IdempotencyRecordId,
    NewIdempotencyRecord, ReferenceType, RequestFingerprint,
};
use crate::idempotency::ports::{
    IdempotencyStore, IdempotencyStoreError, IdempotencyStoreResult,
};
use crate::tenancy::WorkspaceScope;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

const SCOPE_ACTION_KEY_CONSTRAINT: &str = "idempotency_keys_scope_action_key_unique";

impl IdempotencyStore for PgUnitOfWork<'_> {
    fn find_idempotency_record(
        &mut self,
        scope: &WorkspaceScope,
        action: IdempotencyAction,
        key: &IdempotencyKey,
    ) -> IdempotencyStoreResult<Option<IdempotencyRecord>> {
        let row = idempotency_keys::table
            .filter(idempotency_keys::tenant_id.eq(scope.tenant_id().as_str()))
            .filter(idempotency_keys::workspace_id.eq(scope.workspace_id().as_str()))
            .filter(idempotency_keys::action.eq(action.as_str()))
            .filter(idempotency_keys::key.eq(key.as_str()))
            .select(IdempotencyRow::as_select())
            .first::<IdempotencyRow>(self.connection())
            .optional()
            .map_err(IdempotencyStoreError::persistence)?;
        row.map(row_to_record).transpose()
    }

    fn insert_idempotency_record(
        &mut self,
        record: &NewIdempotencyRecord,
    ) -> IdempotencyStoreResult<IdempotencyRecord> {
        let row = NewIdempotencyRow {
            tenant_id: record.scope.tenant_id().as_str(),
            workspace_id: record.scope.workspace_id().as_str(),
            action: record.action.as_str(),
            key: record.key.as_str(),
            reference_id: &record.reference_id,
            reference_type: record.reference_type.as_str(),
            request_fingerprint: record.request_fingerprint.as_str(),
            response_snapshot: &record.response_snapshot,
            expired_at: record.expired_at,
        };
        let assigned = diesel::insert_into(idempotency_keys::table)
            .values(&row)
            .returning((idempotency_keys::id, idempotency_keys::created_at))
            .get_result::<(uuid::Uuid, DateTime<Utc>)>(self.connection())
            .optional()
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                    if is_scope_action_key_violation(info.as_ref()) =>
                {
                    IdempotencyStoreError::DuplicateKey {
                        action: record.action,
                        key: record.key.clone(),
                    }
                }
                _ => IdempotencyStoreError::persistence(err),
            })?;

        let (id, created_at) = assigned.ok_or(IdempotencyStoreError::MissingReturnedRow)?;
        Ok(IdempotencyRecord::from_new(
            record.clone(),
            IdempotencyRecordId::from_uuid(id),
            created_at,
        ))
    }
}

fn is_scope_action_key_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == SCOPE_ACTION_KEY_CONSTRAINT)
}

fn row_to_record(row: IdempotencyRow) -> IdempotencyStoreResult<IdempotencyRecord> {
    let IdempotencyRow {
        id,
        tenant_id,
        workspace_id,
        action: persisted_action,
        key: persisted_key,
        reference_id,
        reference_type: persisted_reference_type,
        request_fingerprint,
        response_snapshot,
        created_at,
        expired_at,
    } = row;

    let scope = WorkspaceScope::from_parts(tenant_id, workspace_id)
        .map_err(IdempotencyStoreError::persistence)?;
    let action = IdempotencyAction::try_from(persisted_action.as_str())
        .map_err(IdempotencyStoreError::persistence)?;
    let key = IdempotencyKey::new(persisted_key).map_err(IdempotencyStoreError::persistence)?;
    let reference_type = ReferenceType::try_from(persisted_reference_type.as_str())
        .map_err(IdempotencyStoreError::persistence)?;

    Ok(IdempotencyRecord {
        id: IdempotencyRecordId::from_uuid(id),
        scope,
        action,
        key,
        reference_id,
        reference_type,
        request_fingerprint: RequestFingerprint::from_persisted(request_fingerprint),
        response_snapshot,
        created_at,
        expired_at,
    })
}
