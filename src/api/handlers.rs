//! Request handlers translating HTTP input into service requests.

use super::error::ApiErrorResponse;
use crate::tenancy::UserRole;
use crate::workflow::ports::TransactionExecutor;
use crate::workflow::services::{
    AssignTaskOutput, AssignTaskRequest, CreateTaskOutput, CreateTaskRequest, TaskService,
};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use mockable::Clock;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

/// Header carrying the caller's tenant.
pub const TENANT_HEADER: &str = "x-tenant-id";
/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-role";
/// Header carrying the idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
/// Header carrying the version the caller last observed.
pub const IF_MATCH_VERSION_HEADER: &str = "if-match-version";

#[derive(Debug, Default, Deserialize)]
struct CreateTaskBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssignTaskBody {
    #[serde(default)]
    assignee_id: Option<String>,
}

/// `GET /health`.
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `POST /v1/workspaces/{workspace_id}/tasks`.
///
/// # Errors
///
/// Returns an [`ApiErrorResponse`] for malformed bodies and for every
/// workflow error.
pub async fn create_task<X, C>(
    State(service): State<Arc<TaskService<X, C>>>,
    Path(workspace_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateTaskOutput>), ApiErrorResponse>
where
    X: TransactionExecutor,
    C: Clock + Send + Sync,
{
    let CreateTaskBody { title, priority } = parse_body(&body)?;
    let mut request = CreateTaskRequest::new(
        header_value(&headers, TENANT_HEADER).unwrap_or_default(),
        workspace_id,
        title.unwrap_or_default(),
        role_from(&headers),
    );
    if let Some(name) = priority {
        request = request.with_priority(name);
    }
    if let Some(key) = header_value(&headers, IDEMPOTENCY_KEY_HEADER) {
        request = request.with_idempotency_key(key);
    }

    let output = service.create_task(request).await?;
    Ok((StatusCode::CREATED, Json(output)))
}

/// `POST /v1/workspaces/{workspace_id}/tasks/{task_id}/assign`.
///
/// # Errors
///
/// Returns an [`ApiErrorResponse`] for a missing or non-numeric
/// `If-Match-Version` header, malformed bodies and every workflow error.
pub async fn assign_task<X, C>(
    State(service): State<Arc<TaskService<X, C>>>,
    Path((workspace_id, task_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AssignTaskOutput>, ApiErrorResponse>
where
    X: TransactionExecutor,
    C: Clock + Send + Sync,
{
    let expected_version = expected_version_from(&headers)?;
    let AssignTaskBody { assignee_id } = parse_body(&body)?;
    let mut request = AssignTaskRequest::new(
        header_value(&headers, TENANT_HEADER).unwrap_or_default(),
        workspace_id,
        task_id,
        assignee_id.unwrap_or_default(),
        role_from(&headers),
    )
    .with_expected_version(expected_version);
    if let Some(key) = header_value(&headers, IDEMPOTENCY_KEY_HEADER) {
        request = request.with_idempotency_key(key);
    }

    let output = service.assign_task(request).await?;
    Ok(Json(output))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn role_from(headers: &HeaderMap) -> UserRole {
    header_value(headers, ROLE_HEADER).map_or(UserRole::Unspecified, |raw| UserRole::from_name(&raw))
}

fn expected_version_from(headers: &HeaderMap) -> Result<u32, ApiErrorResponse> {
    let raw = header_value(headers, IF_MATCH_VERSION_HEADER)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            ApiErrorResponse::bad_request(
                IF_MATCH_VERSION_HEADER,
                "If-Match-Version header is required",
            )
        })?;
    raw.trim().parse::<u32>().map_err(|_| {
        ApiErrorResponse::bad_request(
            IF_MATCH_VERSION_HEADER,
            "If-Match-Version must be a valid number",
        )
    })
}

/// An empty body reads as an empty object.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiErrorResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|_| ApiErrorResponse::bad_request("body", "request body must be a JSON object"))
}
