//! Wire-level error responses.

use crate::workflow::services::TaskWorkflowError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Status reason phrase.
    pub error: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Offending input field, for bad requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Missing resource kind, for not-found errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Version the caller supplied, for conflicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u32>,
    /// Last version observed by the server, for conflicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_version: Option<u32>,
}

impl ApiErrorBody {
    fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
            field: None,
            resource: None,
            expected_version: None,
            actual_version: None,
        }
    }
}

/// Error body paired with its status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// JSON body.
    pub body: ApiErrorBody,
}

impl ApiErrorResponse {
    /// 400 naming the offending field.
    #[must_use]
    pub fn bad_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorBody {
                field: Some(field.into()),
                ..ApiErrorBody::new("Bad Request", message)
            },
        }
    }

    /// 403.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            body: ApiErrorBody::new("Forbidden", message),
        }
    }

    /// 404 naming the missing resource kind.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ApiErrorBody {
                resource: Some(resource.into()),
                ..ApiErrorBody::new("Not Found", message)
            },
        }
    }

    /// 409 carrying both versions.
    #[must_use]
    pub fn conflict(message: impl Into<String>, expected_version: u32, actual_version: u32) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            body: ApiErrorBody {
                expected_version: Some(expected_version),
                actual_version: Some(actual_version),
                ..ApiErrorBody::new("Conflict", message)
            },
        }
    }

    /// 500 with a generic message. The cause is never sent to the caller.
    #[must_use]
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ApiErrorBody::new("Internal Server Error", "An unexpected error occurred"),
        }
    }
}

impl From<TaskWorkflowError> for ApiErrorResponse {
    fn from(error: TaskWorkflowError) -> Self {
        match error {
            TaskWorkflowError::Validation { field, message } => Self::bad_request(field, message),
            TaskWorkflowError::Authorization(message) => Self::forbidden(message),
            TaskWorkflowError::NotFound { resource, message } => Self::not_found(resource, message),
            TaskWorkflowError::Conflict {
                expected_version,
                actual_version,
            } => Self::conflict(
                format!(
                    "Task version mismatch: expected {expected_version}, actual {actual_version}"
                ),
                expected_version.value(),
                actual_version.value(),
            ),
            unexpected @ (TaskWorkflowError::TaskStore(_)
            | TaskWorkflowError::IdempotencyStore(_)
            | TaskWorkflowError::Transaction(_)
            | TaskWorkflowError::Snapshot(_)) => {
                tracing::error!(error = %unexpected, "unexpected task workflow failure");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
