use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use copydesk_core::reviser::ReviserError;
use copydesk_core::store::StoreError;
use copydesk_core::workflow::WorkflowError;

/// API error type that maps to editor-UI-compatible JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("upstream reviser error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ArticleNotFound(_)
            | StoreError::CommentNotFound(_)
            | StoreError::RevisionNotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::RevisionInFlight
            | WorkflowError::NoPendingRevision
            | WorkflowError::Cancelled
            | WorkflowError::InvalidRevisionState(_)
            | WorkflowError::InvalidCommentState(_) => ApiError::Conflict(err.to_string()),
            WorkflowError::NothingToRevise => ApiError::BadRequest(err.to_string()),
            WorkflowError::Store(inner) => inner.into(),
            WorkflowError::Reviser(inner) => inner.into(),
        }
    }
}

impl From<ReviserError> for ApiError {
    fn from(err: ReviserError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Upstream(msg) => {
                tracing::warn!("Upstream reviser error: {msg}");
                (StatusCode::BAD_GATEWAY, "upstreamError", msg.clone())
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
