//! Error types for the issue API.
//!
//! Request-level failures on the issues path are reported in the response
//! body with HTTP 200, never through the status code. Only routing and
//! transport failures (unknown path, wrong method, timeout) use non-200
//! statuses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// In-body error payload: `{"error": "...", "_id": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Handler-level error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    // === Validation Errors ===
    /// A create request lacked `issue_title`, `issue_text` or `created_by`.
    #[error("required field(s) missing")]
    RequiredFieldsMissing,

    /// An update or delete request lacked `_id`.
    #[error("missing _id")]
    MissingId,

    /// An update request named a ticket but no field to change.
    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },

    // === Store Errors ===
    /// The create could not be persisted.
    #[error("could not create")]
    CouldNotCreate,

    /// No ticket matched, or the store failed during the update.
    #[error("could not update")]
    CouldNotUpdate { id: String },

    /// No ticket matched, or the store failed during the delete.
    #[error("could not delete")]
    CouldNotDelete { id: String },

    // === Routing Errors ===
    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request timed out")]
    Timeout,
}

impl ApiError {
    /// The HTTP status this error is sent with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::OK,
        }
    }

    /// The ticket ID echoed back with the error, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::NoUpdateFields { id }
            | Self::CouldNotUpdate { id }
            | Self::CouldNotDelete { id } => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            id: self.id().map(str::to_string),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
