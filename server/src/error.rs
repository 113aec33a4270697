//! Translation of every failure into the JSON error body.
//!
//! All error responses share one shape: `{success: false, message, error?,
//! details?}`. `error` carries a human-readable reason when there is one;
//! `details` lists per-field validation failures.

use std::any::Any;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use todo_core::{FieldError, InvalidId, StoreError, ValidationErrors};

pub const TODO_NOT_FOUND: &str = "Todo not found";
pub const INTERNAL_ERROR: &str = "Internal Server Error";
pub const TOO_MANY_REQUESTS: &str = "Too many requests from this IP, please try again later.";

/// Errors returned by request handlers and middleware.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One or more payload fields were rejected.
    #[error("Validation Error: {0}")]
    Validation(#[from] ValidationErrors),

    /// The request itself is unusable: blank id, unreadable body.
    #[error("{message}")]
    BadRequest {
        message: String,
        detail: Option<String>,
    },

    /// No todo or no route matches.
    #[error("{0}")]
    NotFound(String),

    /// The client exhausted its request budget for the current window.
    #[error("rate limit exceeded")]
    TooManyRequests,

    /// Unexpected failure. `detail` is only set outside production.
    #[error("internal error")]
    Internal { detail: Option<String> },
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
            details: None,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the 500 error for a caught panic.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>, expose_detail: bool) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic".to_string()
        };
        tracing::error!(%detail, "handler panicked");
        ApiError::Internal {
            detail: expose_detail.then_some(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(TODO_NOT_FOUND.to_string()),
        }
    }
}

impl From<InvalidId> for ApiError {
    fn from(err: InvalidId) -> Self {
        ApiError::BadRequest {
            message: err.to_string(),
            detail: None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid request body".to_string(),
            detail: Some(rejection.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid request path".to_string(),
            detail: Some(rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid query string".to_string(),
            detail: Some(rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => {
                tracing::warn!(%errors, "validation failed");
                ErrorBody {
                    error: Some(errors.to_string()),
                    details: Some(errors.errors),
                    ..ErrorBody::new("Validation Error")
                }
            }
            ApiError::BadRequest { message, detail } => {
                tracing::warn!(%message, ?detail, "bad request");
                ErrorBody {
                    error: detail,
                    ..ErrorBody::new(message)
                }
            }
            ApiError::NotFound(message) => ErrorBody::new(message),
            ApiError::TooManyRequests => ErrorBody::new(TOO_MANY_REQUESTS),
            ApiError::Internal { detail } => {
                tracing::error!(?detail, "internal server error");
                ErrorBody {
                    error: detail,
                    ..ErrorBody::new(INTERNAL_ERROR)
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
