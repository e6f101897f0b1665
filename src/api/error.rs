//! HTTP error mapping.
//!
//! Every typed error from the kernel and the store collapses into an
//! [`ApiError`] carrying the status code and the message returned as
//! `{"ok": false, "error": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cosmogenesis_core::SimError;
use cosmogenesis_io::StoreError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "missing or invalid identity token".into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "ok": false, "error": self.message })),
        )
            .into_response()
    }
}

impl From<SimError> for ApiError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::Validation(msg) => Self::validation(msg),
            SimError::NotFound(msg) => Self::not_found(msg),
            SimError::BusinessRule(msg) => Self::validation(msg),
            SimError::Cancelled(_) => Self::internal("simulation timed out"),
            SimError::Internal(_) => Self::internal("internal server error"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::not_found(msg),
            StoreError::Conflict(_) => Self::internal("storage conflict, please retry"),
            StoreError::Database(_) | StoreError::Serialization(_) => {
                Self::internal("internal storage error")
            }
        }
    }
}
