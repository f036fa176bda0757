use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// StoreError
///
/// Failures raised by a key-value store adapter. Adapters never leak SDK error types;
/// everything is flattened into one of these variants before crossing the trait boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store is not bound or refused the connection.
    #[error("key-value store unavailable: {message}")]
    Unavailable { message: String },

    /// The store accepted the call but the operation failed.
    #[error("key-value store error: {message}")]
    Backend { message: String },

    /// A stored value could not be encoded or decoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// AppError
///
/// The request-level error taxonomy. Every variant renders as `{ "error": "..." }`
/// so API clients only ever have to handle one error shape.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid JSON payload")]
    InvalidJson,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    StoreUnavailable(String),

    /// Renders only `context`; the store's own message stays in the server log.
    #[error("{context}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Wraps a store failure with a message describing the operation that failed.
    pub fn store(context: impl Into<String>, source: StoreError) -> Self {
        match source {
            StoreError::Unavailable { message } => AppError::StoreUnavailable(message),
            source => AppError::Store {
                context: context.into(),
                source,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) | AppError::InvalidJson => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) | AppError::Store { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match std::error::Error::source(&self) {
                Some(source) => tracing::error!("request failed: {}: {}", self, source),
                None => tracing::error!("request failed: {}", self),
            }
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
