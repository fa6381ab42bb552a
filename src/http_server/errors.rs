//! HTTP error mapping
//!
//! Every failure leaves the server as `{"error": "<message>"}` with the
//! status its source error reports. Server-side failures are logged with
//! full detail and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::storage::StorageError;

/// Message sent for every 5xx response
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong";

/// Error returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request was syntactically or semantically invalid
    #[error("{0}")]
    BadRequest(String),

    /// Login failed; unknown email and wrong password look the same
    #[error("Incorrect email or password")]
    InvalidLogin,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Blocking task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(String),
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    /// Returns the HTTP status for this error
    pub fn status(&self) -> StatusCode {
        let code = match self {
            ApiError::BadRequest(_) => 400,
            ApiError::InvalidLogin => 401,
            ApiError::Storage(e) => e.status_code(),
            ApiError::Auth(e) => e.status_code(),
            ApiError::Task(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Message safe to send to the client
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
