use std::fmt;

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Shared by the wish form and the comment endpoint.
pub const REQUIRED_FIELDS_MESSAGE: &str = "name and message are required";

/// An error that has already been mapped to the status a visitor should see.
/// Server-side failures carry a generic message; details go to the log.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn missing_fields() -> Self {
        Self::bad_request(REQUIRED_FIELDS_MESSAGE)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn wish_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "wish not found")
    }

    pub fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
    }

    /// Logs `err` with `context` and hides it behind a 500.
    pub fn internal(context: &'static str, err: impl fmt::Debug) -> Self {
        tracing::error!(error = ?err, "{}", context);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, context)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::payload_too_large()
        } else {
            tracing::warn!(error = %err, "malformed multipart form");
            Self::bad_request("invalid multipart form")
        }
    }
}

/// A body cut off by the size limit is a 413; any other unreadable comment
/// body is reported like missing fields.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::payload_too_large()
        } else {
            Self::missing_fields()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: &self.message,
        });
        (self.status, body).into_response()
    }
}
