// std imports
use std::fmt;

// 3rd party imports
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error body
///
#[derive(Debug)]
enum ErrorMessage {
    /// Single message, rendered as `{"errors": {"general": "..."}}`
    General(String),
    /// Validation errors, rendered as `{"errors": ["...", ...]}`
    Validation(Vec<String>),
}

///  General error type
///
#[derive(Debug)]
pub struct WebError {
    status_code: StatusCode,
    msg: ErrorMessage,
}

impl WebError {
    /// Create new WebError
    ///
    /// # Arguments
    /// * `status_code` - HTTP status code
    /// * `msg` - Error message
    ///
    pub fn new(status_code: StatusCode, msg: String) -> Self {
        Self {
            status_code,
            msg: ErrorMessage::General(msg),
        }
    }

    /// Creates a new `WebError` for invalid requests (422)
    ///
    /// # Arguments
    /// * `errors` - All problems found in the request
    ///
    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            status_code: StatusCode::UNPROCESSABLE_ENTITY,
            msg: ErrorMessage::Validation(errors),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

/// Tell axum how to convert `WebError` into a response.
///
impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = match self.msg {
            ErrorMessage::General(msg) => json!({ "errors": { "general": msg } }),
            ErrorMessage::Validation(errors) => json!({ "errors": errors }),
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// Create WebError from anyhow::Error
///
impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
    }
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.msg {
            ErrorMessage::General(msg) => write!(f, "{}, {}", self.status_code, msg),
            ErrorMessage::Validation(errors) => {
                write!(f, "{}, {}", self.status_code, errors.join("; "))
            }
        }
    }
}
