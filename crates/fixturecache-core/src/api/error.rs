use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure talking to the fixtures service.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("Unexpected status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Longest body excerpt kept in an error message
const MAX_ERROR_BODY_LENGTH: usize = 300;

/// `{"error": "..."}`, the service's error envelope
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = server_message(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            s if s.is_server_error() => ApiError::Server { status, message },
            _ => ApiError::Status { status, message },
        }
    }
}

/// The `error` field of an error envelope, or an excerpt of the raw body.
fn server_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error;
    }
    let body = body.trim();
    if body.is_empty() {
        return "(empty body)".to_string();
    }
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &body[..end], body.len())
}
