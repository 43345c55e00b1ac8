//! Error taxonomy shared by the HTTP client, the services and local storage.

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message fragments the API uses when a bearer token is expired, malformed or missing.
const EXPIRY_MARKERS: [&str; 4] = ["expired", "invalid", "not provided", "authentication"];

/// Structured error codes that mean the same thing.
const EXPIRY_CODES: [&str; 3] = ["token_not_valid", "not_authenticated", "authentication_failed"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401/403 whose body says the credential is expired or invalid.
    #[error("authentication expired ({status}): {message}")]
    AuthExpired { status: StatusCode, message: String },

    /// Any other client error, handed back untouched.
    #[error("request rejected ({status}): {body}")]
    Validation { status: StatusCode, body: String },

    #[error("unexpected response: {0}")]
    Unknown(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Classify a non-success response.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        if is_auth_failure(status) && is_expiry_signal(body) {
            ApiError::AuthExpired {
                status,
                message: error_message(body).unwrap_or_else(|| body.to_string()),
            }
        } else if status.is_client_error() {
            ApiError::Validation {
                status,
                body: body.to_string(),
            }
        } else {
            ApiError::Unknown(format!("{}: {}", status, body))
        }
    }

    /// The HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthExpired { status, .. } | ApiError::Validation { status, .. } => {
                Some(*status)
            }
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired { .. })
    }
}

pub fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Does this error body say the bearer credential is expired, invalid or missing?
///
/// JSON bodies are checked for a known `code` first, then for a marker inside
/// `detail`, `message` or `error`. Anything else is matched as raw text.
pub fn is_expiry_signal(body: &str) -> bool {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            if let Some(code) = json.get("code").and_then(Value::as_str) {
                if EXPIRY_CODES.contains(&code) {
                    return true;
                }
            }
            error_message(body)
                .map(|message| contains_marker(&message))
                .unwrap_or(false)
        }
        Err(_) => contains_marker(body),
    }
}

fn contains_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    EXPIRY_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Pulls the human readable message out of a DRF style error body.
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|field| json.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}
