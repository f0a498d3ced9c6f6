use thiserror::Error;

use super::credential::CredentialError;

#[derive(Error, Debug)]
pub enum FoundryError {
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl FoundryError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FoundryError::Auth { status, .. } | FoundryError::Server { status, .. } => {
                Some(*status)
            }
            FoundryError::NotFound(_) => Some(404),
            FoundryError::Validation(_) => Some(400),
            FoundryError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Map an HTTP status and error body to a typed error.
pub fn error_from_status(status: u16, body: &str) -> FoundryError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            let error = v.get("error")?;
            error
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| error.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string());

    match status {
        400 | 409 | 422 => FoundryError::Validation(message),
        401 | 403 => FoundryError::Auth { status, message },
        404 => FoundryError::NotFound(message),
        _ => FoundryError::Server { status, message },
    }
}
