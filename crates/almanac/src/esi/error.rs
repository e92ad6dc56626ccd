//! Error types for ESI requests.

use thiserror::Error;

use crate::http::HttpError;

/// Errors for a single ESI request.
#[derive(Debug, Clone, Error)]
pub enum EsiError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Transport(#[from] HttpError),

    /// ESI answered with a non-success status.
    #[error("ESI error ({status}) on {path}: {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("Invalid payload from {path}: {message}")]
    Validation { path: String, message: String },

    /// The request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Encode(String),

    /// A name lookup asked for more ids than one request may carry.
    #[error("Name lookup of {count} ids exceeds the limit of {limit}")]
    TooManyIds { count: usize, limit: usize },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EsiError {
    pub(crate) fn validation(path: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Whether the failure happened before or at the HTTP layer.
    #[inline]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    #[inline]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Status code, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &EsiError) -> String {
    match err {
        EsiError::Transport(_) => "Network error".to_string(),
        EsiError::Status {
            status, message, ..
        } => {
            if message.len() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        EsiError::Validation { .. } => "Invalid payload".to_string(),
        EsiError::Encode(_) => "Encode error".to_string(),
        EsiError::TooManyIds { count, .. } => format!("Too many ids ({})", count),
        EsiError::Config(msg) => format!("Config: {}", msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let transport = EsiError::from(HttpError::Transport("timed out".to_string()));
        assert!(transport.is_transport());
        assert!(!transport.is_validation());

        let status = EsiError::Status {
            status: 502,
            path: "/markets/groups/".to_string(),
            message: "Bad Gateway".to_string(),
        };
        assert!(status.is_transport());
        assert_eq!(status.status(), Some(502));

        let invalid = EsiError::validation("/universe/names/", "missing field `name`");
        assert!(invalid.is_validation());
        assert_eq!(invalid.status(), None);
    }

    #[test]
    fn display_includes_context() {
        let err = EsiError::Status {
            status: 420,
            path: "/markets/groups/4/".to_string(),
            message: "Error limited".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("420"));
        assert!(msg.contains("/markets/groups/4/"));
    }

    #[test]
    fn short_message_truncates_long_bodies() {
        let err = EsiError::Status {
            status: 500,
            path: "/".to_string(),
            message: "x".repeat(80),
        };
        let msg = short_error_message(&err);
        assert!(msg.starts_with("HTTP 500: "));
        assert!(msg.ends_with("..."));

        let err = EsiError::validation("/", "oops");
        assert_eq!(short_error_message(&err), "Invalid payload");
    }
}
