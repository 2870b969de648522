//! Error taxonomy for the chessgen client.
//!
//! - [`ValidationError`]: client-local input problems, caught before any
//!   network call.
//! - [`TransportError`]: the request never produced a usable JSON body
//!   (connection failure, non-JSON response, unexpected shape).
//! - [`ClientError`]: the union of the above plus server-reported failures
//!   (`success: false`), used by flows that don't need to render the three
//!   cases differently.

use thiserror::Error;

/// Input rejected before it reaches the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target_min ({min}) must be lower than target_max ({max})")]
    InvertedRange { min: i64, max: i64 },

    #[error("{field} is not a valid integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("invalid username (3-20 characters: letters, digits, underscore)")]
    Username,

    #[error("invalid email address")]
    Email,

    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
}

/// The backend could not be reached or answered with something unusable.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{method} {url} failed: {message}")]
    Network {
        method: &'static str,
        url: String,
        message: String,
    },

    #[error("{url} returned a non-JSON body (HTTP {status})")]
    InvalidBody { url: String, status: u16 },

    #[error("unexpected response from {endpoint}: {message}")]
    Malformed { endpoint: String, message: String },
}

impl TransportError {
    pub fn malformed(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}

/// Any failure of a remote operation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server answered with `success: false`; carries its `error` string.
    #[error("server error: {0}")]
    Application(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_converts_into_client_error() {
        let err: ClientError = ValidationError::InvertedRange { min: 5, max: 5 }.into();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "target_min (5) must be lower than target_max (5)"
        );
    }

    #[test]
    fn application_error_echoes_server_message() {
        let err = ClientError::Application("Position non trouvée".to_string());
        assert!(err.to_string().contains("Position non trouvée"));
    }

    #[test]
    fn malformed_names_endpoint() {
        let err = TransportError::malformed("generate", "missing `data`");
        assert_eq!(
            err.to_string(),
            "unexpected response from generate: missing `data`"
        );
    }
}
