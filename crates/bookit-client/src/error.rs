//! # Client Error Types
//!
//! Error types for store, fetch and mutation operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Server              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Server { status, body }│ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  (error / message)      │ │
//! │  │  ConfigLoad/Save│  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Protocol     │  │    Session      │  │      Domain             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidResponse│  │  NotAuthenticated│ │  Core(CoreError)        │ │
//! │  │  Serialization  │  │  SessionExpired │  │  MissingCredentials     │ │
//! │  │                 │  │  UnknownUser    │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What the User Sees
//! Every error reaches the user as one toast line from
//! [`ClientError::user_message`]. Server errors follow the envelope priority
//! (`error` → `message` → `"Invalid input"`). Local rule violations show their
//! own text. Everything else shows the fallback literal.

use bookit_core::{CoreError, ErrorBody, FALLBACK_ERROR_MESSAGE};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering every failure of the data layer.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The HTTP client gave up waiting.
    #[error("Request timed out: {0}")]
    Timeout(String),

    // =========================================================================
    // Server Errors
    // =========================================================================
    /// The backend answered with a non-success status.
    #[error("Server returned {status}: {}", .body.user_message())]
    Server { status: u16, body: ErrorBody },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// A success response did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Failed to serialize a request body.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// An authenticated call was attempted with no session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The session token's `exp` has passed.
    #[error("Session expired")]
    SessionExpired,

    /// Login form submitted with an empty field.
    #[error("{0}")]
    MissingCredentials(&'static str),

    /// A session exists but the login response did not say who it belongs to.
    #[error("Signed-in user is unknown, please sign in again")]
    UnknownUser,

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// A local rule rejected the operation before any request.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            ClientError::InvalidUrl(err.to_string())
        } else {
            ClientError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<bookit_core::ValidationError> for ClientError {
    fn from(err: bookit_core::ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

// =============================================================================
// Error Classification
// =============================================================================

/// Failure taxonomy used for logging and toast styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// No response was received.
    Transport,
    /// Server-reported (`error` field) or local validation failure.
    Validation,
    /// Server-reported generic failure (`message` field).
    Server,
    /// Anything else.
    Unclassified,
}

impl ClientError {
    /// Sorts the error into one of the four failure classes.
    pub fn class(&self) -> ErrorClass {
        match self {
            ClientError::ConnectionFailed(_) | ClientError::Timeout(_) => ErrorClass::Transport,
            ClientError::Server { body, .. } if body.error.is_some() => ErrorClass::Validation,
            ClientError::Server { body, .. } if body.message.is_some() => ErrorClass::Server,
            ClientError::Core(_) | ClientError::MissingCredentials(_) => ErrorClass::Validation,
            _ => ErrorClass::Unclassified,
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server { body, .. } => body.user_message(),
            ClientError::Core(err) => err.to_string(),
            ClientError::MissingCredentials(text) => text.to_string(),
            ClientError::NotAuthenticated
            | ClientError::SessionExpired
            | ClientError::UnknownUser => self.to_string(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }

    /// Returns true if the session is missing or no longer valid.
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated | ClientError::SessionExpired | ClientError::UnknownUser
        ) || matches!(self, ClientError::Server { status: 401, .. })
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(error: Option<&str>, message: Option<&str>) -> ClientError {
        ClientError::Server {
            status: 400,
            body: ErrorBody {
                error: error.map(String::from),
                message: message.map(String::from),
            },
        }
    }

    #[test]
    fn test_message_priority() {
        assert_eq!(server(Some("bad"), Some("ignored")).user_message(), "bad");
        assert_eq!(server(None, Some("not found")).user_message(), "not found");
        assert_eq!(server(None, None).user_message(), "Invalid input");
    }

    #[test]
    fn test_transport_errors_use_fallback() {
        let err = ClientError::ConnectionFailed("connection refused".into());
        assert_eq!(err.class(), ErrorClass::Transport);
        assert_eq!(err.user_message(), "Invalid input");

        let err = ClientError::Timeout("30s".into());
        assert_eq!(err.class(), ErrorClass::Transport);
        assert_eq!(err.user_message(), "Invalid input");
    }

    #[test]
    fn test_classification() {
        assert_eq!(server(Some("x"), None).class(), ErrorClass::Validation);
        assert_eq!(server(None, Some("x")).class(), ErrorClass::Server);
        assert_eq!(server(None, None).class(), ErrorClass::Unclassified);
        assert_eq!(
            ClientError::InvalidResponse("missing field".into()).class(),
            ErrorClass::Unclassified
        );
        assert_eq!(
            ClientError::MissingCredentials("Please enter your Password").class(),
            ErrorClass::Validation
        );
    }

    #[test]
    fn test_local_rule_text_is_shown() {
        let err: ClientError = CoreError::BookingChangeWindowClosed { min_days: 3 }.into();
        assert_eq!(
            err.user_message(),
            "Cannot change a booking less than 3 days before it starts"
        );
    }

    #[test]
    fn test_session_errors() {
        assert!(ClientError::NotAuthenticated.is_session_error());
        assert!(ClientError::UnknownUser.is_session_error());
        assert_eq!(
            ClientError::UnknownUser.user_message(),
            "Signed-in user is unknown, please sign in again"
        );
        assert!(ClientError::Server {
            status: 401,
            body: ErrorBody::default()
        }
        .is_session_error());
        assert!(!server(None, None).is_session_error());
    }
}
