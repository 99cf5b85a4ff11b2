//! # Error Types
//!
//! Domain-specific error types for bookit-core, plus the error envelope the
//! booking API returns on failure.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bookit-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorBody        - `{error?, message?}` envelope from the server  │
//! │                                                                         │
//! │  bookit-client errors (separate crate)                                 │
//! │  └── ClientError      - Transport / server / session failures          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → toast text          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Message Priority
//! Every failure shown to the user goes through [`ErrorBody::user_message`]:
//! `error` field, else `message` field, else [`FALLBACK_ERROR_MESSAGE`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ResourceKind;
use crate::FALLBACK_ERROR_MESSAGE;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The identifier does not fit the resource kind.
    ///
    /// Bookings are deleted by their opaque string id; every other kind is
    /// addressed by an integer id.
    #[error("Invalid {kind} identifier: {reason}")]
    InvalidTarget { kind: ResourceKind, reason: String },

    /// A dialog action was attempted from a state that does not allow it.
    #[error("Cannot {action} a delete dialog that is {state}")]
    InvalidDialogTransition { action: String, state: String },

    /// The booking starts too soon to be changed.
    ///
    /// ## User Workflow
    /// ```text
    /// Change booking (starts in 2 days)
    ///      │
    ///      ▼
    /// BookingChangeWindowClosed { min_days: 3 }
    ///      │
    ///      ▼
    /// Toast: "Cannot change a booking less than 3 days before it starts"
    /// ```
    #[error("Cannot change a booking less than {min_days} days before it starts")]
    BookingChangeWindowClosed { min_days: i64 },

    /// The new booking would exceed the monthly hours cap.
    #[error("Not allowed to have more than {max_hours} hours in a calendar month (requested {requested_hours:.1})")]
    MonthlyHoursExceeded {
        max_hours: f64,
        requested_hours: f64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Checked before a mutation request is sent.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., end before start).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Server Error Envelope
// =============================================================================

/// Error body returned by the booking API.
///
/// The server reports validation failures under `error` and generic
/// failures under `message`. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Server-reported validation error.
    #[serde(default)]
    pub error: Option<String>,

    /// Server-reported generic error.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Parses an error envelope from a raw response body.
    ///
    /// Bodies that are not JSON objects (HTML error pages, empty bodies)
    /// produce an empty envelope.
    pub fn from_json_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice::<ErrorBody>(bytes).unwrap_or_default()
    }

    /// Selects the text shown to the user.
    ///
    /// Strict priority: `error` → `message` → [`FALLBACK_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_string()
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
