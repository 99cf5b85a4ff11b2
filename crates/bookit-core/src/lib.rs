//! # bookit-core: Pure Domain Logic for the BookIt Client
//!
//! This crate holds the parts of the booking client that have real
//! invariants but need no I/O: resource identity, the delete-confirmation
//! state machine, the post-delete redirect rule, error-envelope
//! normalization and the booking rules enforced before a mutation is sent.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       BookIt Client Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Views (pages, cards, dialogs)                │   │
//! │  │   MyListings ──► MyBookings ──► Listing detail ──► Search       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ mount / signal change                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              bookit-client (store, fetch, mutations)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bookit-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │ collection │  │  dialog   │  │ validation│ │   │
//! │  │   │  Listing  │  │  status    │  │  Delete   │  │  booking  │ │   │
//! │  │   │  Booking  │  │  items     │  │  machine  │  │  rules    │ │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO SHARED STATE • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Resources (Listing, Availability, Booking, Review), ids, pages
//! - [`collection`] - `ResourceCollection<T>` with its load status
//! - [`dialog`] - Delete confirmation state machine and redirect rule
//! - [`error`] - Domain errors and the server error envelope
//! - [`validation`] - Rules checked before a mutation leaves the client
//!
//! ## Example Usage
//!
//! ```rust
//! use bookit_core::{ErrorBody, FALLBACK_ERROR_MESSAGE};
//!
//! let body = ErrorBody {
//!     error: None,
//!     message: Some("not found".to_string()),
//! };
//! assert_eq!(body.user_message(), "not found");
//! assert_eq!(ErrorBody::default().user_message(), FALLBACK_ERROR_MESSAGE);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collection;
pub mod dialog;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use collection::{CollectionStatus, ResourceCollection};
pub use dialog::{post_delete_redirect, DeleteDialog, DialogState};
pub use error::{CoreError, CoreResult, ErrorBody, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Scheme literal used in the `Authorization` header (`JWT <token>`).
pub const AUTH_SCHEME: &str = "JWT";

/// Message shown when a failed response carries neither `error` nor `message`.
pub const FALLBACK_ERROR_MESSAGE: &str = "Invalid input";

/// Backend port used when configuration does not name one.
pub const DEFAULT_BACKEND_PORT: u16 = 5000;

/// A booking can only be changed while its start is at least this many days away.
pub const BOOKING_CHANGE_MIN_DAYS: i64 = 3;

/// Maximum booked hours one user may hold within a calendar month.
pub const MAX_MONTHLY_BOOKING_HOURS: f64 = 10.0;

/// Listing categories accepted by the backend (empty means "none").
pub const LISTING_CATEGORIES: [&str; 5] = [
    "entertainment",
    "sport",
    "accommodation",
    "healthcare",
    "other",
];
