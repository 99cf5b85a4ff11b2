//! # Domain Types
//!
//! Resources exchanged with the booking API and the small value types the
//! client uses to talk about them (ids, kinds, pages, booking tabs).
//!
//! ## Resource Kinds
//! ```text
//! ┌──────────────┬──────────────────┬───────────────┬─────────────────────┐
//! │ Kind         │ REST collection  │ Id type       │ Delete path         │
//! ├──────────────┼──────────────────┼───────────────┼─────────────────────┤
//! │ Listing      │ /listings        │ integer       │ /listings/<id>      │
//! │ Availability │ /availabilities  │ integer       │ /availabilities/<id>│
//! │ Booking      │ /bookings        │ opaque string │ /bookings/<uuid>    │
//! │ Review       │ /ratings         │ integer       │ /ratings/<id>       │
//! └──────────────┴──────────────────┴───────────────┴─────────────────────┘
//! ```
//!
//! All time values are Unix epoch seconds, as sent by the API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Resources
// =============================================================================

/// A bookable listing owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub listing_id: i64,
    pub listing_name: String,
    #[serde(default)]
    pub address: String,
    /// One of [`crate::LISTING_CATEGORIES`], or empty.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Owner's username. Cards compare it against the signed-in user.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub listing_image: Option<String>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
}

/// A time slot during which a listing can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub availability_id: i64,
    pub listing_id: i64,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

impl Availability {
    /// Length of the slot in hours.
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time) as f64 / 3600.0
    }
}

/// A user's booking of one availability slot.
///
/// The API returns a slimmer or richer object depending on the endpoint,
/// so everything but the id is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: i64,
    /// Opaque id used for deletion (`DELETE /bookings/<uuid>`).
    #[serde(default, alias = "uuid")]
    pub booking_uuid: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub listing_id: Option<i64>,
    #[serde(default)]
    pub availability_id: Option<i64>,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub listing_name: Option<String>,
}

impl Booking {
    /// Whether the booking's window has ended at `now`.
    ///
    /// A booking without a known end time is never past.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end_time
            .map(|end| end <= now.timestamp())
            .unwrap_or(false)
    }

    /// Start of the booking as a timestamp, if known.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.start_time
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// Booked hours, or zero when the window is unknown.
    pub fn duration_hours(&self) -> f64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end > start => (end - start) as f64 / 3600.0,
            _ => 0.0,
        }
    }
}

/// A rating left on a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    #[serde(alias = "id")]
    pub rating_id: i64,
    pub listing_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// An account as returned by `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "id")]
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

// =============================================================================
// Mutation Drafts
// =============================================================================
// Request bodies for create/edit. Checked by `crate::validation` before
// they are sent.

/// Body of `POST /listings` and `PUT /listings/<id>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub listing_name: String,
    pub address: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_image: Option<String>,
}

/// Body of `POST /availabilities` and `PUT /availabilities/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityDraft {
    pub listing_id: i64,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Body of `POST /bookings` and `PUT /bookings/<id>`.
///
/// The API requires `user_id` and checks it against the token's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub listing_id: i64,
    pub availability_id: i64,
    pub start_time: i64,
    pub end_time: i64,
}

impl BookingDraft {
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time) as f64 / 3600.0
    }
}

/// Body of `POST /ratings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub listing_id: i64,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

// =============================================================================
// Resource Kind
// =============================================================================

/// The four mutable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Listing,
    Availability,
    Booking,
    Review,
}

impl ResourceKind {
    /// REST collection segment for this kind.
    pub fn collection_path(&self) -> &'static str {
        match self {
            ResourceKind::Listing => "listings",
            ResourceKind::Availability => "availabilities",
            ResourceKind::Booking => "bookings",
            ResourceKind::Review => "ratings",
        }
    }

    /// Whether this kind is addressed by an opaque string id.
    pub fn uses_opaque_id(&self) -> bool {
        matches!(self, ResourceKind::Booking)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Listing => "Listing",
            ResourceKind::Availability => "Availability",
            ResourceKind::Booking => "Booking",
            ResourceKind::Review => "Review",
        };
        f.write_str(name)
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "listing" | "listings" => Ok(ResourceKind::Listing),
            "availability" | "availabilities" => Ok(ResourceKind::Availability),
            "booking" | "bookings" => Ok(ResourceKind::Booking),
            "review" | "reviews" | "rating" | "ratings" => Ok(ResourceKind::Review),
            other => Err(CoreError::Validation(
                crate::error::ValidationError::NotAllowed {
                    field: format!("resource kind '{}'", other),
                    allowed: vec![
                        "listing".to_string(),
                        "availability".to_string(),
                        "booking".to_string(),
                        "review".to_string(),
                    ],
                },
            )),
        }
    }
}

// =============================================================================
// Resource Id
// =============================================================================

/// Identifier of a resource: integer for most kinds, opaque for bookings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Numeric(i64),
    Opaque(String),
}

impl ResourceId {
    /// Parses raw user input into the id type `kind` expects.
    pub fn parse_for(kind: ResourceKind, raw: &str) -> CoreResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::InvalidTarget {
                kind,
                reason: "identifier is empty".to_string(),
            });
        }

        if kind.uses_opaque_id() {
            return Ok(ResourceId::Opaque(raw.to_string()));
        }

        raw.parse::<i64>()
            .map(ResourceId::Numeric)
            .map_err(|_| CoreError::InvalidTarget {
                kind,
                reason: format!("expected an integer id, got '{}'", raw),
            })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Numeric(id) => write!(f, "{}", id),
            ResourceId::Opaque(id) => f.write_str(id),
        }
    }
}

// =============================================================================
// Pending Deletion
// =============================================================================

/// The target of an open delete confirmation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    target_id: ResourceId,
    target_kind: ResourceKind,
}

impl PendingDeletion {
    /// Creates a pending deletion, checking that the id type fits the kind.
    pub fn new(target_id: ResourceId, target_kind: ResourceKind) -> CoreResult<Self> {
        match (&target_id, target_kind.uses_opaque_id()) {
            (ResourceId::Opaque(_), false) => Err(CoreError::InvalidTarget {
                kind: target_kind,
                reason: "expected an integer id".to_string(),
            }),
            (ResourceId::Numeric(_), true) => Err(CoreError::InvalidTarget {
                kind: target_kind,
                reason: "expected an opaque id".to_string(),
            }),
            (ResourceId::Opaque(id), true) if id.trim().is_empty() => {
                Err(CoreError::InvalidTarget {
                    kind: target_kind,
                    reason: "identifier is empty".to_string(),
                })
            }
            _ => Ok(Self {
                target_id,
                target_kind,
            }),
        }
    }

    pub fn target_id(&self) -> &ResourceId {
        &self.target_id
    }

    pub fn target_kind(&self) -> ResourceKind {
        self.target_kind
    }

    /// Heading of the confirmation dialog.
    pub fn title(&self) -> String {
        format!("Delete {}", self.target_kind)
    }

    /// Question asked before the request is sent.
    pub fn prompt(&self) -> String {
        format!(
            "Deleting this {} is irreversible. Are you sure you want to delete it?",
            self.target_kind
        )
    }

    /// Path of the DELETE request, relative to the base URL.
    pub fn delete_path(&self) -> String {
        format!(
            "/{}/{}",
            self.target_kind.collection_path(),
            self.target_id
        )
    }
}

// =============================================================================
// Bookings: Upcoming / Past
// =============================================================================

/// Bookings split into two disjoint sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingPartition {
    #[serde(default)]
    pub upcoming: Vec<Booking>,
    #[serde(default)]
    pub past: Vec<Booking>,
}

impl BookingPartition {
    /// Splits a flat list against `now`, preserving order within each side.
    pub fn partition(bookings: Vec<Booking>, now: DateTime<Utc>) -> Self {
        let (past, upcoming) = bookings.into_iter().partition(|b| b.is_past(now));
        Self { upcoming, past }
    }

    /// The sub-sequence shown for a tab.
    pub fn for_tab(&self, tab: BookingTab) -> &[Booking] {
        match tab {
            BookingTab::Upcoming => &self.upcoming,
            BookingTab::Past => &self.past,
        }
    }

    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty()
    }

    /// Iterates every booking, upcoming first.
    pub fn iter(&self) -> impl Iterator<Item = &Booking> {
        self.upcoming.iter().chain(self.past.iter())
    }
}

/// Selector for which booking sub-sequence a view renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingTab {
    #[default]
    Upcoming,
    Past,
}

impl BookingTab {
    pub fn toggle(self) -> Self {
        match self {
            BookingTab::Upcoming => BookingTab::Past,
            BookingTab::Past => BookingTab::Upcoming,
        }
    }
}

// =============================================================================
// Page Marker
// =============================================================================

/// The logical current route.
///
/// Written by each top-level view when it mounts. Read by the delete
/// workflow and by cards that change their actions per page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageMarker(String);

impl PageMarker {
    pub const LOGIN: &'static str = "/login";
    pub const MY_LISTINGS: &'static str = "/mylistings";
    pub const MY_BOOKINGS: &'static str = "/mybookings";
    pub const SEARCH: &'static str = "/search";
    pub const LISTING_EDIT: &'static str = "/listings/edit";

    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Detail page of a single listing.
    pub fn listing_detail(listing_id: i64) -> Self {
        Self(format!("/listings/{}", listing_id))
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn is(&self, path: &str) -> bool {
        self.0 == path
    }
}

impl Default for PageMarker {
    fn default() -> Self {
        Self(Self::LOGIN.to_string())
    }
}

impl fmt::Display for PageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
