//! # Validation Module
//!
//! Rules checked on the client before a create/edit request is sent.
//! The backend enforces the same rules; checking locally saves a round trip
//! and gives the user the message straight away.
//!
//! ## Validation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mutation Validation                              │
//! │                                                                         │
//! │  Draft from form                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌──────────────────┐  │
//! │  │ Field rules     │ ──► │ Time rules      │ ──► │ Account rules    │  │
//! │  │ required/length │     │ end > start     │     │ 3-day window     │  │
//! │  │ category/rating │     │                 │     │ 10 h per month   │  │
//! │  └─────────────────┘     └─────────────────┘     └──────────────────┘  │
//! │       │                                                   │            │
//! │       ▼ Err(ValidationError / CoreError)                  ▼ Ok(())      │
//! │  toast, no request                                  request sent        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{AvailabilityDraft, Booking, BookingDraft, ListingDraft, ReviewDraft};
use crate::{BOOKING_CHANGE_MIN_DAYS, LISTING_CATEGORIES, MAX_MONTHLY_BOOKING_HOURS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a listing name.
pub const MAX_LISTING_NAME_LENGTH: usize = 120;

/// Maximum length of free-text fields (description, review comment).
pub const MAX_TEXT_LENGTH: usize = 2000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a required string field is present.
///
/// ## Rules
/// - Must not be empty after trimming whitespace
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an upper bound on a string field's character count.
pub fn validate_max_length(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a listing category.
///
/// ## Rules
/// - Empty means "no category" and is accepted
/// - Otherwise must be one of [`LISTING_CATEGORIES`] (case-sensitive)
pub fn validate_category(category: &str) -> ValidationResult<()> {
    if category.is_empty() || LISTING_CATEGORIES.contains(&category) {
        return Ok(());
    }
    Err(ValidationError::NotAllowed {
        field: "category".to_string(),
        allowed: LISTING_CATEGORIES.iter().map(|c| c.to_string()).collect(),
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a review rating.
///
/// ## Rules
/// - Must be between 1 and 5 inclusive
pub fn validate_rating(rating: u8) -> ValidationResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }
    Ok(())
}

/// Validates that a time window ends after it starts.
pub fn validate_time_window(start_time: i64, end_time: i64) -> ValidationResult<()> {
    if end_time <= start_time {
        return Err(ValidationError::InvalidFormat {
            field: "end_time".to_string(),
            reason: "must be after start_time".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Draft Validators
// =============================================================================

pub fn validate_listing(draft: &ListingDraft) -> ValidationResult<()> {
    validate_required("listing_name", &draft.listing_name)?;
    validate_max_length("listing_name", &draft.listing_name, MAX_LISTING_NAME_LENGTH)?;
    validate_required("address", &draft.address)?;
    validate_category(&draft.category)?;
    validate_max_length("description", &draft.description, MAX_TEXT_LENGTH)?;
    Ok(())
}

pub fn validate_availability(draft: &AvailabilityDraft) -> ValidationResult<()> {
    validate_time_window(draft.start_time, draft.end_time)
}

pub fn validate_review(draft: &ReviewDraft) -> ValidationResult<()> {
    validate_rating(draft.rating)?;
    validate_max_length("comment", &draft.comment, MAX_TEXT_LENGTH)?;
    Ok(())
}

pub fn validate_booking(draft: &BookingDraft) -> ValidationResult<()> {
    validate_time_window(draft.start_time, draft.end_time)
}

// =============================================================================
// Booking Rules
// =============================================================================

/// Checks that an existing booking may still be changed at `now`.
///
/// ## Rules
/// - Its start must be at least [`BOOKING_CHANGE_MIN_DAYS`] days after `now`
/// - A booking with an unknown start is left for the server to judge
pub fn validate_booking_change(current: &Booking, now: DateTime<Utc>) -> CoreResult<()> {
    let Some(start) = current.starts_at() else {
        return Ok(());
    };

    if start - now < Duration::days(BOOKING_CHANGE_MIN_DAYS) {
        return Err(CoreError::BookingChangeWindowClosed {
            min_days: BOOKING_CHANGE_MIN_DAYS,
        });
    }
    Ok(())
}

/// Checks the monthly hours cap for a new or changed booking.
///
/// ## Rules
/// - Hours are counted per calendar month of each booking's start (UTC)
/// - `replacing` excludes the booking being edited from the tally
/// - Existing hours + draft hours must not exceed [`MAX_MONTHLY_BOOKING_HOURS`]
pub fn validate_monthly_hours(
    existing: &[Booking],
    draft: &BookingDraft,
    replacing: Option<i64>,
) -> CoreResult<()> {
    let Some(month) = month_of(draft.start_time) else {
        return Ok(());
    };

    let booked: f64 = existing
        .iter()
        .filter(|b| Some(b.booking_id) != replacing)
        .filter(|b| b.start_time.and_then(month_of) == Some(month))
        .map(Booking::duration_hours)
        .sum();

    let requested_hours = booked + draft.duration_hours();
    if requested_hours > MAX_MONTHLY_BOOKING_HOURS {
        return Err(CoreError::MonthlyHoursExceeded {
            max_hours: MAX_MONTHLY_BOOKING_HOURS,
            requested_hours,
        });
    }
    Ok(())
}

fn month_of(secs: i64) -> Option<(i32, u32)> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|t| (t.year(), t.month()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3600;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp()
    }

    fn booked(id: i64, start: i64, hours: i64) -> Booking {
        Booking {
            booking_id: id,
            booking_uuid: None,
            user_id: Some(1),
            listing_id: Some(1),
            availability_id: None,
            start_time: Some(start),
            end_time: Some(start + hours * HOUR),
            listing_name: None,
        }
    }

    fn draft(start: i64, hours: i64) -> BookingDraft {
        BookingDraft {
            user_id: Some(1),
            listing_id: 1,
            availability_id: 1,
            start_time: start,
            end_time: start + hours * HOUR,
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("address", "1 Main St").is_ok());
        assert!(validate_required("address", "   ").is_err());
    }

    #[test]
    fn test_validate_listing() {
        let mut listing = ListingDraft {
            listing_name: "Tennis court".to_string(),
            address: "1 Park Rd".to_string(),
            category: "sport".to_string(),
            ..Default::default()
        };
        assert!(validate_listing(&listing).is_ok());

        listing.category = String::new();
        assert!(validate_listing(&listing).is_ok());

        listing.category = "Sport".to_string();
        assert!(matches!(
            validate_listing(&listing),
            Err(ValidationError::NotAllowed { .. })
        ));

        listing.category = "sport".to_string();
        listing.listing_name = "x".repeat(MAX_LISTING_NAME_LENGTH + 1);
        assert!(matches!(
            validate_listing(&listing),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_validate_time_window() {
        assert!(validate_time_window(10, 20).is_ok());
        assert!(validate_time_window(20, 20).is_err());
        assert!(validate_time_window(30, 20).is_err());
    }

    #[test]
    fn test_booking_change_window() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let in_three_days = booked(1, ts(2024, 5, 4, 12), 1);
        assert!(validate_booking_change(&in_three_days, now).is_ok());

        let in_two_days = booked(2, ts(2024, 5, 3, 12), 1);
        assert!(matches!(
            validate_booking_change(&in_two_days, now),
            Err(CoreError::BookingChangeWindowClosed { min_days: 3 })
        ));

        let mut unknown = in_two_days.clone();
        unknown.start_time = None;
        assert!(validate_booking_change(&unknown, now).is_ok());
    }

    #[test]
    fn test_monthly_hours_cap() {
        let existing = vec![
            booked(1, ts(2024, 5, 2, 9), 4),
            booked(2, ts(2024, 5, 20, 9), 4),
            // Different month, not counted.
            booked(3, ts(2024, 6, 1, 9), 8),
        ];

        assert!(validate_monthly_hours(&existing, &draft(ts(2024, 5, 28, 9), 2), None).is_ok());
        assert!(matches!(
            validate_monthly_hours(&existing, &draft(ts(2024, 5, 28, 9), 3), None),
            Err(CoreError::MonthlyHoursExceeded { .. })
        ));

        // Editing booking 2 frees its 4 hours.
        assert!(
            validate_monthly_hours(&existing, &draft(ts(2024, 5, 28, 9), 6), Some(2)).is_ok()
        );
    }
}
