//! # Delete Confirmation Dialog
//!
//! State machine behind every delete button, plus the rule deciding where
//! the user lands afterwards.
//!
//! ## State Machine
//! ```text
//!            open(target)            confirm()
//!  ┌────────┐ ──────────► ┌────────────┐ ────────► ┌────────────┐
//!  │ Closed │             │ Confirming │           │  Deleting  │
//!  └────────┘ ◄────────── └────────────┘           └─────┬──────┘
//!      ▲        cancel()                                 │
//!      │                 finish()  (success OR failure)  │
//!      └─────────────────────────────────────────────────┘
//! ```
//!
//! `finish` is the only exit from `Deleting` and does not look at the
//! request outcome: the dialog always closes once the request settles.

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::{PageMarker, PendingDeletion, ResourceKind};

// =============================================================================
// Dialog State
// =============================================================================

/// Current state of a delete dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialogState {
    #[default]
    Closed,
    /// Waiting for the user to confirm or cancel.
    Confirming(PendingDeletion),
    /// The DELETE request is in flight.
    Deleting(PendingDeletion),
}

impl DialogState {
    /// The target, while one exists.
    pub fn pending(&self) -> Option<&PendingDeletion> {
        match self {
            DialogState::Closed => None,
            DialogState::Confirming(p) | DialogState::Deleting(p) => Some(p),
        }
    }
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialogState::Closed => "closed",
            DialogState::Confirming(_) => "confirming",
            DialogState::Deleting(_) => "deleting",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Delete Dialog
// =============================================================================

/// A delete confirmation dialog.
///
/// Transitions that the state does not allow return
/// [`CoreError::InvalidDialogTransition`] and leave the state untouched.
#[derive(Debug, Clone, Default)]
pub struct DeleteDialog {
    state: DialogState,
}

impl DeleteDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DialogState::Closed)
    }

    /// `Closed → Confirming`.
    pub fn open(&mut self, target: PendingDeletion) -> CoreResult<()> {
        match self.state {
            DialogState::Closed => {
                self.state = DialogState::Confirming(target);
                Ok(())
            }
            _ => Err(self.invalid("open")),
        }
    }

    /// `Confirming → Closed`, dropping the pending target.
    pub fn cancel(&mut self) -> CoreResult<()> {
        match self.state {
            DialogState::Confirming(_) => {
                self.state = DialogState::Closed;
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    /// `Confirming → Deleting`. Returns the target the request is for.
    pub fn confirm(&mut self) -> CoreResult<PendingDeletion> {
        match std::mem::take(&mut self.state) {
            DialogState::Confirming(target) => {
                self.state = DialogState::Deleting(target.clone());
                Ok(target)
            }
            other => {
                self.state = other;
                Err(self.invalid("confirm"))
            }
        }
    }

    /// `Deleting → Closed`, whatever the request returned.
    pub fn finish(&mut self) -> CoreResult<PendingDeletion> {
        match std::mem::take(&mut self.state) {
            DialogState::Deleting(target) => Ok(target),
            other => {
                self.state = other;
                Err(self.invalid("finish"))
            }
        }
    }

    fn invalid(&self, action: &str) -> CoreError {
        CoreError::InvalidDialogTransition {
            action: action.to_string(),
            state: self.state.to_string(),
        }
    }
}

// =============================================================================
// Redirect Rule
// =============================================================================

/// Where to send the user after deleting `kind` while on `page`.
///
/// Availability is edited in place and never navigates. Any other kind
/// deleted outside the two list pages returns the user to `/mylistings`.
pub fn post_delete_redirect(kind: ResourceKind, page: &PageMarker) -> Option<&'static str> {
    if kind == ResourceKind::Availability {
        return None;
    }
    if page.is(PageMarker::MY_LISTINGS) || page.is(PageMarker::MY_BOOKINGS) {
        return None;
    }
    Some(PageMarker::MY_LISTINGS)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceId;

    fn listing_target() -> PendingDeletion {
        PendingDeletion::new(ResourceId::Numeric(1), ResourceKind::Listing).unwrap()
    }

    #[test]
    fn test_full_cycle_closes_once() {
        let mut dialog = DeleteDialog::new();
        dialog.open(listing_target()).unwrap();
        assert!(matches!(dialog.state(), DialogState::Confirming(_)));

        let target = dialog.confirm().unwrap();
        assert_eq!(target.delete_path(), "/listings/1");
        assert!(matches!(dialog.state(), DialogState::Deleting(_)));

        dialog.finish().unwrap();
        assert_eq!(dialog.state(), &DialogState::Closed);

        // A second finish has nothing to close.
        assert!(dialog.finish().is_err());
        assert_eq!(dialog.state(), &DialogState::Closed);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut dialog = DeleteDialog::new();
        dialog.open(listing_target()).unwrap();
        dialog.cancel().unwrap();
        assert!(dialog.state().pending().is_none());
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_invalid_transitions_keep_state() {
        let mut dialog = DeleteDialog::new();
        assert!(dialog.confirm().is_err());
        assert!(dialog.cancel().is_err());

        dialog.open(listing_target()).unwrap();
        assert!(dialog.open(listing_target()).is_err());
        assert!(dialog.finish().is_err());
        assert!(matches!(dialog.state(), DialogState::Confirming(_)));

        dialog.confirm().unwrap();
        let err = dialog.cancel().unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel a delete dialog that is deleting");
    }

    #[test]
    fn test_redirect_rule() {
        let detail = PageMarker::listing_detail(3);
        let my_listings = PageMarker::new(PageMarker::MY_LISTINGS);
        let my_bookings = PageMarker::new(PageMarker::MY_BOOKINGS);

        for kind in [ResourceKind::Listing, ResourceKind::Booking, ResourceKind::Review] {
            assert_eq!(post_delete_redirect(kind, &detail), Some("/mylistings"));
            assert_eq!(post_delete_redirect(kind, &my_listings), None);
            assert_eq!(post_delete_redirect(kind, &my_bookings), None);
        }

        for page in [&detail, &my_listings, &my_bookings] {
            assert_eq!(post_delete_redirect(ResourceKind::Availability, page), None);
        }
    }
}
