//! # Mutation Workflow
//!
//! Every write to the backend follows the same protocol: one request, a
//! toast if it failed, then an update signal flip so every mounted view
//! re-fetches. Deletes add a confirmation step and a possible redirect.
//!
//! ## Delete Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Delete Workflow                                │
//! │                                                                         │
//! │  request(target)   dialog: Closed → Confirming                          │
//! │        │                                                                │
//! │  confirm()         dialog: Confirming → Deleting                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  DELETE /<kind>/<id>   Authorization: JWT <token>                       │
//! │        │                                                                │
//! │        ├── Ok  ─────────────────────────┐                               │
//! │        └── Err ──► toast(user_message) ─┤   never aborts here           │
//! │                                         ▼                               │
//! │                              flip update signal                         │
//! │                              dialog: Deleting → Closed                  │
//! │                              redirect? (kind ≠ Availability AND         │
//! │                                page ∉ {/mylistings, /mybookings})       │
//! │                                  └──► navigator.push("/mylistings")     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Create / Edit
//! Same shape minus the dialog. Local rules run first; a draft they reject
//! never leaves the client and does not flip the signal.

use std::future::Future;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use bookit_core::validation::{
    validate_availability, validate_booking, validate_booking_change, validate_listing,
    validate_monthly_hours, validate_review,
};
use bookit_core::{
    post_delete_redirect, AvailabilityDraft, Booking, BookingDraft, DeleteDialog, DialogState,
    ListingDraft, PendingDeletion, ResourceKind, ReviewDraft,
};

use crate::api::ApiClient;
use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Outcome
// =============================================================================

/// Explicit result of one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server accepted the change.
    Succeeded,
    /// The request was sent and failed. `message` was shown to the user.
    Failed { message: String },
    /// Refused locally; no request was sent.
    Rejected { message: String },
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Succeeded)
    }

    /// Whether a request reached the transport.
    pub fn was_attempted(&self) -> bool {
        !matches!(self, MutationOutcome::Rejected { .. })
    }
}

// =============================================================================
// Delete Workflow
// =============================================================================

/// Result of a confirmed delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub target: PendingDeletion,
    pub outcome: MutationOutcome,
    /// Route the user was sent to, if any.
    pub redirected_to: Option<&'static str>,
}

/// The delete confirmation dialog wired to the network.
pub struct DeleteWorkflow {
    ctx: ClientContext,
    dialog: Mutex<DeleteDialog>,
}

impl DeleteWorkflow {
    pub fn new(ctx: ClientContext) -> Self {
        DeleteWorkflow {
            ctx,
            dialog: Mutex::new(DeleteDialog::new()),
        }
    }

    pub async fn state(&self) -> DialogState {
        self.dialog.lock().await.state().clone()
    }

    /// Opens the dialog for `target`.
    pub async fn request(&self, target: PendingDeletion) -> ClientResult<()> {
        self.dialog.lock().await.open(target)?;
        Ok(())
    }

    /// Closes the dialog without sending anything.
    pub async fn cancel(&self) -> ClientResult<()> {
        self.dialog.lock().await.cancel()?;
        Ok(())
    }

    /// Sends the DELETE and closes the dialog, whatever the server says.
    ///
    /// Returns `Err` only when the dialog was not confirming.
    pub async fn confirm(&self) -> ClientResult<DeleteReport> {
        let target = self.dialog.lock().await.confirm()?;
        let kind = target.target_kind();

        let result = match self.ctx.store.token().await {
            Ok(token) => self.ctx.api.delete(&token, &target).await,
            Err(err) => Err(err),
        };

        let outcome = match result {
            Ok(()) => {
                info!(kind = %kind, id = %target.target_id(), "Deleted");
                MutationOutcome::Succeeded
            }
            Err(err) => {
                let message = err.user_message();
                warn!(kind = %kind, id = %target.target_id(), error = %err, "Delete failed");
                self.ctx.notify_error(message.clone());
                MutationOutcome::Failed { message }
            }
        };

        self.ctx.store.flip_update_signal();
        self.dialog.lock().await.finish()?;

        let page = self.ctx.store.page().get().await;
        let redirected_to = post_delete_redirect(kind, &page);
        if let Some(path) = redirected_to {
            info!(from = %page, to = path, "Leaving page after delete");
            self.ctx.navigator.push(path);
        }

        Ok(DeleteReport {
            target,
            outcome,
            redirected_to,
        })
    }
}

// =============================================================================
// Create / Edit
// =============================================================================

/// Create and edit operations for every resource kind.
#[derive(Clone)]
pub struct Mutations {
    ctx: ClientContext,
}

impl Mutations {
    pub fn new(ctx: ClientContext) -> Self {
        Mutations { ctx }
    }

    pub async fn create_listing(&self, draft: &ListingDraft) -> MutationOutcome {
        let check = validate_listing(draft).map_err(ClientError::from);
        self.submit(ResourceKind::Listing, check, |api, token| async move {
            api.create(&token, ResourceKind::Listing, draft).await
        })
        .await
    }

    pub async fn update_listing(&self, listing_id: i64, draft: &ListingDraft) -> MutationOutcome {
        let check = validate_listing(draft).map_err(ClientError::from);
        self.submit(ResourceKind::Listing, check, |api, token| async move {
            api.update(&token, ResourceKind::Listing, listing_id, draft).await
        })
        .await
    }

    pub async fn create_availability(&self, draft: &AvailabilityDraft) -> MutationOutcome {
        let check = validate_availability(draft).map_err(ClientError::from);
        self.submit(ResourceKind::Availability, check, |api, token| async move {
            api.create(&token, ResourceKind::Availability, draft).await
        })
        .await
    }

    pub async fn update_availability(
        &self,
        availability_id: i64,
        draft: &AvailabilityDraft,
    ) -> MutationOutcome {
        let check = validate_availability(draft).map_err(ClientError::from);
        self.submit(ResourceKind::Availability, check, |api, token| async move {
            api.update(&token, ResourceKind::Availability, availability_id, draft)
                .await
        })
        .await
    }

    /// Books a slot. The monthly cap is checked against the cached bookings.
    pub async fn create_booking(&self, draft: &BookingDraft) -> MutationOutcome {
        let existing = self.cached_bookings().await;
        let owned = self.owned_booking(draft).await;
        let check = validate_booking(draft)
            .map_err(ClientError::from)
            .and_then(|_| validate_monthly_hours(&existing, draft, None).map_err(ClientError::from))
            .and_then(|_| owned.as_ref().map(|_| ()).map_err(|_| ClientError::UnknownUser));
        let body = owned.unwrap_or_else(|_| draft.clone());

        self.submit(ResourceKind::Booking, check, |api, token| async move {
            api.create(&token, ResourceKind::Booking, &body).await
        })
        .await
    }

    /// Moves `current` to the slot in `draft`.
    pub async fn update_booking(&self, current: &Booking, draft: &BookingDraft) -> MutationOutcome {
        let existing = self.cached_bookings().await;
        let booking_id = current.booking_id;
        let owned = self.owned_booking(draft).await;
        let check = validate_booking_change(current, Utc::now())
            .map_err(ClientError::from)
            .and_then(|_| validate_booking(draft).map_err(ClientError::from))
            .and_then(|_| {
                validate_monthly_hours(&existing, draft, Some(booking_id)).map_err(ClientError::from)
            })
            .and_then(|_| owned.as_ref().map(|_| ()).map_err(|_| ClientError::UnknownUser));
        let body = owned.unwrap_or_else(|_| draft.clone());

        self.submit(ResourceKind::Booking, check, |api, token| async move {
            api.update(&token, ResourceKind::Booking, booking_id, &body).await
        })
        .await
    }

    pub async fn create_review(&self, draft: &ReviewDraft) -> MutationOutcome {
        let check = validate_review(draft).map_err(ClientError::from);
        self.submit(ResourceKind::Review, check, |api, token| async move {
            api.create(&token, ResourceKind::Review, draft).await
        })
        .await
    }

    /// `draft` on behalf of the signed-in user.
    async fn owned_booking(&self, draft: &BookingDraft) -> ClientResult<BookingDraft> {
        let user_id = self
            .ctx
            .store
            .user()
            .get()
            .await
            .and_then(|user| user.user_id)
            .ok_or(ClientError::UnknownUser)?;
        Ok(BookingDraft {
            user_id: Some(user_id),
            ..draft.clone()
        })
    }

    async fn cached_bookings(&self) -> Vec<Booking> {
        let cached = self.ctx.store.bookings().get().await;
        cached.items.iter().cloned().collect()
    }

    /// validate → one request → toast on failure → flip.
    async fn submit<F, Fut>(
        &self,
        kind: ResourceKind,
        check: ClientResult<()>,
        send: F,
    ) -> MutationOutcome
    where
        F: FnOnce(ApiClient, String) -> Fut,
        Fut: Future<Output = ClientResult<()>>,
    {
        let token = match check {
            Ok(()) => self.ctx.store.token().await,
            Err(err) => Err(err),
        };
        let token = match token {
            Ok(token) => token,
            Err(err) => {
                let message = err.user_message();
                info!(kind = %kind, reason = %err, "Mutation rejected locally");
                self.ctx.notify_error(message.clone());
                return MutationOutcome::Rejected { message };
            }
        };

        let outcome = match send(self.ctx.api.clone(), token).await {
            Ok(()) => {
                info!(kind = %kind, "Mutation applied");
                MutationOutcome::Succeeded
            }
            Err(err) => {
                let message = err.user_message();
                warn!(kind = %kind, error = %err, class = ?err.class(), "Mutation failed");
                self.ctx.notify_error(message.clone());
                MutationOutcome::Failed { message }
            }
        };

        self.ctx.store.flip_update_signal();
        outcome
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
