//! # Resource Enrichment
//!
//! Per-card secondary data. A listing card shows how many of its slots are
//! still bookable; that number comes from its own request, separate from
//! the cached listing collection.
//!
//! A failed enrichment shows a toast and leaves the card with an empty
//! availability list. It never fails the view.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use bookit_core::{
    Availability, CoreResult, Listing, PageMarker, PendingDeletion, ResourceId, ResourceKind,
};

use crate::binder::ViewScope;
use crate::context::ClientContext;

// =============================================================================
// Availability Enricher
// =============================================================================

/// Loads the availability slots shown on a listing card.
#[derive(Clone)]
pub struct AvailabilityEnricher {
    ctx: ClientContext,
}

impl AvailabilityEnricher {
    pub fn new(ctx: ClientContext) -> Self {
        AvailabilityEnricher { ctx }
    }

    /// Slots for `listing_id`, or empty on failure.
    ///
    /// Skipped entirely on the listing edit page, which previews a card
    /// for a listing that may not exist yet.
    pub async fn availabilities_for(
        &self,
        scope: &ViewScope,
        listing_id: i64,
        page: &PageMarker,
    ) -> Vec<Availability> {
        if page.is(PageMarker::LISTING_EDIT) {
            return Vec::new();
        }

        let result = match self.ctx.store.token().await {
            Ok(token) => self.ctx.api.availabilities(&token, listing_id).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(slots) => slots,
            Err(err) => {
                if scope.is_live() {
                    warn!(listing_id, error = %err, "Availability fetch failed, showing none");
                    self.ctx.notify_error(err.user_message());
                } else {
                    debug!(listing_id, "Card gone before availability fetch failed");
                }
                Vec::new()
            }
        }
    }

    /// Builds one card per listing, fetching each card's slots concurrently.
    /// Order follows `listings`.
    pub async fn cards(&self, scope: &ViewScope, listings: &[Listing]) -> Vec<ResourceCard> {
        let page = self.ctx.store.page().get().await;
        let viewer = self
            .ctx
            .store
            .user()
            .get()
            .await
            .and_then(|u| u.username);

        let mut set = JoinSet::new();
        for (index, listing) in listings.iter().cloned().enumerate() {
            let enricher = self.clone();
            let scope = scope.clone();
            let page = page.clone();
            set.spawn(async move {
                let slots = enricher
                    .availabilities_for(&scope, listing.listing_id, &page)
                    .await;
                (index, listing, slots)
            });
        }

        let mut built: Vec<(usize, ResourceCard)> = Vec::with_capacity(listings.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, listing, slots)) => {
                    let card = ResourceCard::new(listing, slots, viewer.as_deref(), &page);
                    built.push((index, card));
                }
                Err(err) => warn!(error = %err, "Card enrichment task failed"),
            }
        }

        built.sort_by_key(|(index, _)| *index);
        built.into_iter().map(|(_, card)| card).collect()
    }
}

// =============================================================================
// Resource Card
// =============================================================================

/// Read-only presentation model of one listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceCard {
    pub listing: Arc<Listing>,
    pub availabilities: Vec<Availability>,
    /// Edit and delete buttons are shown.
    pub owner_actions: bool,
}

impl ResourceCard {
    pub fn new(
        listing: Listing,
        availabilities: Vec<Availability>,
        viewer: Option<&str>,
        page: &PageMarker,
    ) -> Self {
        let owner_actions = Self::shows_owner_actions(&listing, viewer, page);
        ResourceCard {
            listing: Arc::new(listing),
            availabilities,
            owner_actions,
        }
    }

    /// Owners get edit/delete, except on search results and the edit preview.
    pub fn shows_owner_actions(listing: &Listing, viewer: Option<&str>, page: &PageMarker) -> bool {
        let owns = viewer.map(|v| v == listing.username).unwrap_or(false);
        owns && !page.is(PageMarker::SEARCH) && !page.is(PageMarker::LISTING_EDIT)
    }

    /// Number of slots still open for booking.
    pub fn available_count(&self) -> usize {
        self.availabilities.iter().filter(|a| a.is_available).count()
    }

    /// Target for this card's delete button.
    pub fn delete_target(&self) -> CoreResult<PendingDeletion> {
        PendingDeletion::new(
            ResourceId::Numeric(self.listing.listing_id),
            ResourceKind::Listing,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserInfo;
    use crate::testing::Harness;
    use serde_json::json;

    fn listing(id: i64, owner: &str) -> Listing {
        Listing {
            listing_id: id,
            listing_name: format!("Listing {}", id),
            address: String::new(),
            category: String::new(),
            description: String::new(),
            user_id: None,
            username: owner.to_string(),
            listing_image: None,
            avg_rating: None,
        }
    }

    #[tokio::test]
    async fn test_failure_defaults_to_empty() {
        let h = Harness::signed_in().await;
        h.transport
            .respond("GET /availabilities", 500, json!({ "message": "db down" }));
        let enricher = AvailabilityEnricher::new(h.ctx.clone());

        let slots = enricher
            .availabilities_for(&ViewScope::new(), 4, &PageMarker::new("/mylistings"))
            .await;

        assert!(slots.is_empty());
        assert_eq!(h.notifier.messages(), vec!["db down"]);
    }

    #[tokio::test]
    async fn test_edit_page_skips_fetch() {
        let h = Harness::signed_in().await;
        let enricher = AvailabilityEnricher::new(h.ctx.clone());

        let slots = enricher
            .availabilities_for(&ViewScope::new(), 4, &PageMarker::new("/listings/edit"))
            .await;

        assert!(slots.is_empty());
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cards_keep_order_and_count_open_slots() {
        let h = Harness::signed_in().await;
        h.ctx.store.page().set(PageMarker::new("/mylistings")).await;
        h.ctx
            .store
            .user()
            .set(Some(UserInfo {
                username: Some("sam".into()),
                ..Default::default()
            }))
            .await;
        h.transport.respond(
            "GET /availabilities",
            200,
            json!({ "availabilities": [
                { "availability_id": 1, "listing_id": 1, "start_time": 0, "end_time": 60, "is_available": true },
                { "availability_id": 2, "listing_id": 1, "start_time": 60, "end_time": 120, "is_available": false }
            ]}),
        );
        let enricher = AvailabilityEnricher::new(h.ctx.clone());

        let cards = enricher
            .cards(&ViewScope::new(), &[listing(1, "sam"), listing(2, "alex")])
            .await;

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].listing.listing_id, 1);
        assert_eq!(cards[1].listing.listing_id, 2);
        assert_eq!(cards[0].available_count(), 1);
        assert!(cards[0].owner_actions);
        assert!(!cards[1].owner_actions);
    }

    #[test]
    fn test_owner_actions_hidden_on_search_and_edit() {
        let mine = listing(1, "sam");
        assert!(ResourceCard::shows_owner_actions(&mine, Some("sam"), &PageMarker::listing_detail(1)));
        assert!(!ResourceCard::shows_owner_actions(&mine, Some("sam"), &PageMarker::new("/search")));
        assert!(!ResourceCard::shows_owner_actions(&mine, Some("sam"), &PageMarker::new("/listings/edit")));
        assert!(!ResourceCard::shows_owner_actions(&mine, None, &PageMarker::new("/mylistings")));
    }
}
