//! # Bound Views
//!
//! The top-level screens of the client, each tied to one store slot.
//!
//! | View                | Page             | Slot              | Endpoint                   |
//! |---------------------|------------------|-------------------|----------------------------|
//! | `MyListingsView`    | `/mylistings`    | `my_listings`     | `GET /listings/mylistings` |
//! | `MyBookingsView`    | `/mybookings`    | `bookings`        | `GET /bookings`            |
//! | `ListingDetailView` | `/listings/<id>` | `listing_detail`  | `GET /listings/<id>`       |
//! | `SearchView`        | `/search`        | `search_results`  | `GET /listings?search_query=` |

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use bookit_core::{Booking, BookingTab, PageMarker};

use crate::binder::{BoundView, ViewScope};
use crate::context::ClientContext;
use crate::fetch::{sync_collection, SyncOutcome};

// =============================================================================
// My Listings
// =============================================================================

/// The signed-in user's own listings.
#[derive(Debug, Default)]
pub struct MyListingsView;

#[async_trait]
impl BoundView for MyListingsView {
    fn page(&self) -> PageMarker {
        PageMarker::new(PageMarker::MY_LISTINGS)
    }

    async fn sync(&self, ctx: &ClientContext, scope: &ViewScope) -> SyncOutcome {
        sync_collection(ctx, scope, ctx.store.my_listings(), |api, token| async move {
            api.my_listings(&token).await
        })
        .await
    }
}

// =============================================================================
// My Bookings
// =============================================================================

/// The signed-in user's bookings with an upcoming/past selector.
///
/// The selector is view-local. Switching it re-reads the cached partition
/// and never writes to the store.
#[derive(Debug, Default)]
pub struct MyBookingsView {
    tab: Mutex<BookingTab>,
}

impl MyBookingsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> BookingTab {
        *self.tab.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn select(&self, tab: BookingTab) {
        *self.tab.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = tab;
    }

    /// Flips between upcoming and past; returns the new tab.
    pub fn toggle(&self) -> BookingTab {
        let mut tab = self.tab.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *tab = tab.toggle();
        *tab
    }

    /// Bookings rendered for the current tab.
    pub async fn visible(&self, ctx: &ClientContext) -> Vec<Booking> {
        let cached = ctx.store.bookings().get().await;
        cached.items.for_tab(self.tab()).to_vec()
    }
}

#[async_trait]
impl BoundView for MyBookingsView {
    fn page(&self) -> PageMarker {
        PageMarker::new(PageMarker::MY_BOOKINGS)
    }

    async fn sync(&self, ctx: &ClientContext, scope: &ViewScope) -> SyncOutcome {
        sync_collection(ctx, scope, ctx.store.bookings(), |api, token| async move {
            api.bookings(&token, Utc::now()).await
        })
        .await
    }
}

// =============================================================================
// Listing Detail
// =============================================================================

#[derive(Debug)]
pub struct ListingDetailView {
    listing_id: i64,
}

impl ListingDetailView {
    pub fn new(listing_id: i64) -> Self {
        ListingDetailView { listing_id }
    }

    pub fn listing_id(&self) -> i64 {
        self.listing_id
    }
}

#[async_trait]
impl BoundView for ListingDetailView {
    fn page(&self) -> PageMarker {
        PageMarker::listing_detail(self.listing_id)
    }

    async fn sync(&self, ctx: &ClientContext, scope: &ViewScope) -> SyncOutcome {
        let listing_id = self.listing_id;
        sync_collection(ctx, scope, ctx.store.listing_detail(), move |api, token| async move {
            api.listing(&token, listing_id).await.map(Some)
        })
        .await
    }
}

// =============================================================================
// Search
// =============================================================================

/// Keyword search across everyone's listings.
#[derive(Debug)]
pub struct SearchView {
    query: String,
}

impl SearchView {
    pub fn new(query: impl Into<String>) -> Self {
        SearchView {
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[async_trait]
impl BoundView for SearchView {
    fn page(&self) -> PageMarker {
        PageMarker::new(PageMarker::SEARCH)
    }

    async fn sync(&self, ctx: &ClientContext, scope: &ViewScope) -> SyncOutcome {
        let query = self.query.clone();
        sync_collection(ctx, scope, ctx.store.search_results(), move |api, token| async move {
            api.search_listings(&token, &query).await
        })
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::ViewBinder;
    use crate::testing::Harness;
    use bookit_core::CollectionStatus;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_bookings_view_partition_and_tab_toggle() {
        let h = Harness::signed_in().await;
        h.transport.respond(
            "GET /bookings",
            200,
            json!({ "bookings": { "upcoming": [], "past": [{ "booking_id": 7 }] } }),
        );
        let binder = ViewBinder::new(h.ctx.clone());

        let mounted = binder.mount(Arc::new(MyBookingsView::new())).await;
        mounted.settle().await;

        let cached = h.ctx.store.bookings().get().await;
        assert_eq!(cached.status, CollectionStatus::Success);
        assert_eq!(cached.items.upcoming.len(), 0);
        assert_eq!(cached.items.past.len(), 1);

        let view = mounted.view();
        assert!(view.visible(&h.ctx).await.is_empty());
        assert_eq!(view.toggle(), BookingTab::Past);
        assert_eq!(view.visible(&h.ctx).await[0].booking_id, 7);

        // Toggling only changed what is rendered.
        assert_eq!(h.ctx.store.bookings().get().await, cached);
        assert_eq!(h.transport.count("GET /bookings"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_response_to_resolve_wins() {
        let h = Harness::signed_in().await;
        // First request is slow, second is fast: the first resolves last.
        h.transport.respond_after(
            "GET /listings/mylistings",
            Duration::from_millis(50),
            200,
            json!({ "mylistings": [{ "listing_id": 1, "listing_name": "slow" }] }),
        );
        h.transport.respond_after(
            "GET /listings/mylistings",
            Duration::from_millis(5),
            200,
            json!({ "mylistings": [{ "listing_id": 2, "listing_name": "fast" }] }),
        );
        let binder = ViewBinder::new(h.ctx.clone());

        let mounted = binder.mount(Arc::new(MyListingsView)).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.ctx.store.flip_update_signal();
        mounted.settle().await;

        assert_eq!(h.transport.count("GET /listings/mylistings"), 2);
        let cached = h.ctx.store.my_listings().get().await;
        assert_eq!(cached.items[0].listing_name, "slow");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_guards_late_result() {
        let h = Harness::signed_in().await;
        h.transport.respond_after(
            "GET /listings",
            Duration::from_millis(20),
            200,
            json!({ "listings": [{ "listing_id": 3, "listing_name": "Gym" }] }),
        );
        let binder = ViewBinder::new(h.ctx.clone());

        let mounted = binder.mount(Arc::new(SearchView::new("gym"))).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let scope = mounted.scope().clone();
        mounted.unmount();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!scope.is_live());
        let cached = h.ctx.store.search_results().get().await;
        assert!(cached.items.is_empty());
        assert_ne!(cached.status, CollectionStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_view_marks_page_and_loads_listing() {
        let h = Harness::signed_in().await;
        h.transport.respond(
            "GET /listings/9",
            200,
            json!({ "listing_id": 9, "listing_name": "Studio", "username": "sam" }),
        );
        let binder = ViewBinder::new(h.ctx.clone());

        let mounted = binder.mount(Arc::new(ListingDetailView::new(9))).await;
        mounted.settle().await;

        assert_eq!(h.ctx.store.page().get().await.path(), "/listings/9");
        let detail = h.ctx.store.listing_detail().get().await;
        assert_eq!(detail.items.map(|l| l.listing_name).as_deref(), Some("Studio"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_sends_query() {
        let h = Harness::signed_in().await;
        h.transport.respond("GET /listings", 200, json!({ "listings": [] }));
        let binder = ViewBinder::new(h.ctx.clone());

        let mounted = binder.mount(Arc::new(SearchView::new("tennis"))).await;
        mounted.settle().await;

        let sent = h.transport.requests();
        assert_eq!(
            sent[0].query,
            vec![("search_query".to_string(), "tennis".to_string())]
        );
        assert_eq!(h.ctx.store.page().get().await.path(), "/search");
    }
}
