//! # Collection Sync
//!
//! Runs one fetch function and writes its result into a store slot.
//!
//! ## One Sync Pass
//! ```text
//!   scope live? ──no──► Discarded
//!        │yes
//!        ▼
//!   slot.status = Loading        (items kept)
//!        │
//!        ▼
//!   token from Store ──Err──┐
//!        │                  │
//!        ▼                  │
//!   fetch(api, token) ─Err──┤
//!        │Ok                ▼
//!        │            scope live? ──no──► Discarded (no toast, no write)
//!        │                  │yes
//!        │                  ▼
//!        │            toast(user_message)
//!        │            slot = { items: empty, status: Error }
//!        ▼
//!   slot = { items, status: Success }    (only while scope is live)
//! ```
//!
//! Nothing here de-duplicates: two overlapping syncs of the same slot both
//! write, and the one that resolves last wins.

use std::future::Future;

use bookit_core::{CollectionStatus, ResourceCollection};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::binder::ViewScope;
use crate::context::ClientContext;
use crate::error::ClientResult;
use crate::store::Slot;

/// What one sync pass did to its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The slot now holds this status.
    Applied(CollectionStatus),
    /// The view was gone before the result landed; nothing was written.
    Discarded,
}

/// Fetches into `slot` and reports failures through the context's notifier.
pub async fn sync_collection<C, F, Fut>(
    ctx: &ClientContext,
    scope: &ViewScope,
    slot: &Slot<ResourceCollection<C>>,
    fetch: F,
) -> SyncOutcome
where
    C: Clone + Default,
    F: FnOnce(ApiClient, String) -> Fut,
    Fut: Future<Output = ClientResult<C>>,
{
    let marked = slot
        .modify_while_live(scope, |c| c.status = CollectionStatus::Loading)
        .await;
    if !marked {
        return SyncOutcome::Discarded;
    }

    let result = match ctx.store.token().await {
        Ok(token) => fetch(ctx.api.clone(), token).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(items) => {
            if slot
                .set_while_live(scope, ResourceCollection::success(items))
                .await
            {
                SyncOutcome::Applied(CollectionStatus::Success)
            } else {
                debug!("View unmounted before fetch resolved, result dropped");
                SyncOutcome::Discarded
            }
        }
        Err(err) => {
            if !scope.is_live() {
                debug!(error = %err, "View unmounted before fetch failed, error dropped");
                return SyncOutcome::Discarded;
            }

            warn!(error = %err, class = ?err.class(), "Fetch failed");
            ctx.notify_error(err.user_message());

            if slot.set_while_live(scope, ResourceCollection::error()).await {
                SyncOutcome::Applied(CollectionStatus::Error)
            } else {
                SyncOutcome::Discarded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use serde_json::json;

    #[tokio::test]
    async fn test_success_writes_items() {
        let h = Harness::signed_in().await;
        h.transport.respond(
            "GET /listings/mylistings",
            200,
            json!({ "mylistings": [{ "listing_id": 1, "listing_name": "Court" }] }),
        );
        let scope = ViewScope::new();

        let outcome = sync_collection(&h.ctx, &scope, h.ctx.store.my_listings(), |api, token| async move {
            api.my_listings(&token).await
        })
        .await;

        assert_eq!(outcome, SyncOutcome::Applied(CollectionStatus::Success));
        let cached = h.ctx.store.my_listings().get().await;
        assert_eq!(cached.items[0].listing_name, "Court");
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_failure_notifies_and_empties() {
        let h = Harness::signed_in().await;
        h.ctx
            .store
            .my_listings()
            .set(ResourceCollection::success(vec![]))
            .await;
        h.transport
            .respond("GET /listings/mylistings", 400, json!({ "error": "bad token" }));
        let scope = ViewScope::new();

        let outcome = sync_collection(&h.ctx, &scope, h.ctx.store.my_listings(), |api, token| async move {
            api.my_listings(&token).await
        })
        .await;

        assert_eq!(outcome, SyncOutcome::Applied(CollectionStatus::Error));
        assert_eq!(h.notifier.messages(), vec!["bad token"]);
        let cached = h.ctx.store.my_listings().get().await;
        assert!(cached.items.is_empty());
        assert_eq!(cached.status, CollectionStatus::Error);
    }

    #[tokio::test]
    async fn test_transport_failure_uses_fallback_text() {
        let h = Harness::signed_in().await;
        h.transport.refuse("GET /listings/mylistings");
        let scope = ViewScope::new();

        sync_collection(&h.ctx, &scope, h.ctx.store.my_listings(), |api, token| async move {
            api.my_listings(&token).await
        })
        .await;

        assert_eq!(h.notifier.messages(), vec!["Invalid input"]);
    }

    #[tokio::test]
    async fn test_no_session_sends_nothing() {
        let h = Harness::new();
        let scope = ViewScope::new();

        let outcome = sync_collection(&h.ctx, &scope, h.ctx.store.my_listings(), |api, token| async move {
            api.my_listings(&token).await
        })
        .await;

        assert_eq!(outcome, SyncOutcome::Applied(CollectionStatus::Error));
        assert!(h.transport.requests().is_empty());
        assert_eq!(h.notifier.messages(), vec!["Not authenticated"]);
    }

    #[tokio::test]
    async fn test_repeated_sync_is_idempotent() {
        let h = Harness::signed_in().await;
        h.transport.respond(
            "GET /listings/mylistings",
            200,
            json!({ "mylistings": [
                { "listing_id": 1, "listing_name": "Court" },
                { "listing_id": 2, "listing_name": "Pool" }
            ]}),
        );
        let scope = ViewScope::new();
        let slot = h.ctx.store.my_listings();

        sync_collection(&h.ctx, &scope, slot, |api, token| async move { api.my_listings(&token).await }).await;
        let first = slot.get().await;
        sync_collection(&h.ctx, &scope, slot, |api, token| async move { api.my_listings(&token).await }).await;
        let second = slot.get().await;

        assert_eq!(first, second);
        assert_eq!(h.transport.count("GET /listings/mylistings"), 2);
    }

    #[tokio::test]
    async fn test_cancelled_scope_writes_nothing() {
        let h = Harness::signed_in().await;
        h.transport.respond("GET /listings/mylistings", 500, json!({}));
        let scope = ViewScope::new();
        scope.cancel();

        let outcome = sync_collection(&h.ctx, &scope, h.ctx.store.my_listings(), |api, token| async move {
            api.my_listings(&token).await
        })
        .await;

        assert_eq!(outcome, SyncOutcome::Discarded);
        assert_eq!(h.ctx.store.my_listings().get().await.status, CollectionStatus::Idle);
        assert!(h.notifier.messages().is_empty());
    }
}
