//! # Shared Store
//!
//! The single source of truth for client state. One `Store` is built per
//! client session and shared by `Arc` with every view; nothing keeps a
//! private copy of the session, page marker or any collection.
//!
//! ## Slots
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Store                                      │
//! │                                                                         │
//! │  base_url (fixed)        "http://localhost:5000"                        │
//! │                                                                         │
//! │  Slot<Option<Session>>   token + decoded expiry       get() / set()    │
//! │  Slot<Option<UserInfo>>  who is signed in             get() / set()    │
//! │  Slot<PageMarker>        current route ("/login")     get() / set()    │
//! │  Slot<Collection<..>>    listings, bookings,          get() / set()    │
//! │                          search, listing detail                         │
//! │                                                                         │
//! │  UpdateSignal            watch<u64> generation        flip()/subscribe │
//! │                          (coarse: any mutation of any kind)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writers always replace a slot's whole value. A write is visible to every
//! reader as soon as `set` returns.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use bookit_core::{BookingPartition, Listing, PageMarker, ResourceCollection};

use crate::binder::ViewScope;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Session
// =============================================================================

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<i64>,
}

impl Session {
    /// Wraps a token returned by the login endpoint.
    ///
    /// JWTs have their `exp` claim read without verifying the signature;
    /// the server remains the authority. Tokens that are not JWTs never
    /// expire on the client.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let expires_at = Self::read_expiry(&token);
        Session { token, expires_at }
    }

    fn read_expiry(token: &str) -> Option<DateTime<Utc>> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<ExpiryClaim>(
            token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .ok()?;

        data.claims
            .exp
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

/// Signed-in account, as far as the login response tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// Slot
// =============================================================================

/// One piece of shared state with a get/set pair.
#[derive(Debug, Default)]
pub struct Slot<T> {
    value: RwLock<T>,
}

impl<T: Clone> Slot<T> {
    pub fn new(value: T) -> Self {
        Slot {
            value: RwLock::new(value),
        }
    }

    /// Snapshot of the current value.
    pub async fn get(&self) -> T {
        self.value.read().await.clone()
    }

    /// Replaces the whole value.
    pub async fn set(&self, value: T) {
        *self.value.write().await = value;
    }

    /// Replaces the value only if `scope` still has a live consumer.
    ///
    /// The liveness check happens under the write lock, so an unmount
    /// that completes first always wins.
    pub async fn set_while_live(&self, scope: &ViewScope, value: T) -> bool {
        let mut guard = self.value.write().await;
        if !scope.is_live() {
            return false;
        }
        *guard = value;
        true
    }

    /// Edits the value in place, only if `scope` still has a live consumer.
    pub async fn modify_while_live(&self, scope: &ViewScope, edit: impl FnOnce(&mut T)) -> bool {
        let mut guard = self.value.write().await;
        if !scope.is_live() {
            return false;
        }
        edit(&mut *guard);
        true
    }
}

/// Listings cached as a flat ordered sequence.
pub type ListingCollection = ResourceCollection<Vec<Listing>>;

/// Bookings cached pre-split into upcoming and past.
pub type BookingCollection = ResourceCollection<BookingPartition>;

/// A single listing loaded by a detail view.
pub type ListingDetail = ResourceCollection<Option<Listing>>;

// =============================================================================
// Store
// =============================================================================

/// Process-wide client state, shared by reference.
pub struct Store {
    base_url: String,
    session: Slot<Option<Session>>,
    user: Slot<Option<UserInfo>>,
    page: Slot<PageMarker>,
    my_listings: Slot<ListingCollection>,
    bookings: Slot<BookingCollection>,
    search_results: Slot<ListingCollection>,
    listing_detail: Slot<ListingDetail>,
    update_signal: watch::Sender<u64>,
}

impl Store {
    /// Creates an empty store. `base_url` is fixed for the store's life.
    pub fn new(base_url: impl Into<String>) -> Self {
        let (update_signal, _) = watch::channel(0);
        Store {
            base_url: base_url.into(),
            session: Slot::new(None),
            user: Slot::new(None),
            page: Slot::new(PageMarker::default()),
            my_listings: Slot::default(),
            bookings: Slot::default(),
            search_results: Slot::default(),
            listing_detail: Slot::default(),
            update_signal,
        }
    }

    /// Backend root. The default transport is built from this value.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Slots
    // =========================================================================

    pub fn session(&self) -> &Slot<Option<Session>> {
        &self.session
    }

    pub fn user(&self) -> &Slot<Option<UserInfo>> {
        &self.user
    }

    pub fn page(&self) -> &Slot<PageMarker> {
        &self.page
    }

    /// Listings owned by the signed-in user.
    pub fn my_listings(&self) -> &Slot<ListingCollection> {
        &self.my_listings
    }

    pub fn bookings(&self) -> &Slot<BookingCollection> {
        &self.bookings
    }

    pub fn search_results(&self) -> &Slot<ListingCollection> {
        &self.search_results
    }

    pub fn listing_detail(&self) -> &Slot<ListingDetail> {
        &self.listing_detail
    }

    // =========================================================================
    // Session Access
    // =========================================================================

    /// Token for an authenticated request.
    ///
    /// An expired session is cleared here, so every caller sees the same
    /// answer from then on.
    pub async fn token(&self) -> ClientResult<String> {
        let session = self.session.get().await.ok_or(ClientError::NotAuthenticated)?;

        if session.is_expired(Utc::now()) {
            info!("Session expired, clearing");
            self.session.set(None).await;
            self.user.set(None).await;
            return Err(ClientError::SessionExpired);
        }

        Ok(session.token().to_string())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_ok()
    }

    /// Drops every cached collection back to `Idle`.
    pub async fn reset_cache(&self) {
        self.my_listings.set(ResourceCollection::idle()).await;
        self.bookings.set(ResourceCollection::idle()).await;
        self.search_results.set(ResourceCollection::idle()).await;
        self.listing_detail.set(ResourceCollection::idle()).await;
    }

    // =========================================================================
    // Update Signal
    // =========================================================================

    /// Current generation of the update signal.
    pub fn update_generation(&self) -> u64 {
        *self.update_signal.borrow()
    }

    /// Marks every cached collection as stale.
    pub fn flip_update_signal(&self) {
        self.update_signal.send_modify(|generation| {
            *generation = generation.wrapping_add(1);
        });
        debug!(generation = self.update_generation(), "Update signal flipped");
    }

    /// Receiver that fires on every flip after this call.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.update_signal.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookit_core::CollectionStatus;
    use jsonwebtoken::{EncodingKey, Header};

    #[derive(Serialize)]
    struct Claims {
        exp: i64,
        identity: i64,
    }

    fn jwt(exp: DateTime<Utc>) -> String {
        let claims = Claims {
            exp: exp.timestamp(),
            identity: 1,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_session_reads_jwt_expiry() {
        let exp = Utc::now() + chrono::Duration::minutes(60);
        let session = Session::from_token(jwt(exp));
        assert_eq!(session.expires_at().map(|t| t.timestamp()), Some(exp.timestamp()));
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn test_opaque_token_never_expires() {
        let session = Session::from_token("opaque-token");
        assert_eq!(session.expires_at(), None);
        assert!(!session.is_expired(Utc::now() + chrono::Duration::days(365)));
    }

    #[tokio::test]
    async fn test_token_requires_session() {
        let store = Store::new("http://localhost:5000");
        assert!(matches!(
            store.token().await,
            Err(ClientError::NotAuthenticated)
        ));

        store.session().set(Some(Session::from_token("t"))).await;
        assert_eq!(store.token().await.unwrap(), "t");
    }

    #[tokio::test]
    async fn test_expired_session_is_cleared() {
        let store = Store::new("http://localhost:5000");
        let expired = jwt(Utc::now() - chrono::Duration::minutes(1));
        store.session().set(Some(Session::from_token(expired))).await;

        assert!(matches!(store.token().await, Err(ClientError::SessionExpired)));
        assert!(store.session().get().await.is_none());
        assert!(matches!(
            store.token().await,
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_defaults() {
        let store = Store::new("http://localhost:5000");
        assert_eq!(store.base_url(), "http://localhost:5000");
        assert_eq!(store.page().get().await.path(), "/login");
        assert_eq!(store.my_listings().get().await.status, CollectionStatus::Idle);
        assert_eq!(store.update_generation(), 0);
    }

    #[tokio::test]
    async fn test_flip_wakes_subscribers() {
        let store = Store::new("http://localhost:5000");
        let mut rx = store.subscribe();

        store.flip_update_signal();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[tokio::test]
    async fn test_set_while_live_respects_scope() {
        let slot = Slot::new(1);
        let scope = ViewScope::new();

        assert!(slot.set_while_live(&scope, 2).await);
        scope.cancel();
        assert!(!slot.set_while_live(&scope, 3).await);
        assert_eq!(slot.get().await, 2);
    }
}
