//! # Resource Fetch Functions
//!
//! Stateless calls to the booking API. Each one issues exactly one request
//! and normalizes the body into the shape the store caches.
//!
//! ## Endpoints
//! ```text
//! ┌───────────────────────────────────────┬──────────────────────────────┐
//! │ Request                               │ Result field                 │
//! ├───────────────────────────────────────┼──────────────────────────────┤
//! │ POST   /auth                          │ token | access_token |       │
//! │                                       │ accessToken                  │
//! │ POST   /users                         │ (the user)                   │
//! │ GET    /listings/mylistings           │ mylistings | listings        │
//! │ GET    /listings?search_query=<kw>    │ listings                     │
//! │ GET    /listings/<id>                 │ (the listing)                │
//! │ GET    /bookings                      │ bookings | mybookings        │
//! │                                       │ {upcoming, past} or flat     │
//! │ GET    /availabilities?listing_id=<id>│ availabilities               │
//! │ POST / PUT / DELETE  /<kind>[/<id>]   │ (ignored)                    │
//! └───────────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Functions return `Err` on every failure and never touch the store or
//! the notifier; [`crate::fetch`] and [`crate::mutation`] decide what the
//! user sees.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use bookit_core::{
    Availability, Booking, BookingPartition, ErrorBody, Listing, PendingDeletion, ResourceKind,
    User,
};

use crate::error::{ClientError, ClientResult};
use crate::store::UserInfo;
use crate::transport::{HttpRequest, HttpTransport, Method};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub token: String,
    pub user: Option<UserInfo>,
}

/// Typed access to the booking API.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        ApiClient { transport }
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /auth` with `{email, password}`.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginGrant> {
        let request = HttpRequest::new(Method::Post, "/auth")
            .with_body(json!({ "email": email, "password": password }));
        let body = self.execute(request).await?;

        let token = ["token", "access_token", "accessToken"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .ok_or_else(|| ClientError::InvalidResponse("login response has no token".into()))?
            .to_string();

        let user = serde_json::from_value::<UserInfo>(body.clone())
            .ok()
            .filter(|u| u.username.is_some() || u.user_id.is_some());

        Ok(LoginGrant { token, user })
    }

    /// `POST /users` with `{username, email, password}`.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> ClientResult<User> {
        let request = HttpRequest::new(Method::Post, "/users").with_body(json!({
            "username": username,
            "email": email,
            "password": password,
        }));
        let body = self.execute(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Listings owned by the signed-in user.
    pub async fn my_listings(&self, token: &str) -> ClientResult<Vec<Listing>> {
        let request = HttpRequest::get("/listings/mylistings").with_token(token);
        let body = self.execute(request).await?;
        extract_field(body, &["mylistings", "listings"])
    }

    /// Keyword search over everyone's listings.
    pub async fn search_listings(&self, token: &str, query: &str) -> ClientResult<Vec<Listing>> {
        let request = HttpRequest::get("/listings")
            .with_token(token)
            .with_query("search_query", query);
        let body = self.execute(request).await?;
        extract_field(body, &["listings"])
    }

    pub async fn listing(&self, token: &str, listing_id: i64) -> ClientResult<Listing> {
        let request = HttpRequest::get(format!("/listings/{}", listing_id)).with_token(token);
        let body = self.execute(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    // =========================================================================
    // Bookings & Availabilities
    // =========================================================================

    /// The signed-in user's bookings, split against `now`.
    ///
    /// Accepts the pre-split `{upcoming, past}` shape or a flat list.
    pub async fn bookings(&self, token: &str, now: DateTime<Utc>) -> ClientResult<BookingPartition> {
        let request = HttpRequest::get("/bookings").with_token(token);
        let body = self.execute(request).await?;
        let field = take_field(body, &["bookings", "mybookings"])?;

        match field {
            Value::Array(_) => {
                let flat: Vec<Booking> = serde_json::from_value(field)?;
                Ok(BookingPartition::partition(flat, now))
            }
            Value::Object(_) => Ok(serde_json::from_value(field)?),
            other => Err(ClientError::InvalidResponse(format!(
                "unexpected bookings shape: {}",
                other
            ))),
        }
    }

    pub async fn availabilities(
        &self,
        token: &str,
        listing_id: i64,
    ) -> ClientResult<Vec<Availability>> {
        let request = HttpRequest::get("/availabilities")
            .with_token(token)
            .with_query("listing_id", listing_id);
        let body = self.execute(request).await?;
        extract_field(body, &["availabilities"])
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// `DELETE /<kind>/<id>`.
    pub async fn delete(&self, token: &str, target: &PendingDeletion) -> ClientResult<()> {
        let request = HttpRequest::new(Method::Delete, target.delete_path()).with_token(token);
        self.execute(request).await.map(|_| ())
    }

    /// `POST /<kind>` with `body`.
    pub async fn create<B: Serialize>(
        &self,
        token: &str,
        kind: ResourceKind,
        body: &B,
    ) -> ClientResult<()> {
        let path = format!("/{}", kind.collection_path());
        self.send_json(Method::Post, path, token, body).await
    }

    /// `PUT /<kind>/<id>` with `body`.
    pub async fn update<B: Serialize>(
        &self,
        token: &str,
        kind: ResourceKind,
        id: i64,
        body: &B,
    ) -> ClientResult<()> {
        let path = format!("/{}/{}", kind.collection_path(), id);
        self.send_json(Method::Put, path, token, body).await
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        path: String,
        token: &str,
        body: &B,
    ) -> ClientResult<()> {
        let body =
            serde_json::to_value(body).map_err(|e| ClientError::SerializationFailed(e.to_string()))?;
        let request = HttpRequest::new(method, path)
            .with_token(token)
            .with_body(body);
        self.execute(request).await.map(|_| ())
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Sends a request and turns non-2xx answers into `ClientError::Server`.
    async fn execute(&self, request: HttpRequest) -> ClientResult<Value> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let body = ErrorBody::from_json_bytes(&response.body);
            warn!(%method, path = %path, status = response.status, "Request failed");
            return Err(ClientError::Server {
                status: response.status,
                body,
            });
        }

        debug!(%method, path = %path, status = response.status, "Request succeeded");
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}

/// Removes the first present key of `keys` from an object body.
fn take_field(body: Value, keys: &[&str]) -> ClientResult<Value> {
    let Value::Object(mut map) = body else {
        return Err(ClientError::InvalidResponse("expected a JSON object".into()));
    };
    keys.iter()
        .find_map(|key| map.remove(*key))
        .ok_or_else(|| ClientError::InvalidResponse(format!("missing field '{}'", keys[0])))
}

fn extract_field<T: DeserializeOwned>(body: Value, keys: &[&str]) -> ClientResult<T> {
    let field = take_field(body, keys)?;
    Ok(serde_json::from_value(field)?)
}
