//! # HTTP Transport
//!
//! The single seam between the data layer and the network.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         One API Request                                 │
//! │                                                                         │
//! │  ApiClient ──► HttpRequest { method, path, query, token, body }        │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  HttpTransport::send                                                    │
//! │     ├── ReqwestTransport   (production: base URL + path, JWT header)   │
//! │     └── ScriptedTransport  (tests: canned responses, per-call delay)   │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  HttpResponse { status, body bytes }   ← non-2xx is NOT an Err here    │
//! │  Err(ClientError)                      ← only when no response arrived │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every authenticated request carries `Authorization: JWT <token>`.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use bookit_core::AUTH_SCHEME;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Request / Response
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path starting with `/`, e.g. `/bookings/5b1c-aa`.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Session token, sent as `Authorization: JWT <token>`.
    pub token: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        HttpRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            token: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Header value for the session token, if any.
    pub fn authorization(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|token| format!("{} {}", AUTH_SCHEME, token))
    }
}

/// Whatever the server answered, success or not.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Sends one request and returns the raw response.
///
/// Implementations return `Err` only for failures where no response
/// arrived (connection refused, timeout).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse>;
}

// =============================================================================
// Reqwest Transport
// =============================================================================

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport for `base_url` with a whole-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        url::Url::parse(base_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(ReqwestTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &HttpRequest) -> ClientResult<url::Url> {
        let mut url = url::Url::parse(&format!("{}{}", self.base_url, request.path))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let url = self.url_for(&request)?;
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        builder = builder.header(ACCEPT, "application/json");

        if let Some(auth) = request.authorization() {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!(status, bytes = body.len(), "Received response");
        Ok(HttpResponse { status, body })
    }
}
