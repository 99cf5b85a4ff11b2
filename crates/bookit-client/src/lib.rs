//! # bookit-client: Shared Store & Data Synchronization
//!
//! Client-side data layer for BookIt. Views read from a shared store,
//! mutations write through the booking API and then flip a single update
//! signal that makes every mounted view re-fetch.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Data Flow                                 │
//! │                                                                         │
//! │  ┌──────────────┐  mount   ┌──────────────┐  sync   ┌──────────────┐   │
//! │  │  BoundView   │ ───────► │  ViewBinder  │ ──────► │ sync_        │   │
//! │  │  (views.rs)  │          │  (binder.rs) │         │ collection   │   │
//! │  └──────────────┘          └──────┬───────┘         └──────┬───────┘   │
//! │                                   │ watch                   │ ApiClient │
//! │                                   │                         ▼           │
//! │  ┌──────────────┐  flip    ┌──────┴───────┐         ┌──────────────┐   │
//! │  │  Mutations   │ ───────► │    Store     │ ◄────── │ HttpTransport│   │
//! │  │ DeleteWorkfl.│          │  (store.rs)  │  apply  │  (reqwest)   │   │
//! │  └──────┬───────┘          └──────────────┘         └──────────────┘   │
//! │         │                                                               │
//! │         ├──► Notifier   (error toasts)                                  │
//! │         └──► Navigator  (post-delete redirect)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - One function per backend endpoint
//! - [`auth`] - Login, registration, logout
//! - [`binder`] - Mount/unmount and re-sync on the update signal
//! - [`config`] - Backend URL, timeouts, toast settings (TOML + env)
//! - [`context`] - Shared handles passed to every operation
//! - [`enrich`] - Per-card availability lookups
//! - [`error`] - Client error types
//! - [`fetch`] - Scope-guarded collection synchronization
//! - [`mutation`] - Delete dialog workflow, create and edit
//! - [`navigation`] - Route changes
//! - [`notify`] - Toast notifications
//! - [`store`] - Session, page marker and cached collections
//! - [`transport`] - HTTP seam
//! - [`views`] - The top-level screens
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bookit_client::{auth, ClientConfig, ClientContext, MyListingsView, ViewBinder};
//!
//! let ctx = ClientContext::builder(ClientConfig::load_or_default(None)).build()?;
//! auth::login(&ctx, "sam@example.com", "secret").await?;
//!
//! let mounted = ViewBinder::new(ctx.clone()).mount(Arc::new(MyListingsView)).await;
//! mounted.settle().await;
//! println!("{} listings", ctx.store.my_listings().get().await.items.len());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod auth;
pub mod binder;
pub mod config;
pub mod context;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod mutation;
pub mod navigation;
pub mod notify;
pub mod store;
pub mod transport;
pub mod views;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{ApiClient, LoginGrant};
pub use binder::{BoundView, MountedView, ViewBinder, ViewScope};
pub use config::{BackendSettings, ClientConfig, HttpSettings, NotificationSettings};
pub use context::{ClientContext, ClientContextBuilder};
pub use enrich::{AvailabilityEnricher, ResourceCard};
pub use error::{ClientError, ClientResult, ErrorClass};
pub use fetch::{sync_collection, SyncOutcome};
pub use mutation::{DeleteReport, DeleteWorkflow, MutationOutcome, Mutations};
pub use navigation::{HistoryNavigator, Navigator};
pub use notify::{NoOpNotifier, Notifier, Severity, Toast, ToastPosition, ToastQueue};
pub use store::{Session, Slot, Store, UserInfo};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
pub use views::{ListingDetailView, MyBookingsView, MyListingsView, SearchView};
