//! # View Binder
//!
//! Keeps a mounted view in step with the store. A view never edits a
//! cached collection itself; it asks for a fresh fetch whenever the update
//! signal moves.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Mounted View                                   │
//! │                                                                         │
//! │  mount(view)                                                            │
//! │     ├── store.page.set(view.page())                                     │
//! │     ├── subscribe(update signal)                                        │
//! │     ├── spawn sync #0                                                   │
//! │     └── spawn listener ─┐                                               │
//! │                         │ loop                                          │
//! │                         ├── signal changed ──► spawn sync #n            │
//! │                         └── scope cancelled ──► exit                    │
//! │                                                                         │
//! │  unmount() / drop                                                       │
//! │     └── scope.cancel()   in-flight syncs finish but write nothing       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Syncs are independent tasks. Two overlapping syncs both run to
//! completion and the later-resolving one decides the cached value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use bookit_core::PageMarker;

use crate::context::ClientContext;
use crate::fetch::SyncOutcome;

// =============================================================================
// View Scope
// =============================================================================

/// Cancellation token for one mounted view.
///
/// Every async result is checked against the scope before it is applied.
#[derive(Clone, Default)]
pub struct ViewScope {
    inner: Arc<ScopeInner>,
}

#[derive(Default)]
struct ScopeInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until [`cancel`](Self::cancel) is called.
    pub fn is_live(&self) -> bool {
        !self.inner.cancelled.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Resolves once the scope is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if !self.is_live() {
                return;
            }
            notified.await;
        }
    }
}

// =============================================================================
// Bound View Trait
// =============================================================================

/// A top-level view whose data comes from one store slot.
#[async_trait]
pub trait BoundView: Send + Sync + 'static {
    /// Route written into the page marker on mount.
    fn page(&self) -> PageMarker;

    /// One re-synchronization pass.
    async fn sync(&self, ctx: &ClientContext, scope: &ViewScope) -> SyncOutcome;
}

// =============================================================================
// View Binder
// =============================================================================

type SyncTasks = Arc<Mutex<Vec<JoinHandle<SyncOutcome>>>>;

/// Mounts views against a client context.
#[derive(Clone)]
pub struct ViewBinder {
    ctx: ClientContext,
}

impl ViewBinder {
    pub fn new(ctx: ClientContext) -> Self {
        ViewBinder { ctx }
    }

    /// Mounts `view`: marks the page, syncs once, then re-syncs on every
    /// update signal change until unmounted.
    pub async fn mount<V: BoundView>(&self, view: Arc<V>) -> MountedView<V> {
        let page = view.page();
        self.ctx.store.page().set(page.clone()).await;
        info!(page = %page, "View mounted");

        let scope = ViewScope::new();
        let tasks: SyncTasks = Arc::default();
        let mut signal = self.ctx.store.subscribe();

        spawn_sync(&self.ctx, &view, &scope, &tasks);

        let listener = {
            let ctx = self.ctx.clone();
            let view = view.clone();
            let scope = scope.clone();
            let tasks = tasks.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = scope.cancelled() => break,
                        changed = signal.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            let generation = *signal.borrow_and_update();
                            debug!(page = %view.page(), generation, "Update signal changed, re-syncing");
                            spawn_sync(&ctx, &view, &scope, &tasks);
                        }
                    }
                }
                debug!(page = %view.page(), "View listener stopped");
            })
        };

        MountedView {
            view,
            scope,
            tasks,
            listener,
        }
    }
}

fn spawn_sync<V: BoundView>(ctx: &ClientContext, view: &Arc<V>, scope: &ViewScope, tasks: &SyncTasks) {
    let ctx = ctx.clone();
    let view = view.clone();
    let scope = scope.clone();
    let handle = tokio::spawn(async move { view.sync(&ctx, &scope).await });

    let mut tasks = tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    tasks.retain(|pending| !pending.is_finished());
    tasks.push(handle);
}

// =============================================================================
// Mounted View
// =============================================================================

/// A view that is currently mounted. Dropping it unmounts.
pub struct MountedView<V: BoundView> {
    view: Arc<V>,
    scope: ViewScope,
    tasks: SyncTasks,
    listener: JoinHandle<()>,
}

impl<V: BoundView> MountedView<V> {
    pub fn view(&self) -> &Arc<V> {
        &self.view
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn is_mounted(&self) -> bool {
        self.scope.is_live()
    }

    /// Waits for every sync still running, including any spawned while
    /// waiting, and returns their outcomes in spawn order.
    ///
    /// Syncs that finished before a later one was spawned are not tracked.
    pub async fn settle(&self) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let pending: Vec<_> = {
                let mut tasks = self
                    .tasks
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                tasks.drain(..).collect()
            };
            if pending.is_empty() {
                return outcomes;
            }
            for handle in pending {
                match handle.await {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(err) => warn!(error = %err, "Sync task failed"),
                }
            }
        }
    }

    /// Cancels the scope. Results that land afterwards are dropped.
    pub fn unmount(self) {
        drop(self);
    }
}

impl<V: BoundView> Drop for MountedView<V> {
    fn drop(&mut self) {
        if self.scope.is_live() {
            info!(page = %self.view.page(), "View unmounted");
        }
        self.scope.cancel();
        self.listener.abort();
    }
}
