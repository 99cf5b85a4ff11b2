//! # Client Context
//!
//! Everything a view or workflow needs, bundled for injection: the shared
//! store, the API client, the toast sink and the navigator. Cloning a
//! context clones `Arc`s; every clone sees the same store.
//!
//! ## Wiring
//! ```text
//! ClientConfig ──► ClientContext::builder(config)
//!                     .notifier(Arc<dyn Notifier>)     default: ToastQueue
//!                     .navigator(Arc<dyn Navigator>)   default: HistoryNavigator
//!                     .transport(Arc<dyn HttpTransport>) default: ReqwestTransport
//!                     .build()?
//! ```

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::navigation::{HistoryNavigator, Navigator};
use crate::notify::{Notifier, Toast, ToastQueue};
use crate::store::Store;
use crate::transport::{HttpTransport, ReqwestTransport};

/// Shared handles injected into views and workflows.
#[derive(Clone)]
pub struct ClientContext {
    pub store: Arc<Store>,
    pub api: ApiClient,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl ClientContext {
    pub fn builder(config: ClientConfig) -> ClientContextBuilder {
        ClientContextBuilder {
            config,
            transport: None,
            notifier: None,
            navigator: None,
        }
    }

    /// Assembles a context from already-built parts.
    pub fn from_parts(
        store: Arc<Store>,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        ClientContext {
            store,
            api: ApiClient::new(transport),
            notifier,
            navigator,
        }
    }

    /// Shows `message` as an error toast.
    pub fn notify_error(&self, message: impl Into<String>) {
        self.notifier.notify(Toast::error(message));
    }
}

/// Builder for [`ClientContext`].
pub struct ClientContextBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ClientContextBuilder {
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Validates the configuration and wires the context.
    pub fn build(self) -> ClientResult<ClientContext> {
        self.config.validate()?;
        let store = Arc::new(Store::new(self.config.base_url()));

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(store.base_url(), self.config.timeout())?),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(ToastQueue::new(&self.config.notifications)),
        };
        let navigator: Arc<dyn Navigator> = match self.navigator {
            Some(navigator) => navigator,
            None => Arc::new(HistoryNavigator::new()),
        };

        info!(base_url = %store.base_url(), "Client context ready");
        Ok(ClientContext::from_parts(
            store,
            transport,
            notifier,
            navigator,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_uses_configured_base_url() {
        let mut config = ClientConfig::default();
        config.backend.port = 5005;

        let ctx = ClientContext::builder(config).build().unwrap();
        assert_eq!(ctx.store.base_url(), "http://localhost:5005");
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = ClientConfig::default();
        config.http.timeout_secs = 0;
        assert!(ClientContext::builder(config).build().is_err());
    }

    #[test]
    fn test_clones_share_one_store() {
        let ctx = ClientContext::builder(ClientConfig::default()).build().unwrap();
        let other = ctx.clone();
        ctx.store.flip_update_signal();
        assert_eq!(other.store.update_generation(), 1);
    }

    #[test]
    fn test_transport_and_store_share_base_url() {
        let mut config = ClientConfig::default();
        config.backend.url = Some("http://api.local:8080/".into());

        let ctx = ClientContext::builder(config.clone()).build().unwrap();
        let transport = ReqwestTransport::new(ctx.store.base_url(), config.timeout()).unwrap();

        assert_eq!(ctx.store.base_url(), "http://api.local:8080");
        assert_eq!(transport.base_url(), ctx.store.base_url());
    }
}
