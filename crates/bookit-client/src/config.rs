//! # Client Configuration
//!
//! Configuration for the backend connection, the HTTP client and the toast
//! queue.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BOOKIT_BACKEND_URL=https://api.bookit.example                      │
//! │     BOOKIT_BACKEND_PORT=5005                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bookit/bookit.toml (Linux)                               │
//! │     ~/Library/Application Support/com.bookit.bookit/bookit.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:5000, 30 s timeout, 3 toasts, 3000 ms             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # bookit.toml
//! [backend]
//! host = "localhost"
//! port = 5000
//! # url = "https://api.bookit.example"   # wins over host/port when set
//!
//! [http]
//! timeout_secs = 30
//!
//! [notifications]
//! max_visible = 3
//! auto_dismiss_ms = 3000
//! position = "top_right"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use bookit_core::DEFAULT_BACKEND_PORT;

use crate::error::{ClientError, ClientResult};
use crate::notify::ToastPosition;

// =============================================================================
// Backend Settings
// =============================================================================

/// Where the booking API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Full base URL. When set, `host` and `port` are ignored.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_BACKEND_PORT
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            url: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

// =============================================================================
// HTTP Settings
// =============================================================================

/// Settings handed to the HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Notification Settings
// =============================================================================

/// Toast queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Most toasts shown at once. The oldest is evicted beyond this.
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,

    /// Lifetime of a toast (milliseconds).
    #[serde(default = "default_auto_dismiss")]
    pub auto_dismiss_ms: u64,

    #[serde(default)]
    pub position: ToastPosition,
}

fn default_max_visible() -> usize {
    3
}

fn default_auto_dismiss() -> u64 {
    3000
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            max_visible: default_max_visible(),
            auto_dismiss_ms: default_auto_dismiss(),
            position: ToastPosition::default(),
        }
    }
}

impl NotificationSettings {
    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_millis(self.auto_dismiss_ms)
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (bookit.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        if let Some(ref url) = self.backend.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClientError::InvalidUrl(format!(
                    "Backend URL must start with http:// or https://, got: {}",
                    url
                )));
            }
            url::Url::parse(url)?;
        } else {
            if self.backend.host.trim().is_empty() {
                return Err(ClientError::InvalidConfig("backend host is empty".into()));
            }
            if self.backend.port == 0 {
                return Err(ClientError::InvalidConfig(
                    "backend port must be greater than 0".into(),
                ));
            }
        }

        if self.http.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.notifications.max_visible == 0 {
            return Err(ClientError::InvalidConfig(
                "max_visible must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("BOOKIT_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.url = Some(url);
        }

        if let Ok(host) = std::env::var("BOOKIT_BACKEND_HOST") {
            self.backend.host = host;
        }

        if let Ok(port) = std::env::var("BOOKIT_BACKEND_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding backend port from environment");
                    self.backend.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring invalid BOOKIT_BACKEND_PORT"),
            }
        }

        if let Ok(secs) = std::env::var("BOOKIT_HTTP_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                self.http.timeout_secs = s;
            }
        }

        if let Ok(limit) = std::env::var("BOOKIT_TOAST_LIMIT") {
            if let Ok(n) = limit.parse::<usize>() {
                self.notifications.max_visible = n;
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bookit", "bookit")
            .map(|dirs| dirs.config_dir().join("bookit.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Base URL of the API, without a trailing slash.
    pub fn base_url(&self) -> String {
        match self.backend.url {
            Some(ref url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.backend.host, self.backend.port),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}
