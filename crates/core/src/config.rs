use std::{fmt, time::Duration};

use crate::error::{FiglyticsError, Result};

pub const DEFAULT_BASE_URL: &str = "https://figlytics.com/api/";
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10_000);
pub const CUSTOMER_ID_STORAGE_KEY: &str = "figlytics-customerid";

const ENV_BASE_URL: &str = "FIGLYTICS_BASE_URL";
const ENV_PROJECT_KEY: &str = "FIGLYTICS_PROJECT_KEY";
const ENV_DEBUG: &str = "FIGLYTICS_DEBUG";
const ENV_CUSTOMER_ID: &str = "FIGLYTICS_CUSTOMER_ID";

pub type InitCallback = Box<dyn FnOnce() + Send + 'static>;

/// Client settings recognised at construction time.
pub struct ClientConfig {
    /// Invoked once, after identity and metadata are resolved.
    pub on_initialize: Option<InitCallback>,
    /// Sent as `X-Project-Public-Key`; empty when unset.
    pub project_public_key: Option<String>,
    /// Logs every recorded and sent event through `tracing` at info level.
    pub is_debug: bool,
    /// Overrides the stored identity at startup when present and non-empty.
    pub customer_id: Option<String>,
    pub base_url: String,
    pub batch_size: usize,
    pub debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            on_initialize: None,
            project_public_key: None,
            is_debug: false,
            customer_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("on_initialize", &self.on_initialize.is_some())
            .field("project_public_key", &self.project_public_key)
            .field("is_debug", &self.is_debug)
            .field("customer_id", &self.customer_id)
            .field("base_url", &self.base_url)
            .field("batch_size", &self.batch_size)
            .field("debounce", &self.debounce)
            .finish()
    }
}

impl ClientConfig {
    /// Defaults overlaid with `FIGLYTICS_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Ok(key) = std::env::var(ENV_PROJECT_KEY) {
            config.project_public_key = Some(key);
        }
        if let Ok(flag) = std::env::var(ENV_DEBUG) {
            config.is_debug = matches!(flag.trim(), "1" | "true" | "yes");
        }
        if let Ok(id) = std::env::var(ENV_CUSTOMER_ID) {
            config.customer_id = Some(id);
        }
        config
    }

    pub fn with_project_public_key(mut self, key: impl Into<String>) -> Self {
        self.project_public_key = Some(key.into());
        self
    }

    pub fn with_debug(mut self, is_debug: bool) -> Self {
        self.is_debug = is_debug;
        self
    }

    pub fn with_customer_id(mut self, id: impl Into<String>) -> Self {
        self.customer_id = Some(id.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn on_initialize(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_initialize = Some(Box::new(callback));
        self
    }

    /// Full ingestion URL, `<base>events`.
    pub fn events_url(&self) -> String {
        if self.base_url.ends_with('/') {
            format!("{}events", self.base_url)
        } else {
            format!("{}/events", self.base_url)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(FiglyticsError::InvalidConfig {
                reason: "base_url is empty".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(FiglyticsError::InvalidConfig {
                reason: "batch_size must be > 0".to_string(),
            });
        }
        if self.debounce.is_zero() {
            return Err(FiglyticsError::InvalidConfig {
                reason: "debounce must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
