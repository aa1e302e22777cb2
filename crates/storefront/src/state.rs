//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::platform::PlatformApp;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the platform handle.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    platform: PlatformApp,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, platform: PlatformApp) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, platform }),
        }
    }

    // Kept for data-backed routes to come; the home view is static.

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the platform handle.
    #[must_use]
    pub fn platform(&self) -> &PlatformApp {
        &self.inner.platform
    }
}
