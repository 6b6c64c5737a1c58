//! Shared state and configuration for issue API handlers.

use std::sync::Arc;
use std::time::Duration;

use tickets_lib::TicketStore;

/// Server-side limits applied by the router.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// Optional request timeout for handlers.
    pub request_timeout: Option<Duration>,
    /// Optional concurrency limit for handlers.
    pub concurrency_limit: Option<usize>,
}

/// Shared state for issue API handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ticket collection handlers read and write.
    pub store: Arc<dyn TicketStore>,
    /// Server-side configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Creates state with the given store and no limits.
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self {
            store,
            config: ApiConfig::default(),
        }
    }

    /// Creates state with explicit configuration.
    #[must_use]
    pub fn with_config(store: Arc<dyn TicketStore>, config: ApiConfig) -> Self {
        Self { store, config }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &"<TicketStore>")
            .field("config", &self.config)
            .finish()
    }
}
