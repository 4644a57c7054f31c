//! Application state shared across handlers.

use std::sync::Arc;

use souk_api::{ApiClient, ApiError};
use souk_core::FetchGenerations;
use sqlx::PgPool;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: Option<PgPool>,
    api: ApiClient,
    lists: FetchGenerations,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `pool` is `None` when sessions live in memory (tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is unusable.
    pub fn new(config: AdminConfig, pool: Option<PgPool>) -> Result<Self, ApiError> {
        let api = ApiClient::new(config.api_url.as_str(), config.api_timeout)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                api,
                lists: FetchGenerations::default(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get a reference to the Souk API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Generations of in-flight list fetches, per session.
    #[must_use]
    pub fn lists(&self) -> &FetchGenerations {
        &self.inner.lists
    }

    /// Currency label for formatted amounts.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.inner.config.currency
    }
}
