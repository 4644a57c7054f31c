//! Application state shared across handlers.

use std::sync::Arc;

use souk_api::{ApiClient, ApiError};
use souk_core::FetchGenerations;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::Catalog;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the API client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: Option<PgPool>,
    api: ApiClient,
    catalog: Catalog,
    lists: FetchGenerations,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `pool` backs the session store and the readiness probe; it is `None`
    /// when sessions live in memory (tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is unusable.
    pub fn new(config: StorefrontConfig, pool: Option<PgPool>) -> Result<Self, ApiError> {
        let api = ApiClient::new(config.api.base_url.as_str(), config.api.timeout)?;
        let catalog = Catalog::new(api.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                api,
                catalog,
                lists: FetchGenerations::default(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool, if any.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get a reference to the Souk API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cached public catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
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
