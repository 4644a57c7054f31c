//! Cached read access to the public catalog.
//!
//! Anonymous catalog reads are cached in-process for 60 seconds, keyed by the
//! full list query. Failed responses are never cached, and nothing that needs
//! a token goes through here.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use souk_api::types::{Category, Product};
use souk_api::{ApiClient, ApiError};
use souk_core::{ListQuery, Paginated, ProductId};
use tracing::{debug, instrument};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products(ListQuery),
    Product(ProductId),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Paginated<Product>),
    Product(Box<Product>),
    Categories(Vec<Category>),
}

/// Public catalog backed by the shop facade.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl Catalog {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogInner { api, cache }),
        }
    }

    /// One page of products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the API error on a cache miss that fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn products(&self, query: &ListQuery) -> Result<Paginated<Product>, ApiError> {
        let key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let page = self.inner.api.shop(None).products(query).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(page.clone()))
            .await;
        Ok(page)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown products.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.inner.api.shop(None).product(id).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Every category, for filter dropdowns.
    ///
    /// # Errors
    ///
    /// Returns the API error on a cache miss that fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self.inner.api.shop(None).categories().await?;
        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Drop every cached entry (after a vendor edits the catalog).
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
