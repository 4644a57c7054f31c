//! Public catalog and shopper endpoints.

use reqwest::Method;
use souk_core::{ListQuery, Paginated, ProductId};
use tracing::instrument;

use crate::client::{ApiClient, ApiToken};
use crate::error::ApiError;
use crate::types::{Category, NewOrder, Order, Product};

/// Catalog browsing, checkout and order history.
///
/// Catalog reads work without a token; checkout and history need one.
#[derive(Debug, Clone, Copy)]
pub struct ShopApi<'a> {
    client: &'a ApiClient,
    token: Option<&'a ApiToken>,
}

impl<'a> ShopApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient, token: Option<&'a ApiToken>) -> Self {
        Self { client, token }
    }

    fn require_token(&self) -> Result<&'a ApiToken, ApiError> {
        self.token
            .ok_or_else(|| ApiError::Unauthorized("Veuillez vous connecter.".to_string()))
    }

    /// One page of products (`search`, `category_id` filters).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the envelope cannot be decoded.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn products(&self, query: &ListQuery) -> Result<Paginated<Product>, ApiError> {
        let request = self
            .client
            .request(Method::GET, "products", Some(query), self.token)?;
        ApiClient::send_page(request).await
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown products.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let request = self
            .client
            .request(Method::GET, &format!("products/{id}"), None, self.token)?;
        ApiClient::send(request).await
    }

    /// All public categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let request = self
            .client
            .request(Method::GET, "categories", None, self.token)?;
        ApiClient::send(request).await
    }

    /// Place an order for the signed-in client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a token, or the backend's
    /// validation error (stock, address).
    #[instrument(skip(self, order), fields(lines = order.items.len()))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let token = self.require_token()?;
        let request = self
            .client
            .request(Method::POST, "orders", None, Some(token))?
            .json(order);
        ApiClient::send(request).await
    }

    /// The signed-in client's orders.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a token.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn my_orders(&self, query: &ListQuery) -> Result<Paginated<Order>, ApiError> {
        let token = self.require_token()?;
        let request = self
            .client
            .request(Method::GET, "client/orders", Some(query), Some(token))?;
        ApiClient::send_page(request).await
    }
}
