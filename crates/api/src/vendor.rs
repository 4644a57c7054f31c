//! Vendor dashboard endpoints.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use souk_core::pagination::MAX_PER_PAGE;
use souk_core::{CategoryId, ListQuery, OrderId, OrderStatus, Paginated, ProductId};
use tracing::instrument;

use crate::client::{ApiClient, ApiToken};
use crate::envelope::Ack;
use crate::error::ApiError;
use crate::types::{
    Category, CategoryInput, ImageUpload, Order, Product, ProductInput, StatusUpdate, Vendor,
    VendorDashboardStats,
};

/// Profile, catalog and order management for the signed-in vendor.
#[derive(Debug, Clone, Copy)]
pub struct VendorApi<'a> {
    client: &'a ApiClient,
    token: &'a ApiToken,
}

impl<'a> VendorApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient, token: &'a ApiToken) -> Self {
        Self { client, token }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&ListQuery>,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        self.client.request(method, path, query, Some(self.token))
    }

    /// The vendor's own account, including its approval status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Vendor, ApiError> {
        ApiClient::send(self.request(Method::GET, "vendor/profile", None)?).await
    }

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<VendorDashboardStats, ApiError> {
        ApiClient::send(self.request(Method::GET, "vendor/stats", None)?).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn products(&self, query: &ListQuery) -> Result<Paginated<Product>, ApiError> {
        ApiClient::send_page(self.request(Method::GET, "vendor/products", Some(query))?).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the product is not the vendor's.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        ApiClient::send(self.request(Method::GET, &format!("vendor/products/{id}"), None)?).await
    }

    /// Create a product with its images in one multipart request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for rejected fields.
    #[instrument(skip(self, input, images), fields(name = %input.name, images = images.len()))]
    pub async fn create_product(
        &self,
        input: &ProductInput,
        images: Vec<ImageUpload>,
    ) -> Result<Product, ApiError> {
        let mut form = Form::new()
            .text("name", input.name.clone())
            .text("price", input.price.amount().to_string())
            .text("stock", input.stock.to_string());
        if let Some(description) = &input.description {
            form = form.text("description", description.clone());
        }
        if let Some(category_id) = input.category_id {
            form = form.text("category_id", category_id.to_string());
        }
        for image in images {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)?;
            form = form.part("images[]", part);
        }

        let request = self
            .request(Method::POST, "vendor/products", None)?
            .multipart(form);
        ApiClient::send(request).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for rejected fields.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let request = self
            .request(Method::PUT, &format!("vendor/products/{id}"), None)?
            .json(input);
        ApiClient::send(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend refuses (e.g. product has orders).
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<Ack, ApiError> {
        ApiClient::send_ack(self.request(Method::DELETE, &format!("vendor/products/{id}"), None)?)
            .await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn categories(&self, query: &ListQuery) -> Result<Paginated<Category>, ApiError> {
        ApiClient::send_page(self.request(Method::GET, "vendor/categories", Some(query))?).await
    }

    /// Every category, for the product form's select.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn all_categories(&self) -> Result<Vec<Category>, ApiError> {
        let query = ListQuery {
            per_page: MAX_PER_PAGE,
            ..ListQuery::default()
        };
        Ok(self.categories(&query).await?.items)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the category is not the vendor's.
    #[instrument(skip(self))]
    pub async fn category(&self, id: CategoryId) -> Result<Category, ApiError> {
        ApiClient::send(self.request(Method::GET, &format!("vendor/categories/{id}"), None)?).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for rejected fields.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let request = self
            .request(Method::POST, "vendor/categories", None)?
            .json(input);
        ApiClient::send(request).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for rejected fields.
    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let request = self
            .request(Method::PUT, &format!("vendor/categories/{id}"), None)?
            .json(input);
        ApiClient::send(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend refuses (e.g. category still has products).
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<Ack, ApiError> {
        ApiClient::send_ack(self.request(
            Method::DELETE,
            &format!("vendor/categories/{id}"),
            None,
        )?)
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn orders(&self, query: &ListQuery) -> Result<Paginated<Order>, ApiError> {
        ApiClient::send_page(self.request(Method::GET, "vendor/orders", Some(query))?).await
    }

    /// Move an order along the preparation leg.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the transition is refused.
    #[instrument(skip(self), fields(status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Order, ApiError> {
        let request = self
            .request(Method::PATCH, &format!("vendor/orders/{id}/status"), None)?
            .json(&StatusUpdate { status });
        ApiClient::send(request).await
    }
}
