//! Partner portal endpoints.

use reqwest::Method;
use souk_core::{ListQuery, OrderId, Paginated};
use tracing::instrument;

use crate::client::{ApiClient, ApiToken};
use crate::error::ApiError;
use crate::types::{CodeValidation, Commission, CommissionSummary, Order, PaymentCode};

/// Pickup, payment codes and commissions for the signed-in partner.
#[derive(Debug, Clone, Copy)]
pub struct PartnerApi<'a> {
    client: &'a ApiClient,
    token: &'a ApiToken,
}

impl<'a> PartnerApi<'a> {
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

    /// Orders assigned to or available for the partner (`status` filter).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn orders(&self, query: &ListQuery) -> Result<Paginated<Order>, ApiError> {
        ApiClient::send_page(self.request(Method::GET, "partner/orders", Some(query))?).await
    }

    /// Mark an order as picked up.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the order is not ready.
    #[instrument(skip(self))]
    pub async fn pickup(&self, id: OrderId) -> Result<Order, ApiError> {
        ApiClient::send(self.request(Method::POST, &format!("partner/orders/{id}/pickup"), None)?)
            .await
    }

    /// Issue a payment code for an order.
    ///
    /// # Errors
    ///
    /// Returns the backend error when a code cannot be issued.
    #[instrument(skip(self))]
    pub async fn generate_payment_code(&self, id: OrderId) -> Result<PaymentCode, ApiError> {
        ApiClient::send(self.request(
            Method::POST,
            &format!("partner/orders/{id}/payment-code"),
            None,
        )?)
        .await
    }

    /// Codes issued by the partner (`status` filter).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn payment_codes(&self, query: &ListQuery) -> Result<Paginated<PaymentCode>, ApiError> {
        ApiClient::send_page(self.request(Method::GET, "partner/payment-codes", Some(query))?)
            .await
    }

    /// Check a code presented by a client.
    ///
    /// # Errors
    ///
    /// Returns the backend error (unknown, used or expired code).
    #[instrument(skip(self), fields(code = %code.code))]
    pub async fn validate_code(&self, code: &CodeValidation) -> Result<PaymentCode, ApiError> {
        let request = self
            .request(Method::POST, "partner/payment-codes/validate", None)?
            .json(code);
        ApiClient::send(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn commissions(&self, query: &ListQuery) -> Result<Paginated<Commission>, ApiError> {
        ApiClient::send_page(self.request(Method::GET, "partner/commissions", Some(query))?).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn commission_summary(&self) -> Result<CommissionSummary, ApiError> {
        ApiClient::send(self.request(Method::GET, "partner/commissions/summary", None)?).await
    }
}
