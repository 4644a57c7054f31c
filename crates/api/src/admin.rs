//! Back-office endpoints: vendor approval and payment oversight.
//!
//! Reason-bearing actions take a [`Reason`], which can only be built from
//! non-blank input, so an empty justification never reaches the network.

use reqwest::Method;
use serde::Serialize;
use souk_core::{ListQuery, Paginated, PaymentId, Reason, VendorId};
use tracing::instrument;

use crate::client::{ApiClient, ApiToken};
use crate::envelope::Ack;
use crate::error::ApiError;
use crate::types::{Payment, PaymentCode, PaymentStats, Vendor, VendorStats};

#[derive(Serialize)]
struct ReasonBody<'a> {
    reason: &'a Reason,
}

/// Administrator operations.
#[derive(Debug, Clone, Copy)]
pub struct AdminApi<'a> {
    client: &'a ApiClient,
    token: &'a ApiToken,
}

impl<'a> AdminApi<'a> {
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

    async fn vendor_action(&self, id: VendorId, action: &str) -> Result<Ack, ApiError> {
        ApiClient::send_ack(self.request(Method::POST, &format!("admin/vendors/{id}/{action}"), None)?)
            .await
    }

    async fn vendor_action_with_reason(
        &self,
        id: VendorId,
        action: &str,
        reason: &Reason,
    ) -> Result<Ack, ApiError> {
        let request = self
            .request(Method::POST, &format!("admin/vendors/{id}/{action}"), None)?
            .json(&ReasonBody { reason });
        ApiClient::send_ack(request).await
    }

    // =========================================================================
    // Vendors
    // =========================================================================

    /// One page of vendors (`status`, `search` filters).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn vendors(&self, query: &ListQuery) -> Result<Paginated<Vendor>, ApiError> {
        ApiClient::send_page(self.request(Method::GET, "admin/vendors", Some(query))?).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn vendor_stats(&self) -> Result<VendorStats, ApiError> {
        ApiClient::send(self.request(Method::GET, "admin/vendors/stats", None)?).await
    }

    /// # Errors
    ///
    /// Returns the backend error when the vendor is not pending.
    #[instrument(skip(self))]
    pub async fn approve_vendor(&self, id: VendorId) -> Result<Ack, ApiError> {
        self.vendor_action(id, "approve").await
    }

    /// # Errors
    ///
    /// Returns the backend error when the vendor is not pending.
    #[instrument(skip(self, reason))]
    pub async fn reject_vendor(&self, id: VendorId, reason: &Reason) -> Result<Ack, ApiError> {
        self.vendor_action_with_reason(id, "reject", reason).await
    }

    /// # Errors
    ///
    /// Returns the backend error when the vendor is not approved.
    #[instrument(skip(self, reason))]
    pub async fn suspend_vendor(&self, id: VendorId, reason: &Reason) -> Result<Ack, ApiError> {
        self.vendor_action_with_reason(id, "suspend", reason).await
    }

    /// # Errors
    ///
    /// Returns the backend error when the vendor is not suspended.
    #[instrument(skip(self))]
    pub async fn reactivate_vendor(&self, id: VendorId) -> Result<Ack, ApiError> {
        self.vendor_action(id, "reactivate").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_vendor(&self, id: VendorId) -> Result<Ack, ApiError> {
        ApiClient::send_ack(self.request(Method::DELETE, &format!("admin/vendors/{id}"), None)?)
            .await
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// One page of payments (`status`, `search` filters).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn payments(&self, query: &ListQuery) -> Result<Paginated<Payment>, ApiError> {
        ApiClient::send_page(self.request(Method::GET, "admin/payments", Some(query))?).await
    }

    /// Aggregates over all payments, independent of any page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn payment_stats(&self) -> Result<PaymentStats, ApiError> {
        ApiClient::send(self.request(Method::GET, "admin/payments/stats", None)?).await
    }

    /// # Errors
    ///
    /// Returns the backend error when the payment is not pending.
    #[instrument(skip(self))]
    pub async fn approve_payment(&self, id: PaymentId) -> Result<Ack, ApiError> {
        ApiClient::send_ack(self.request(
            Method::POST,
            &format!("admin/payments/{id}/approve"),
            None,
        )?)
        .await
    }

    /// # Errors
    ///
    /// Returns the backend error when the payment is not pending.
    #[instrument(skip(self, reason))]
    pub async fn reject_payment(&self, id: PaymentId, reason: &Reason) -> Result<Ack, ApiError> {
        let request = self
            .request(Method::POST, &format!("admin/payments/{id}/reject"), None)?
            .json(&ReasonBody { reason });
        ApiClient::send_ack(request).await
    }

    // =========================================================================
    // Payment codes
    // =========================================================================

    /// All issued payment codes (`status` filter), read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = query.page))]
    pub async fn payment_codes(&self, query: &ListQuery) -> Result<Paginated<PaymentCode>, ApiError> {
        ApiClient::send_page(self.request(Method::GET, "admin/payment-codes", Some(query))?).await
    }
}
