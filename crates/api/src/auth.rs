//! Authentication endpoints.

use reqwest::Method;
use souk_core::Email;
use tracing::instrument;

use crate::client::{ApiClient, ApiToken};
use crate::envelope::Ack;
use crate::error::ApiError;
use crate::types::{AuthSession, Credentials, Registration, User};

/// Login, registration and session resolution.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] or [`ApiError::Validation`] for bad
    /// credentials, and the usual transport errors.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<AuthSession, ApiError> {
        let body = Credentials {
            email: email.as_str(),
            password,
        };
        let request = self
            .client
            .request(Method::POST, "auth/login", None, None)?
            .json(&body);
        ApiClient::send(request).await
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] with per-field messages when the
    /// backend rejects the form.
    #[instrument(skip(self, registration), fields(role = ?registration.role))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession, ApiError> {
        let request = self
            .client
            .request(Method::POST, "auth/register", None, None)?
            .json(registration);
        ApiClient::send(request).await
    }

    /// Resolve the account behind `token` (`GET /auth/me`).
    ///
    /// # Errors
    ///
    /// Any failure, including transport errors, means the session cannot be
    /// trusted.
    #[instrument(skip_all)]
    pub async fn me(&self, token: &ApiToken) -> Result<User, ApiError> {
        let request = self
            .client
            .request(Method::GET, "auth/me", None, Some(token))?;
        ApiClient::send(request).await
    }

    /// Revoke `token` on the backend.
    ///
    /// # Errors
    ///
    /// Returns the backend error; callers clear the local session regardless.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &ApiToken) -> Result<Ack, ApiError> {
        let request = self
            .client
            .request(Method::POST, "auth/logout", None, Some(token))?;
        ApiClient::send_ack(request).await
    }
}
