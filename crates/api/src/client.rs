//! Shared HTTP client for the Souk REST API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use souk_core::{ListQuery, Paginated};
use url::Url;

use crate::envelope::{self, Ack};
use crate::error::ApiError;
use crate::{AdminApi, AuthApi, PartnerApi, ShopApi, VendorApi};

/// Bearer token issued by `POST /auth/login`.
///
/// Stored in the server-side session; `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// Raw token, for the `Authorization` header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken([REDACTED])")
    }
}

/// Client for the Souk backend.
///
/// Cheap to clone; all clones share one connection pool. Role-scoped facades
/// borrow it through [`ApiClient::auth`], [`ApiClient::shop`],
/// [`ApiClient::vendor`], [`ApiClient::partner`] and [`ApiClient::admin`].
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `https://api.souk.market/api`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or the HTTP client fails
    /// to build.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("souk-web/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { http, base_url }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Login, registration and session resolution.
    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Public catalog, plus the shopper's own orders when `token` is set.
    #[must_use]
    pub const fn shop<'a>(&'a self, token: Option<&'a ApiToken>) -> ShopApi<'a> {
        ShopApi::new(self, token)
    }

    /// Vendor dashboard endpoints.
    #[must_use]
    pub const fn vendor<'a>(&'a self, token: &'a ApiToken) -> VendorApi<'a> {
        VendorApi::new(self, token)
    }

    /// Partner portal endpoints.
    #[must_use]
    pub const fn partner<'a>(&'a self, token: &'a ApiToken) -> PartnerApi<'a> {
        PartnerApi::new(self, token)
    }

    /// Back-office endpoints.
    #[must_use]
    pub const fn admin<'a>(&'a self, token: &'a ApiToken) -> AdminApi<'a> {
        AdminApi::new(self, token)
    }

    fn url(&self, path: &str, query: Option<&ListQuery>) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if let Some(query) = query {
            url.query_pairs_mut().extend_pairs(query.to_pairs());
        }
        Ok(url)
    }

    /// Start a request with JSON accept headers and, when given, the bearer token.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&ListQuery>,
        token: Option<&ApiToken>,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.url(path, query)?;
        let builder = self.inner.http.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    async fn execute(builder: reqwest::RequestBuilder) -> Result<(u16, Vec<u8>), ApiError> {
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }

    /// Send and decode `data`.
    pub(crate) async fn send<T: DeserializeOwned>(
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let (status, body) = Self::execute(builder).await?;
        envelope::decode_data(status, &body)
    }

    /// Send and decode a paginated `data` + `meta` response.
    pub(crate) async fn send_page<T: DeserializeOwned>(
        builder: reqwest::RequestBuilder,
    ) -> Result<Paginated<T>, ApiError> {
        let (status, body) = Self::execute(builder).await?;
        envelope::decode_page(status, &body)
    }

    /// Send a mutation whose response body is ignored except for `message`.
    pub(crate) async fn send_ack(builder: reqwest::RequestBuilder) -> Result<Ack, ApiError> {
        let (status, body) = Self::execute(builder).await?;
        envelope::decode_ack(status, &body)
    }
}
