//! Souk API - typed client for the Souk marketplace REST backend.
//!
//! All business rules (authentication, approval workflow, commissions,
//! payment-code issuance) live in the backend. This crate only issues
//! authenticated requests and decodes the responses:
//!
//! - [`ApiClient`] - shared connection pool, base URL, timeout
//! - [`AuthApi`], [`ShopApi`], [`VendorApi`], [`PartnerApi`], [`AdminApi`] -
//!   role-scoped facades borrowing the client and a token
//! - [`ApiError`] - one error path for every facade
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), souk_api::ApiError> {
//! use std::time::Duration;
//!
//! use souk_api::{ApiClient, ApiToken};
//! use souk_core::ListQuery;
//!
//! let client = ApiClient::new("https://api.souk.market/api", Duration::from_secs(30))?;
//! let token = ApiToken::new("1|secret".to_string());
//!
//! let page = client.admin(&token).vendors(&ListQuery::default()).await?;
//! println!("{} vendors", page.meta.total);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod admin;
mod auth;
mod client;
mod envelope;
mod error;
mod partner;
mod shop;
pub mod types;
mod vendor;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use client::{ApiClient, ApiToken};
pub use envelope::Ack;
pub use error::ApiError;
pub use partner::PartnerApi;
pub use shop::ShopApi;
pub use vendor::VendorApi;
