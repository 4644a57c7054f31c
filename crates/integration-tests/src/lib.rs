//! End-to-end tests for Souk.
//!
//! Every test is `#[ignore]`d: they need both servers running against a
//! seeded Souk backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p souk-cli -- migrate all
//! cargo run -p souk-storefront &
//! cargo run -p souk-admin &
//! cargo test -p souk-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` / `ADMIN_BASE_URL` - server URLs (default localhost:3000 / 3001)
//! - `SOUK_TEST_{ADMIN,VENDOR,PARTNER,CLIENT}_EMAIL` and `..._PASSWORD` - seeded accounts

use reqwest::redirect::Policy;
use reqwest::{Client, Response};

/// Seeded account kinds.
#[derive(Debug, Clone, Copy)]
pub enum Account {
    Admin,
    Vendor,
    Partner,
    Client,
}

impl Account {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Admin => "SOUK_TEST_ADMIN",
            Self::Vendor => "SOUK_TEST_VENDOR",
            Self::Partner => "SOUK_TEST_PARTNER",
            Self::Client => "SOUK_TEST_CLIENT",
        }
    }

    /// Credentials from the environment.
    ///
    /// # Panics
    ///
    /// Panics when the variables are missing: the test cannot run.
    #[must_use]
    pub fn credentials(self) -> (String, String) {
        let var = |suffix: &str| {
            let key = format!("{}_{suffix}", self.prefix());
            std::env::var(&key).unwrap_or_else(|_| panic!("{key} is not set"))
        };
        (var("EMAIL"), var("PASSWORD"))
    }
}

/// Base URL of the storefront.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the admin console.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Client with a cookie jar that does not follow redirects, so tests can
/// assert on `Location`.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialised.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Sign `account` in at `base` and return the redirect target.
///
/// # Panics
///
/// Panics if the server cannot be reached.
pub async fn login(client: &Client, base: &str, account: Account) -> Option<String> {
    let (email, password) = account.credentials();
    let response = client
        .post(format!("{base}/auth/login"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to submit login");
    location(&response)
}
