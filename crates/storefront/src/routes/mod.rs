//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Shop
//! GET  /                          - Catalog (search, category filter)
//! GET  /products                  - Catalog
//! GET  /products/{id}             - Product detail
//!
//! # Cart (HTMX fragments when HX-Request is set)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add to cart (triggers cart-updated)
//! POST /cart/update               - Update quantity
//! POST /cart/remove               - Remove line
//! GET  /cart/count                - Cart count badge
//!
//! # Client (ClientArea)
//! GET  /checkout                  - Delivery form
//! POST /checkout                  - Place order
//! GET  /account/orders            - Order history
//!
//! # Auth
//! GET  /auth/login                - Login page (?next, ?denied)
//! POST /auth/login                - Login action (rate limited)
//! GET  /auth/register             - Register page
//! POST /auth/register             - Register action (rate limited)
//! POST /auth/logout               - Logout action
//!
//! # Vendor (VendorArea; sub-resources need an approved account)
//! GET  /vendor                    - Standing panel or dashboard
//! GET  /vendor/products           - Product list
//! GET  /vendor/products/new       - Product form
//! POST /vendor/products           - Create (multipart, up to 5 images)
//! GET  /vendor/products/{id}/edit - Edit form
//! POST /vendor/products/{id}      - Update
//! POST /vendor/products/{id}/delete
//! GET  /vendor/categories         - Category list (+ new, edit, delete as above)
//! GET  /vendor/orders             - Order list
//! POST /vendor/orders/{id}/status - Status transition
//!
//! # Partner (PartnerArea)
//! GET  /partner                   - Orders + payment code panel
//! POST /partner/orders/{id}/pickup
//! POST /partner/orders/{id}/payment-code
//! POST /partner/payment-code/dismiss
//! GET  /partner/payment-codes     - Payment codes
//! POST /partner/payment-codes/validate
//! GET  /partner/commissions       - Summary + commissions
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod partner;
pub mod shop;
pub mod vendor;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use souk_api::ApiError;
use tower_sessions::Session;

use crate::error::Result;
use crate::filters;
use crate::middleware::auth_rate_limiter;
use crate::models::Flash;
use crate::models::session::push_flash;
use crate::state::AppState;
use crate::views::Layout;

// =============================================================================
// Confirmation step
// =============================================================================

/// `confirmed=true` marks the second submission of an immediate action.
#[derive(Debug, Default, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub confirmed: bool,
}

/// Inline confirmation page rendered before an immediate action runs.
#[derive(Template, WebTemplate)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub layout: Layout,
    pub title: String,
    pub message: String,
    /// Form target; receives the same POST with `confirmed=true`.
    pub action: String,
    /// Extra hidden fields to resubmit.
    pub fields: Vec<(String, String)>,
    pub back: String,
    pub danger: bool,
}

impl ConfirmTemplate {
    pub async fn new(
        session: &Session,
        title: impl Into<String>,
        message: impl Into<String>,
        action: impl Into<String>,
        back: impl Into<String>,
    ) -> Self {
        Self {
            layout: Layout::load(session).await,
            title: title.into(),
            message: message.into(),
            action: action.into(),
            fields: Vec::new(),
            back: back.into(),
            danger: false,
        }
    }

    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    #[must_use]
    pub const fn danger(mut self) -> Self {
        self.danger = true;
        self
    }
}

// =============================================================================
// Action outcome
// =============================================================================

/// Report the outcome of a write as a flash message and go back to `back`.
///
/// Failures leave the list untouched: the redirect refetches it as it is on
/// the server. An expired token still ends the visit.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] as is, and session write failures.
pub async fn finish_action<T>(
    session: &Session,
    result: std::result::Result<T, ApiError>,
    success: impl Into<String>,
    back: &str,
) -> Result<Redirect> {
    let flash = match result {
        Ok(_) => Flash::success(success),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, back, "Action failed");
            Flash::error(e.user_message())
        }
    };
    push_flash(session, flash).await?;
    Ok(Redirect::to(back))
}

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// `HX-Redirect` for HTMX requests, a 303 otherwise.
#[must_use]
pub fn redirect(headers: &HeaderMap, to: &str) -> Response {
    if is_htmx(headers) {
        ([("HX-Redirect", to.to_string())], ()).into_response()
    } else {
        Redirect::to(to).into_response()
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
///
/// Form submissions are rate limited per client IP; the pages are not.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::index))
        .route("/{id}", get(shop::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/orders", get(account::orders))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::index))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout_page).post(cart::checkout))
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .nest("/vendor", vendor::routes())
        .nest("/partner", partner::routes())
}
