//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Dashboard
//! GET  /                              - Vendor and payment aggregates
//!
//! # Auth (admin accounts of the Souk backend)
//! GET  /auth/login                    - Login page (?next, ?denied)
//! POST /auth/login                    - Login action
//! POST /auth/logout                   - Logout
//!
//! # Vendors
//! GET  /vendors                       - Vendor list (status, search) + counts
//! POST /vendors/{id}/approve          - Confirm, then approve
//! POST /vendors/{id}/reject           - Reason dialog, then reject
//! POST /vendors/{id}/suspend          - Reason dialog, then suspend
//! POST /vendors/{id}/reactivate       - Confirm, then reactivate
//! POST /vendors/{id}/delete           - Confirm, then delete
//!
//! # Payments
//! GET  /payments                      - Payment list (status, search) + stats
//! POST /payments/{id}/approve         - Confirm, then approve
//! POST /payments/{id}/reject          - Reason dialog, then reject
//!
//! # Payment codes
//! GET  /payment-codes                 - Read-only list (status)
//! ```

pub mod auth;
pub mod dashboard;
pub mod payment_codes;
pub mod payments;
pub mod vendors;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use souk_api::ApiError;
use souk_core::Reason;
use tower_sessions::Session;

use crate::error::Result;
use crate::filters;
use crate::models::Flash;
use crate::models::session::push_flash;
use crate::state::AppState;
use crate::views::Layout;

// =============================================================================
// Immediate actions
// =============================================================================

/// `confirmed=true` marks the second submission of an immediate action.
#[derive(Debug, Default, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub confirmed: bool,
}

/// Static parts of an inline confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub action: String,
    pub back: String,
    pub danger: bool,
}

/// Inline confirmation rendered before an immediate action runs.
#[derive(Template, WebTemplate)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub layout: Layout,
    pub dialog: ConfirmDialog,
}

/// Drive an immediate action: the first submission asks for confirmation,
/// the confirmed one runs `run` and reports through [`finish_action`].
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] as is, and session write failures.
pub async fn confirmed_action<T, F, Fut>(
    session: &Session,
    dialog: ConfirmDialog,
    confirmation: Confirmation,
    success: impl Into<String>,
    run: F,
) -> Result<Response>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, ApiError>>,
{
    if !confirmation.confirmed {
        return Ok(ConfirmTemplate {
            layout: Layout::load(session).await,
            dialog,
        }
        .into_response());
    }

    let result = run().await;
    Ok(finish_action(session, result, success, &dialog.back)
        .await?
        .into_response())
}

/// Report the outcome of a write as a flash message and go back to `back`.
///
/// Nothing is updated locally: the redirect reloads the list and its
/// statistics from the backend.
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
            tracing::warn!(error = %e, back, "Admin action failed");
            Flash::error(e.user_message())
        }
    };
    push_flash(session, flash).await?;
    Ok(Redirect::to(back))
}

// =============================================================================
// Reason-bearing actions
// =============================================================================

/// Submission of the reason dialog.
///
/// An absent field means the dialog is being opened; a present one, even
/// blank, is a submission.
#[derive(Debug, Default, Deserialize)]
pub struct ReasonForm {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Static parts of a reason dialog.
#[derive(Debug, Clone)]
pub struct ReasonDialog {
    pub title: String,
    pub message: String,
    pub action: String,
    pub back: String,
    pub submit_label: String,
}

/// Reason dialog, with the text typed so far and the last error.
#[derive(Template, WebTemplate)]
#[template(path = "reason.html")]
pub struct ReasonTemplate {
    pub layout: Layout,
    pub dialog: ReasonDialog,
    pub reason: String,
    pub error: Option<String>,
    pub max_chars: usize,
}

impl ReasonDialog {
    async fn render(self, session: &Session, reason: String, error: Option<String>) -> ReasonTemplate {
        ReasonTemplate {
            layout: Layout::load(session).await,
            dialog: self,
            reason,
            error,
            max_chars: Reason::MAX_CHARS,
        }
    }
}

/// Drive a reason-bearing action.
///
/// Blank or oversized input re-renders the dialog with a message and never
/// calls `run`. A backend failure re-renders it with the text preserved;
/// success closes it and returns to the list.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] as is, and session write failures.
pub async fn reason_action<T, F, Fut>(
    session: &Session,
    dialog: ReasonDialog,
    form: ReasonForm,
    success: impl Into<String>,
    run: F,
) -> Result<Response>
where
    F: FnOnce(Reason) -> Fut,
    Fut: Future<Output = std::result::Result<T, ApiError>>,
{
    let Some(text) = form.reason else {
        return Ok(dialog.render(session, String::new(), None).await.into_response());
    };

    let reason = match Reason::parse(&text) {
        Ok(reason) => reason,
        Err(e) => {
            return Ok(dialog
                .render(session, text, Some(e.to_string()))
                .await
                .into_response());
        }
    };

    match run(reason).await {
        Ok(_) => {
            push_flash(session, Flash::success(success)).await?;
            Ok(Redirect::to(&dialog.back).into_response())
        }
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, action = %dialog.action, "Reason-bearing action failed");
            Ok(dialog
                .render(session, text, Some(e.user_message()))
                .await
                .into_response())
        }
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the vendor routes router.
pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(vendors::index))
        .route("/{id}/approve", post(vendors::approve))
        .route("/{id}/reject", post(vendors::reject))
        .route("/{id}/suspend", post(vendors::suspend))
        .route("/{id}/reactivate", post(vendors::reactivate))
        .route("/{id}/delete", post(vendors::delete))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::index))
        .route("/{id}/approve", post(payments::approve))
        .route("/{id}/reject", post(payments::reject))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/vendors", vendor_routes())
        .nest("/payments", payment_routes())
        .route("/payment-codes", get(payment_codes::index))
}
