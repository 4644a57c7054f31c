//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use souk_api::types::VendorStats;
use tower_sessions::Session;
use tracing::instrument;

use super::payments::PaymentStatsView;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;
use crate::views::{Layout, Panel};

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub vendors: Panel<VendorStats>,
    pub payments: Panel<PaymentStatsView>,
}

/// Display the dashboard: vendor counts and payment aggregates.
///
/// The two panels load concurrently and fail independently.
#[instrument(skip_all, fields(admin_id = %auth.admin.id))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
) -> Result<DashboardTemplate> {
    let api = state.api().admin(&auth.token);
    let (vendors, payments) = tokio::join!(api.vendor_stats(), api.payment_stats());

    let currency = state.currency();
    Ok(DashboardTemplate {
        layout: Layout::for_admin(&session, &auth.admin).await,
        vendors: Panel::load(vendors, "vendor_stats")?,
        payments: Panel::load(payments, "payment_stats")?
            .map(|stats| PaymentStatsView::new(stats, currency)),
    })
}
