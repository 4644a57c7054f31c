//! Payment oversight: review pending payments against their codes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use souk_api::types::{Payment, PaymentStats};
use souk_core::PaymentId;
use tower_sessions::Session;
use tracing::instrument;

use super::{ConfirmDialog, Confirmation, ReasonDialog, ReasonForm, confirmed_action, reason_action};
use crate::components::{DataTableConfig, payments_table_config};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;
use crate::views::{
    Layout, ListPage, ListParams, Panel, list_query, list_return, load_list, opt_datetime,
    or_missing,
};

const LIST: &str = "admin_payments";
const BASE: &str = "/payments";

/// Payment row view for templates.
#[derive(Debug, Clone)]
pub struct PaymentRow {
    pub id: PaymentId,
    pub client: String,
    pub partner: String,
    pub code: String,
    pub order: String,
    pub amount: String,
    pub method: String,
    pub created_at: String,
    pub status: String,
    pub status_label: String,
    pub rejection_reason: Option<String>,
    /// Approve and reject apply.
    pub reviewable: bool,
}

impl PaymentRow {
    fn new(payment: Payment, currency: &str) -> Self {
        Self {
            id: payment.id,
            client: payment.client_label(),
            partner: payment.partner_label(),
            code: payment.code_label(),
            order: payment
                .order_id
                .map_or_else(|| souk_api::types::MISSING.to_string(), |id| format!("#{id}")),
            amount: payment.amount.format(currency),
            method: or_missing(payment.method.as_deref()),
            created_at: opt_datetime(payment.created_at.as_ref()),
            status: payment.status.as_str().to_string(),
            status_label: payment.status.label().to_string(),
            rejection_reason: payment
                .rejection_reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(ToString::to_string),
            reviewable: payment.is_pending(),
        }
    }
}

/// Payment aggregates, amounts formatted.
#[derive(Debug, Clone)]
pub struct PaymentStatsView {
    pub total_count: u64,
    pub total_amount: String,
    pub pending_count: u64,
    pub approved_count: u64,
    pub rejected_count: u64,
}

impl PaymentStatsView {
    #[must_use]
    pub fn new(stats: PaymentStats, currency: &str) -> Self {
        Self {
            total_count: stats.total_count,
            total_amount: stats.total_amount.format(currency),
            pending_count: stats.pending_count,
            approved_count: stats.approved_count,
            rejected_count: stats.rejected_count,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "payments.html")]
pub struct PaymentsTemplate {
    pub layout: Layout,
    pub table: DataTableConfig,
    pub list: ListPage<PaymentRow>,
    pub stats: Panel<PaymentStatsView>,
}

/// Display payments with their aggregates.
#[instrument(skip_all, fields(admin_id = %auth.admin.id))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<PaymentsTemplate> {
    let table = payments_table_config();
    let requested = list_query(&params, &table.filter_keys());
    let api = state.api().admin(&auth.token);

    let (stats, view) = tokio::join!(
        api.payment_stats(),
        load_list(&session, state.lists(), LIST, requested, |ticket| async move {
            let result = api.payments(ticket.query()).await;
            (ticket, result)
        }),
    );
    let view = view?;
    let currency = state.currency();
    let stats = Panel::load(stats, "payment_stats")?.map(|s| PaymentStatsView::new(s, currency));

    let list = ListPage::from_view(view, BASE, |p| PaymentRow::new(p, currency));
    Ok(PaymentsTemplate {
        layout: Layout::for_admin(&session, &auth.admin).await,
        table: table.with_values(&list.query),
        list,
        stats,
    })
}

/// Approve a pending payment.
#[instrument(skip_all, fields(admin_id = %auth.admin.id, payment_id = %id))]
pub async fn approve(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Path(id): Path<PaymentId>,
    Form(confirmation): Form<Confirmation>,
) -> Result<Response> {
    let dialog = ConfirmDialog {
        title: format!("Approuver le paiement #{id}"),
        message: "Le paiement sera validé et la commande considérée comme réglée.".to_string(),
        action: format!("{BASE}/{id}/approve"),
        back: list_return(&session, LIST, BASE).await,
        danger: false,
    };
    let api = state.api().admin(&auth.token);
    confirmed_action(&session, dialog, confirmation, "Paiement approuvé.", || async move {
        api.approve_payment(id).await
    })
    .await
}

/// Reject a pending payment with a reason.
#[instrument(skip_all, fields(admin_id = %auth.admin.id, payment_id = %id))]
pub async fn reject(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Path(id): Path<PaymentId>,
    Form(form): Form<ReasonForm>,
) -> Result<Response> {
    let dialog = ReasonDialog {
        title: format!("Rejeter le paiement #{id}"),
        message: "Indiquez pourquoi ce paiement est refusé.".to_string(),
        action: format!("{BASE}/{id}/reject"),
        back: list_return(&session, LIST, BASE).await,
        submit_label: "Rejeter".to_string(),
    };
    let api = state.api().admin(&auth.token);
    reason_action(&session, dialog, form, "Paiement rejeté.", |reason| async move {
        api.reject_payment(id, &reason).await
    })
    .await
}
