//! Partner commissions.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use souk_api::types::{Commission, CommissionSummary};
use souk_core::{CommissionStatus, FetchTicket, PartnerArea};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireArea;
use crate::state::AppState;
use crate::views::{Layout, ListPage, ListParams, list_query, load_list, opt_datetime, status_options};

const LIST: &str = "partner_commissions";
const BASE: &str = "/partner/commissions";

#[derive(Clone)]
pub struct CommissionRow {
    pub order: String,
    pub amount: String,
    pub rate: String,
    pub status: String,
    pub status_label: String,
    pub created_at: String,
    pub paid_at: String,
}

impl CommissionRow {
    fn new(commission: Commission, currency: &str) -> Self {
        Self {
            order: commission.order_label(),
            amount: commission.amount.format(currency),
            rate: commission
                .rate
                .map_or_else(|| souk_api::types::MISSING.to_string(), |r| format!("{} %", r.normalize())),
            status: commission.status.as_str().to_string(),
            status_label: commission.status.label().to_string(),
            created_at: opt_datetime(commission.created_at.as_ref()),
            paid_at: opt_datetime(commission.paid_at.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummaryView {
    pub total_earned: String,
    pub pending_amount: String,
    pub paid_amount: String,
    pub count: u64,
}

impl SummaryView {
    fn new(summary: &CommissionSummary, currency: &str) -> Self {
        Self {
            total_earned: summary.total_earned.format(currency),
            pending_amount: summary.pending_amount.format(currency),
            paid_amount: summary.paid_amount.format(currency),
            count: summary.count,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "partner/commissions.html")]
pub struct CommissionsTemplate {
    pub layout: Layout,
    pub summary: Option<SummaryView>,
    pub summary_error: Option<String>,
    pub list: ListPage<CommissionRow>,
    pub statuses: Vec<(String, String, bool)>,
}

/// Display the commission summary and list.
///
/// Both are fetched concurrently; either can fail without hiding the other.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireArea<PartnerArea>,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<CommissionsTemplate> {
    let requested = list_query(&params, &["status"]);
    let api = state.api().partner(&auth.token);

    let (summary, view) = tokio::join!(
        api.commission_summary(),
        load_list(&session, state.lists(), LIST, requested, |ticket: FetchTicket| async move {
            let result = api.commissions(ticket.query()).await;
            (ticket, result)
        }),
    );
    let view = view?;

    let currency = state.currency();
    let (summary, summary_error) = match summary {
        Ok(summary) => (Some(SummaryView::new(&summary, currency)), None),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load commission summary");
            (None, Some(e.user_message()))
        }
    };

    let list = ListPage::from_view(view, BASE, |c| CommissionRow::new(c, currency));
    let statuses = status_options(CommissionStatus::ALL, list.filter("status"));

    Ok(CommissionsTemplate {
        layout: Layout::for_user(&session, &auth.user).await,
        summary,
        summary_error,
        list,
        statuses,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_formats_rate() {
        let commission: Commission = serde_json::from_str(
            r#"{"id":1,"order_id":42,"amount":"375.00","rate":"5.00","status":"pending"}"#,
        )
        .unwrap();
        let row = CommissionRow::new(commission, "FCFA");
        assert_eq!(row.rate, "5 %");
        assert_eq!(row.order, "#42");
        assert_eq!(row.status_label, "En attente");
        assert_eq!(row.paid_at, souk_api::types::MISSING);
    }

    #[test]
    fn test_summary_view() {
        let summary = CommissionSummary {
            count: 3,
            ..CommissionSummary::default()
        };
        let view = SummaryView::new(&summary, "FCFA");
        assert_eq!(view.count, 3);
        assert!(view.total_earned.starts_with('0'));
    }
}
