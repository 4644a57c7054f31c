//! Read-only view of every payment code issued by partners.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use souk_api::types::{MISSING, PaymentCode};
use souk_core::PaymentCodeStatus;
use tower_sessions::Session;
use tracing::instrument;

use crate::components::{DataTableConfig, payment_codes_table_config};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;
use crate::views::{Layout, ListPage, ListParams, datetime, list_query, load_list, opt_datetime};

const LIST: &str = "admin_payment_codes";
const BASE: &str = "/payment-codes";

#[derive(Debug, Clone)]
pub struct PaymentCodeRow {
    pub code: String,
    pub order: String,
    pub partner: String,
    pub amount: String,
    pub expires_at: String,
    pub used_at: String,
    pub status: String,
    pub status_label: String,
}

impl PaymentCodeRow {
    fn new(code: PaymentCode, currency: &str, now: DateTime<Utc>) -> Self {
        // An active code past its expiry is shown as expired.
        let status = if code.status == PaymentCodeStatus::Active && code.is_expired_at(now) {
            PaymentCodeStatus::Expired
        } else {
            code.status.clone()
        };

        Self {
            order: format!("#{}", code.order_id),
            partner: code.partner_label(),
            amount: code
                .amount
                .map_or_else(|| MISSING.to_string(), |a| a.format(currency)),
            expires_at: datetime(&code.expires_at),
            used_at: opt_datetime(code.used_at.as_ref()),
            status: status.as_str().to_string(),
            status_label: status.label().to_string(),
            code: code.code,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "payment_codes.html")]
pub struct PaymentCodesTemplate {
    pub layout: Layout,
    pub table: DataTableConfig,
    pub list: ListPage<PaymentCodeRow>,
}

/// Display payment codes, filterable by status.
#[instrument(skip_all, fields(admin_id = %auth.admin.id))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<PaymentCodesTemplate> {
    let table = payment_codes_table_config();
    let requested = list_query(&params, &table.filter_keys());
    let api = state.api().admin(&auth.token);

    let view = load_list(&session, state.lists(), LIST, requested, |ticket| async move {
        let result = api.payment_codes(ticket.query()).await;
        (ticket, result)
    })
    .await?;

    let currency = state.currency();
    let now = Utc::now();
    let list = ListPage::from_view(view, BASE, |c| PaymentCodeRow::new(c, currency, now));
    Ok(PaymentCodesTemplate {
        layout: Layout::for_admin(&session, &auth.admin).await,
        table: table.with_values(&list.query),
        list,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn code(json: &str) -> PaymentCode {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_active_code_past_expiry_reads_expired() {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        let row = PaymentCodeRow::new(
            code(
                r#"{"id":3,"code":"PAY-7K2Q","order_id":42,"status":"active",
                    "expires_at":"2025-06-01 12:00:00","partner":{"id":2,"name":"Rapide Livraison"}}"#,
            ),
            "FCFA",
            now,
        );
        assert_eq!(row.status, "expired");
        assert_eq!(row.status_label, "Expiré");
        assert_eq!(row.partner, "Rapide Livraison");
        assert_eq!(row.used_at, MISSING);
    }

    #[test]
    fn test_active_code_before_expiry_stays_active() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
        let row = PaymentCodeRow::new(
            code(
                r#"{"id":4,"code":"PAY-AB12","order_id":7,"status":"active","amount":"2500",
                    "expires_at":"2025-06-01 12:00:00","partner_id":5}"#,
            ),
            "FCFA",
            now,
        );
        assert_eq!(row.status, "active");
        assert_eq!(row.partner, "#5");
        assert_eq!(row.order, "#7");
    }

    #[test]
    fn test_cancelled_code_keeps_status() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let row = PaymentCodeRow::new(
            code(
                r#"{"id":5,"code":"PAY-ZZ99","order_id":8,"status":"cancelled",
                    "expires_at":"2025-06-01 12:00:00"}"#,
            ),
            "FCFA",
            now,
        );
        assert_eq!(row.status, "cancelled");
    }
}
