//! Payment codes issued by the partner, and code validation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use chrono::Utc;
use serde::Deserialize;
use souk_api::types::{CodeValidation, PaymentCode};
use souk_core::{PartnerArea, PaymentCodeStatus};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireArea;
use crate::models::Flash;
use crate::models::session::push_flash;
use crate::state::AppState;
use crate::views::{
    Layout, ListPage, ListParams, datetime, list_query, list_return, load_list, opt_datetime,
    status_options,
};

const LIST: &str = "partner_payment_codes";
const BASE: &str = "/partner/payment-codes";

#[derive(Clone)]
pub struct PaymentCodeRow {
    pub code: String,
    pub order: String,
    pub amount: String,
    pub status: String,
    pub status_label: String,
    pub expires_at: String,
    pub used_at: String,
}

impl PaymentCodeRow {
    fn new(code: PaymentCode, currency: &str) -> Self {
        // An active code past its expiry is shown as expired.
        let status = if code.status == PaymentCodeStatus::Active && code.is_expired_at(Utc::now()) {
            PaymentCodeStatus::Expired
        } else {
            code.status.clone()
        };

        Self {
            order: format!("#{}", code.order_id),
            amount: code
                .amount
                .map_or_else(|| souk_api::types::MISSING.to_string(), |a| a.format(currency)),
            status: status.as_str().to_string(),
            status_label: status.label().to_string(),
            expires_at: datetime(&code.expires_at),
            used_at: opt_datetime(code.used_at.as_ref()),
            code: code.code,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateForm {
    #[serde(default)]
    pub code: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "partner/payment_codes.html")]
pub struct PaymentCodesTemplate {
    pub layout: Layout,
    pub list: ListPage<PaymentCodeRow>,
    pub statuses: Vec<(String, String, bool)>,
}

/// Display the partner's payment codes.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireArea<PartnerArea>,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<PaymentCodesTemplate> {
    let requested = list_query(&params, &["status"]);
    let api = state.api().partner(&auth.token);
    let view = load_list(&session, state.lists(), LIST, requested, |ticket| async move {
        let result = api.payment_codes(ticket.query()).await;
        (ticket, result)
    })
    .await?;

    let currency = state.currency();
    let list = ListPage::from_view(view, BASE, |c| PaymentCodeRow::new(c, currency));
    let statuses = status_options(PaymentCodeStatus::ALL, list.filter("status"));

    Ok(PaymentCodesTemplate {
        layout: Layout::for_user(&session, &auth.user).await,
        list,
        statuses,
    })
}

/// Check a code presented by a client.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn validate(
    State(state): State<AppState>,
    auth: RequireArea<PartnerArea>,
    session: Session,
    Form(form): Form<ValidateForm>,
) -> Result<Redirect> {
    let back = list_return(&session, LIST, BASE).await;

    let Some(code) = CodeValidation::parse(&form.code) else {
        push_flash(&session, Flash::error("Veuillez saisir un code.")).await?;
        return Ok(Redirect::to(&back));
    };

    let flash = match state.api().partner(&auth.token).validate_code(&code).await {
        Ok(validated) => {
            tracing::info!(code_id = %validated.id, "Payment code validated");
            Flash::success(format!(
                "Code {} validé pour la commande #{}.",
                validated.code, validated.order_id
            ))
        }
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Payment code validation refused");
            Flash::error(e.user_message())
        }
    };

    push_flash(&session, flash).await?;
    Ok(Redirect::to(&back))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_active_code_shows_expired() {
        let code: PaymentCode = serde_json::from_str(
            r#"{"id":3,"code":"PAY-7K2Q","order_id":42,"status":"active",
                "expires_at":"2020-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let row = PaymentCodeRow::new(code, "FCFA");
        assert_eq!(row.status, "expired");
        assert_eq!(row.order, "#42");
        assert_eq!(row.amount, souk_api::types::MISSING);
    }

    #[test]
    fn test_used_code_keeps_status() {
        let code: PaymentCode = serde_json::from_str(
            r#"{"id":4,"code":"PAY-AB12","order_id":7,"status":"used","amount":"2500",
                "expires_at":"2020-01-01T00:00:00Z","used_at":"2019-12-31T18:00:00Z"}"#,
        )
        .unwrap();
        let row = PaymentCodeRow::new(code, "FCFA");
        assert_eq!(row.status, "used");
        assert_eq!(row.used_at, "31/12/2019 18:00");
    }
}
