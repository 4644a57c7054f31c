//! Partner order list, pickup and payment code issuing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use souk_api::types::Order;
use souk_core::{OrderId, OrderStatus, PartnerArea};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireArea;
use crate::models::Flash;
use crate::models::session::{
    PaymentCodePanel, dismiss_payment_code, payment_code_panel, push_flash, show_payment_code,
};
use crate::routes::account::OrderRow;
use crate::routes::{Confirmation, ConfirmTemplate, finish_action, redirect};
use crate::state::AppState;
use crate::views::{
    Layout, ListPage, ListParams, datetime, list_query, list_return, load_list, status_options,
};

const LIST: &str = "partner_orders";
const BASE: &str = "/partner";

#[derive(Clone)]
pub struct PartnerOrderRow {
    pub id: OrderId,
    pub order: OrderRow,
    pub client: String,
    pub delivery_address: String,
    pub phone: String,
    pub can_pickup: bool,
    pub can_request_code: bool,
}

impl PartnerOrderRow {
    fn new(order: &Order, currency: &str) -> Self {
        Self {
            id: order.id,
            order: OrderRow::new(order, currency),
            client: order.client_label(),
            delivery_address: order.delivery_address.clone().unwrap_or_default(),
            phone: order.phone.clone().unwrap_or_default(),
            can_pickup: order.status.awaits_pickup(),
            can_request_code: order.status.accepts_payment_code(),
        }
    }
}

/// Issued payment code, preformatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePanelView {
    pub code: String,
    pub order_id: OrderId,
    pub amount: Option<String>,
    pub expires_at: String,
}

impl CodePanelView {
    fn new(panel: PaymentCodePanel, currency: &str) -> Self {
        Self {
            code: panel.code,
            order_id: panel.order_id,
            amount: panel.amount.map(|a| a.format(currency)),
            expires_at: datetime(&panel.expires_at),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "partner/orders.html")]
pub struct PartnerOrdersTemplate {
    pub layout: Layout,
    pub panel: Option<CodePanelView>,
    pub list: ListPage<PartnerOrderRow>,
    pub statuses: Vec<(String, String, bool)>,
}

/// Display the partner's orders, with the last issued code if not dismissed.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireArea<PartnerArea>,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<PartnerOrdersTemplate> {
    let requested = list_query(&params, &["status"]);
    let api = state.api().partner(&auth.token);
    let view = load_list(&session, state.lists(), LIST, requested, |ticket| async move {
        let result = api.orders(ticket.query()).await;
        (ticket, result)
    })
    .await?;

    let currency = state.currency();
    let list = ListPage::from_view(view, BASE, |o| PartnerOrderRow::new(&o, currency));
    let statuses = status_options(OrderStatus::ALL, list.filter("status"));
    let panel = payment_code_panel(&session)
        .await
        .map(|p| CodePanelView::new(p, currency));

    Ok(PartnerOrdersTemplate {
        layout: Layout::for_user(&session, &auth.user).await,
        panel,
        list,
        statuses,
    })
}

/// Mark an order as picked up, after confirmation.
#[instrument(skip_all, fields(user_id = %auth.user.id, order_id = %id))]
pub async fn pickup(
    State(state): State<AppState>,
    auth: RequireArea<PartnerArea>,
    session: Session,
    Path(id): Path<OrderId>,
    Form(confirmation): Form<Confirmation>,
) -> Result<Response> {
    let back = list_return(&session, LIST, BASE).await;

    if !confirmation.confirmed {
        return Ok(ConfirmTemplate::new(
            &session,
            "Confirmer l'enlèvement",
            format!("Vous confirmez avoir récupéré la commande #{id} chez le vendeur ?"),
            format!("{BASE}/orders/{id}/pickup"),
            back,
        )
        .await
        .into_response());
    }

    let result = state.api().partner(&auth.token).pickup(id).await;
    Ok(
        finish_action(&session, result, format!("Commande #{id} récupérée."), &back)
            .await?
            .into_response(),
    )
}

/// Issue a payment code and keep it on display until dismissed.
#[instrument(skip_all, fields(user_id = %auth.user.id, order_id = %id))]
pub async fn generate_code(
    State(state): State<AppState>,
    auth: RequireArea<PartnerArea>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Form(confirmation): Form<Confirmation>,
) -> Result<Response> {
    let back = list_return(&session, LIST, BASE).await;

    if !confirmation.confirmed {
        return Ok(ConfirmTemplate::new(
            &session,
            "Générer un code de paiement",
            format!("Un code de paiement sera émis pour la commande #{id}."),
            format!("{BASE}/orders/{id}/payment-code"),
            back,
        )
        .await
        .into_response());
    }

    match state
        .api()
        .partner(&auth.token)
        .generate_payment_code(id)
        .await
    {
        Ok(code) => {
            tracing::info!(code_id = %code.id, "Payment code issued");
            show_payment_code(&session, &PaymentCodePanel::from(code)).await?;
        }
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Payment code refused");
            push_flash(&session, Flash::error(e.user_message())).await?;
        }
    }

    Ok(redirect(&headers, &back))
}

/// Hide the payment code panel.
pub async fn dismiss_code(
    _auth: RequireArea<PartnerArea>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    dismiss_payment_code(&session).await?;
    let back = list_return(&session, LIST, BASE).await;
    Ok(redirect(&headers, &back))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use souk_core::Money;

    use super::*;

    #[test]
    fn test_row_actions_follow_status() {
        let ready: Order = serde_json::from_str(
            r#"{"id":42,"status":"ready","total":"7500","client":{"id":8,"name":"Awa"}}"#,
        )
        .unwrap();
        let row = PartnerOrderRow::new(&ready, "FCFA");
        assert!(row.can_pickup);
        assert!(row.can_request_code);
        assert_eq!(row.client, "Awa");

        let delivered: Order =
            serde_json::from_str(r#"{"id":43,"status":"delivered","total":"0"}"#).unwrap();
        let row = PartnerOrderRow::new(&delivered, "FCFA");
        assert!(!row.can_pickup);
        assert!(!row.can_request_code);
    }

    #[test]
    fn test_panel_view_formats_fields() {
        let panel = PaymentCodePanel {
            code: "PAY-7K2Q".to_string(),
            order_id: OrderId::new(42),
            amount: Some(Money::from_minor(750_000)),
            expires_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap(),
        };
        let view = CodePanelView::new(panel, "FCFA");
        assert_eq!(view.order_id, OrderId::new(42));
        assert_eq!(view.expires_at, "01/06/2025 12:30");
        assert!(view.amount.unwrap().ends_with("FCFA"));
    }
}
