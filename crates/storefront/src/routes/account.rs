//! Customer account route handlers.
//!
//! These routes require the client role.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use souk_api::types::Order;
use souk_core::{ClientArea, OrderStatus};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireArea;
use crate::state::AppState;
use crate::views::{Layout, ListPage, ListParams, list_query, load_list, opt_datetime, status_options};

const LIST: &str = "account_orders";

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderRow {
    pub reference: String,
    pub status: String,
    pub status_label: String,
    pub total: String,
    pub items: u32,
    pub vendor: String,
    pub created_at: String,
}

impl OrderRow {
    #[must_use]
    pub fn new(order: &Order, currency: &str) -> Self {
        Self {
            reference: order.display_reference(),
            status: order.status.as_str().to_string(),
            status_label: order.status.label().to_string(),
            total: order.total.format(currency),
            items: order.item_count(),
            vendor: order.vendor_label(),
            created_at: opt_datetime(order.created_at.as_ref()),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub list: ListPage<OrderRow>,
    pub statuses: Vec<(String, String, bool)>,
}

/// Display the client's order history.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn orders(
    State(state): State<AppState>,
    auth: RequireArea<ClientArea>,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<OrdersTemplate> {
    let requested = list_query(&params, &["status"]);
    let shop = state.api().shop(Some(&auth.token));
    let view = load_list(&session, state.lists(), LIST, requested, |ticket| async move {
        let result = shop.my_orders(ticket.query()).await;
        (ticket, result)
    })
    .await?;

    let currency = state.currency();
    let list = ListPage::from_view(view, "/account/orders", |o| OrderRow::new(&o, currency));
    let statuses = status_options(OrderStatus::ALL, list.filter("status"));

    Ok(OrdersTemplate {
        layout: Layout::for_user(&session, &auth.user).await,
        list,
        statuses,
    })
}
