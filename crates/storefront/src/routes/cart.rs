//! Cart and checkout route handlers.
//!
//! The cart lives in the session (see [`crate::models::Cart`]). Cart actions
//! answer HTMX requests with fragments plus a `cart-updated` trigger, and
//! plain form posts with a redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use souk_api::types::NewOrder;
use souk_core::{ClientArea, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use super::is_htmx;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireArea;
use crate::models::session::push_flash;
use crate::models::{Cart, CartLine, Flash};
use crate::state::AppState;
use crate::views::Layout;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub image: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    fn new(cart: &Cart, currency: &str) -> Self {
        Self {
            lines: cart
                .lines
                .iter()
                .map(|line| CartLineView::new(line, currency))
                .collect(),
            subtotal: cart.subtotal().format(currency),
            item_count: cart.item_count(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl CartLineView {
    fn new(line: &CartLine, currency: &str) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.format(currency),
            line_total: line.line_total().format(currency),
            image: line.image.clone(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Checkout form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

impl CheckoutForm {
    /// Build the order, or the first validation message.
    fn to_order(&self, cart: &Cart) -> std::result::Result<NewOrder, &'static str> {
        let delivery_address = self.delivery_address.trim();
        let phone = self.phone.trim();
        if cart.is_empty() {
            return Err("Votre panier est vide.");
        }
        if delivery_address.is_empty() {
            return Err("L'adresse de livraison est obligatoire.");
        }
        if phone.is_empty() {
            return Err("Le numéro de téléphone est obligatoire.");
        }

        let notes = self.notes.trim();
        Ok(NewOrder {
            items: cart.order_items(),
            delivery_address: delivery_address.to_string(),
            phone: phone.to_string(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Cart lines fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub form: CheckoutForm,
    pub error: Option<String>,
}

/// Answer a cart mutation: fragment for HTMX, redirect otherwise.
fn cart_changed(headers: &HeaderMap, cart: &Cart, currency: &str) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::new(cart, currency),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> CartShowTemplate {
    let cart = Cart::load(&session).await;
    CartShowTemplate {
        layout: Layout::load(&session).await,
        cart: CartView::new(&cart, state.currency()),
    }
}

/// Add item to cart.
///
/// The product is looked up so the line carries a current name and price.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state.catalog().product(form.product_id).await?;

    let mut cart = Cart::load(&session).await;
    cart.add(&product, form.quantity.unwrap_or(1));
    cart.save(&session).await?;

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.item_count(),
            },
        )
            .into_response());
    }

    push_flash(
        &session,
        Flash::success(format!("« {} » a été ajouté au panier.", product.name)),
    )
    .await?;
    Ok(Redirect::to("/cart").into_response())
}

/// Update cart line quantity.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = Cart::load(&session).await;
    if cart.update(form.product_id, form.quantity) {
        cart.save(&session).await?;
    }
    Ok(cart_changed(&headers, &cart, state.currency()))
}

/// Remove a cart line.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = Cart::load(&session).await;
    if cart.remove(form.product_id) {
        cart.save(&session).await?;
    }
    Ok(cart_changed(&headers, &cart, state.currency()))
}

/// Get cart count badge (HTMX).
pub async fn count(session: Session) -> CartCountTemplate {
    CartCountTemplate {
        count: Cart::load(&session).await.item_count(),
    }
}

/// Display the checkout form.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn checkout_page(
    State(state): State<AppState>,
    auth: RequireArea<ClientArea>,
    session: Session,
) -> Response {
    let cart = Cart::load(&session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutTemplate {
        layout: Layout::for_user(&session, &auth.user).await,
        cart: CartView::new(&cart, state.currency()),
        form: CheckoutForm::default(),
        error: None,
    }
    .into_response()
}

/// Place the order.
///
/// The cart is cleared only once the backend has accepted the order; on
/// failure the form is rendered again with what was typed.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    auth: RequireArea<ClientArea>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = Cart::load(&session).await;

    let error = match form.to_order(&cart) {
        Err(message) => message.to_string(),
        Ok(order) => match state.api().shop(Some(&auth.token)).place_order(&order).await {
            Ok(placed) => {
                Cart::clear(&session).await?;
                tracing::info!(order_id = %placed.id, "Order placed");
                push_flash(
                    &session,
                    Flash::success(format!(
                        "Commande {} enregistrée.",
                        placed.display_reference()
                    )),
                )
                .await?;
                return Ok(Redirect::to("/account/orders").into_response());
            }
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Order rejected");
                e.user_message()
            }
        },
    };

    Ok(CheckoutTemplate {
        layout: Layout::for_user(&session, &auth.user).await,
        cart: CartView::new(&cart, state.currency()),
        form,
        error: Some(error),
    }
    .into_response())
}
