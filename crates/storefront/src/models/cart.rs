//! Session-held shopping cart.
//!
//! The backend has no cart resource: lines live in the session until checkout
//! turns them into `POST /orders`. Name and price are snapshots taken when the
//! product was added; the backend prices the order itself.

use serde::{Deserialize, Serialize};
use souk_api::types::{NewOrderItem, Product};
use souk_core::{Money, ProductId};
use tower_sessions::Session;

use super::session::keys;

/// Bounds of a line quantity.
pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub image: Option<String>,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

const fn clamp_quantity(quantity: u32) -> u32 {
    if quantity < MIN_QUANTITY {
        MIN_QUANTITY
    } else if quantity > MAX_QUANTITY {
        MAX_QUANTITY
    } else {
        quantity
    }
}

impl Cart {
    /// Load the cart from the session; a missing or unreadable cart is empty.
    pub async fn load(session: &Session) -> Self {
        session
            .get::<Self>(keys::CART)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Persist the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(keys::CART, self).await
    }

    /// Empty the cart in the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.remove::<Self>(keys::CART).await?;
        Ok(())
    }

    /// Add `quantity` of `product`, merging with an existing line.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = clamp_quantity(line.quantity.saturating_add(quantity));
            line.unit_price = product.price;
            return;
        }

        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: clamp_quantity(quantity),
            image: product.cover().map(ToString::to_string),
        });
    }

    /// Set the quantity of a line. Returns `false` if the product is not in the cart.
    pub fn update(&mut self, product_id: ProductId, quantity: u32) -> bool {
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = clamp_quantity(quantity);
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns `false` if the product is not in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of items (sum of quantities).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line totals at snapshot prices.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Order lines for `POST /orders`.
    #[must_use]
    pub fn order_items(&self) -> Vec<NewOrderItem> {
        self.lines
            .iter()
            .map(|l| NewOrderItem {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn product(id: i64, price_minor: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Produit {id}"),
            "price": Money::from_minor(price_minor).amount().to_string(),
            "stock": 10,
        }))
        .unwrap()
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::default();
        cart.add(&product(1, 150_000), 2);
        cart.add(&product(1, 150_000), 3);
        cart.add(&product(2, 50_000), 1);

        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.lines[0].quantity, 5);
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.subtotal(), Money::from_minor(800_000));
    }

    #[test]
    fn test_quantities_are_clamped() {
        let mut cart = Cart::default();
        cart.add(&product(1, 100), 0);
        assert_eq!(cart.lines[0].quantity, 1);

        cart.add(&product(1, 100), 500);
        assert_eq!(cart.lines[0].quantity, MAX_QUANTITY);

        assert!(cart.update(ProductId::new(1), 0));
        assert_eq!(cart.lines[0].quantity, 1);
    }

    #[test]
    fn test_update_and_remove_unknown_line() {
        let mut cart = Cart::default();
        cart.add(&product(1, 100), 1);

        assert!(!cart.update(ProductId::new(9), 2));
        assert!(!cart.remove(ProductId::new(9)));
        assert!(cart.remove(ProductId::new(1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_order_items() {
        let mut cart = Cart::default();
        cart.add(&product(4, 100), 2);

        let items = cart.order_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, ProductId::new(4));
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert!(Cart::load(&session).await.is_empty());

        let mut cart = Cart::default();
        cart.add(&product(3, 2_500), 2);
        cart.save(&session).await.unwrap();
        assert_eq!(Cart::load(&session).await, cart);

        Cart::clear(&session).await.unwrap();
        assert!(Cart::load(&session).await.is_empty());
    }
}
