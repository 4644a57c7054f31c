use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souk_core::{ClientId, Money, OrderId, OrderStatus, PartnerId, ProductId, VendorId};

use super::{Party, de, relation_label};

/// Order line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default, alias = "name")]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product: Option<ProductRef>,
    pub quantity: u32,
    #[serde(alias = "price")]
    pub unit_price: Money,
    #[serde(default)]
    pub subtotal: Option<Money>,
}

/// Embedded product summary on an order line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
}

impl OrderItem {
    #[must_use]
    pub fn label(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.product.as_ref().map(|p| p.name.clone()))
            .or_else(|| self.product_id.map(|id| format!("#{id}")))
            .unwrap_or_else(|| super::MISSING.to_string())
    }

    /// Line total, computed when the backend does not send one.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.subtotal.unwrap_or(self.unit_price * self.quantity)
    }
}

/// Order as seen by clients, vendors and partners.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default, alias = "order_number")]
    pub reference: Option<String>,
    pub status: OrderStatus,
    #[serde(alias = "total_amount")]
    pub total: Money,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    #[serde(default)]
    pub client: Option<Party>,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    #[serde(default)]
    pub vendor: Option<Party>,
    #[serde(default)]
    pub partner_id: Option<PartnerId>,
    #[serde(default)]
    pub partner: Option<Party>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Reference shown to users: the backend's, else `#id`.
    #[must_use]
    pub fn display_reference(&self) -> String {
        self.reference
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| format!("#{}", self.id))
    }

    #[must_use]
    pub fn client_label(&self) -> String {
        relation_label(self.client.as_ref(), self.client_id)
    }

    #[must_use]
    pub fn vendor_label(&self) -> String {
        relation_label(self.vendor.as_ref(), self.vendor_id)
    }

    #[must_use]
    pub fn partner_label(&self) -> String {
        relation_label(self.partner.as_ref(), self.partner_id)
    }

    /// Total quantity across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub delivery_address: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `PATCH /vendor/orders/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate<'a> {
    pub status: &'a OrderStatus,
}
