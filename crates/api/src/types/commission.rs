use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use souk_core::{CommissionId, CommissionStatus, Money, OrderId};

use super::de;

/// Commission earned by a partner on an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commission {
    pub id: CommissionId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub amount: Money,
    /// Percentage applied to the order total, when reported.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub rate: Option<Decimal>,
    pub status: CommissionStatus,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Commission {
    #[must_use]
    pub fn order_label(&self) -> String {
        self.order_id
            .map_or_else(|| super::MISSING.to_string(), |id| format!("#{id}"))
    }
}

/// Totals from `GET /partner/commissions/summary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CommissionSummary {
    #[serde(default, alias = "total")]
    pub total_earned: Money,
    #[serde(default, alias = "pending")]
    pub pending_amount: Money,
    #[serde(default, alias = "paid")]
    pub paid_amount: Money,
    #[serde(default, deserialize_with = "de::count")]
    pub count: u64,
}
