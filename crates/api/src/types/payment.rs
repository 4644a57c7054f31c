use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souk_core::{
    ClientId, Money, OrderId, PartnerId, PaymentCodeId, PaymentCodeStatus, PaymentId,
    PaymentStatus,
};

use super::{Party, de, relation_label};

/// Payment code issued by a partner for an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentCode {
    pub id: PaymentCodeId,
    pub code: String,
    pub order_id: OrderId,
    #[serde(default)]
    pub amount: Option<Money>,
    pub status: PaymentCodeStatus,
    #[serde(deserialize_with = "de::datetime")]
    pub expires_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub partner_id: Option<PartnerId>,
    #[serde(default)]
    pub partner: Option<Party>,
}

impl PaymentCode {
    /// Whether the code can no longer be used at `now`, whatever its status says.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    #[must_use]
    pub fn partner_label(&self) -> String {
        relation_label(self.partner.as_ref(), self.partner_id)
    }
}

/// Embedded payment code reference on a payment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentCodeRef {
    #[serde(default)]
    pub id: Option<PaymentCodeId>,
    pub code: String,
}

/// Payment awaiting or past administrator review.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Money,
    pub status: PaymentStatus,
    #[serde(default, alias = "payment_method")]
    pub method: Option<String>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    #[serde(default)]
    pub client: Option<Party>,
    #[serde(default)]
    pub partner_id: Option<PartnerId>,
    #[serde(default)]
    pub partner: Option<Party>,
    #[serde(default)]
    pub payment_code_id: Option<PaymentCodeId>,
    #[serde(default)]
    pub payment_code: Option<PaymentCodeRef>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Payment {
    #[must_use]
    pub fn client_label(&self) -> String {
        relation_label(self.client.as_ref(), self.client_id)
    }

    #[must_use]
    pub fn partner_label(&self) -> String {
        relation_label(self.partner.as_ref(), self.partner_id)
    }

    /// Code text, `#id` when only the key is known.
    #[must_use]
    pub fn code_label(&self) -> String {
        match (&self.payment_code, self.payment_code_id) {
            (Some(code), _) => code.code.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => super::MISSING.to_string(),
        }
    }

    /// Whether the review actions apply.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, PaymentStatus::Pending)
    }
}

/// Aggregates from `GET /admin/payments/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentStats {
    #[serde(default, alias = "total", deserialize_with = "de::count")]
    pub total_count: u64,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default, alias = "pending", deserialize_with = "de::count")]
    pub pending_count: u64,
    #[serde(default, alias = "approved", deserialize_with = "de::count")]
    pub approved_count: u64,
    #[serde(default, alias = "rejected", deserialize_with = "de::count")]
    pub rejected_count: u64,
}

/// Body of `POST /partner/payment-codes/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeValidation {
    pub code: String,
}

impl CodeValidation {
    /// Normalise user input: trimmed, inner whitespace removed, uppercased.
    ///
    /// Returns `None` when nothing is left.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let code: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        (!code.is_empty()).then_some(Self { code })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_payment_labels_fall_back() {
        let payment: Payment = serde_json::from_str(
            r#"{"id":1,"amount":"2500.00","status":"pending","client_id":4,
                "partner":{"id":2,"name":"Rapide Livraison"},"payment_code_id":11}"#,
        )
        .unwrap();

        assert_eq!(payment.client_label(), "#4");
        assert_eq!(payment.partner_label(), "Rapide Livraison");
        assert_eq!(payment.code_label(), "#11");
        assert!(payment.is_pending());
    }

    #[test]
    fn test_payment_code_expiry() {
        let code: PaymentCode = serde_json::from_str(
            r#"{"id":3,"code":"PAY-7K2Q","order_id":42,"status":"active",
                "expires_at":"2025-06-01 12:00:00"}"#,
        )
        .unwrap();

        let before = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(!code.is_expired_at(before));
        assert!(code.is_expired_at(after));
        assert_eq!(code.order_id, OrderId::new(42));
    }

    #[test]
    fn test_code_validation_normalises() {
        assert_eq!(CodeValidation::parse(" pay-7k2q ").unwrap().code, "PAY-7K2Q");
        assert_eq!(CodeValidation::parse("pay 7k 2q").unwrap().code, "PAY7K2Q");
        assert!(CodeValidation::parse("  \t").is_none());
    }

    #[test]
    fn test_stats_aliases() {
        let stats: PaymentStats = serde_json::from_str(
            r#"{"total":5,"total_amount":"12500.00","pending":2,"approved":2,"rejected":1}"#,
        )
        .unwrap();
        assert_eq!(stats.total_count, 5);
        assert_eq!(stats.pending_count, 2);
        assert_eq!(stats.total_amount, Money::from_minor(1_250_000));
    }
}
