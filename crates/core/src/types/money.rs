//! Monetary amounts using decimal arithmetic.
//!
//! The backend serialises decimal columns either as JSON strings (`"1500.00"`)
//! or as JSON numbers depending on the endpoint. [`Money`] accepts both and
//! always serialises as a string so no precision is lost on the way back.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// An amount in the marketplace currency.
///
/// The currency itself is a deployment setting (see `SOUK_CURRENCY`), not a
/// per-amount field: the backend operates in a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from minor units (e.g. cents).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// Underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format with thousands separators and two decimals, e.g. `12 500,00 FCFA`.
    #[must_use]
    pub fn format(&self, currency: &str) -> String {
        let rounded = self.0.round_dp(2);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('\u{202f}');
            }
            grouped.push(ch);
        }

        let sign = if negative { "-" } else { "" };
        if currency.is_empty() {
            format!("{sign}{grouped},{fraction}")
        } else {
            format!("{sign}{grouped},{fraction} {currency}")
        }
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };

        Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_string_and_number() {
        let from_str: Money = serde_json::from_str("\"1500.50\"").unwrap();
        let from_num: Money = serde_json::from_str("1500.5").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_str, Money::from_minor(150_050));
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<Money>("\"abc\"").is_err());
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(Money::from_minor(1_250_000).format("FCFA"), "12\u{202f}500,00 FCFA");
        assert_eq!(Money::from_minor(99).format(""), "0,99");
        assert_eq!(Money::from_minor(-100_000).format("FCFA"), "-1\u{202f}000,00 FCFA");
    }

    #[test]
    fn test_arithmetic() {
        let unit = Money::from_minor(2_500);
        assert_eq!(unit * 3, Money::from_minor(7_500));
        let total: Money = [unit, unit].into_iter().sum();
        assert_eq!(total, Money::from_minor(5_000));
    }
}
