//! Wire types returned by the Souk backend.
//!
//! Relations (client, partner, category, payment code) are embedded only when
//! the backend chooses to; views go through the `*_label` helpers which fall
//! back to `#<id>` and then to an em dash.

mod catalog;
mod commission;
mod order;
mod payment;
mod user;
mod vendor;

pub use catalog::*;
pub use commission::*;
pub use order::*;
pub use payment::*;
pub use user::*;
pub use vendor::*;

use serde::Deserialize;

/// Placeholder rendered when neither a relation nor its key is present.
pub const MISSING: &str = "\u{2014}";

/// Minimal embedded party (client, partner, vendor user).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Party {
    pub id: i64,
    #[serde(default, alias = "shop_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Label for an optionally embedded relation.
#[must_use]
pub fn relation_label<K: std::fmt::Display>(party: Option<&Party>, key: Option<K>) -> String {
    if let Some(name) = party.and_then(|p| p.name.as_deref()).filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }
    match (party, key) {
        (_, Some(key)) => format!("#{key}"),
        (Some(party), None) => format!("#{}", party.id),
        (None, None) => MISSING.to_string(),
    }
}

/// Serde helpers for the backend's loosely typed fields.
pub(crate) mod de {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    /// Timestamps arrive as RFC 3339 (`2025-03-01T10:00:00.000000Z`) or as
    /// `2025-03-01 10:00:00` (UTC).
    pub fn opt_datetime<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        parse_datetime(raw).map(Some).map_err(serde::de::Error::custom)
    }

    pub fn datetime<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(raw.trim()).map_err(serde::de::Error::custom)
    }

    fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
            })
            .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
    }

    /// A display name sent as a string, a number, or an object with `name`.
    pub fn opt_name<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
            Named { name: String },
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Text(s)) => Some(s),
            Some(Raw::Number(n)) => Some(format!("#{n}")),
            Some(Raw::Named { name }) => Some(name),
            None => None,
        })
    }

    /// Counters that some endpoints send as strings.
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Number(n)) => Ok(n),
            Some(Raw::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
            None => Ok(0),
        }
    }
}
