use chrono::{DateTime, Utc};
use serde::Deserialize;
use souk_core::{Money, UserId, VendorId, VendorStanding, VendorStatus};

use super::{Party, de};

/// Vendor account as returned by `/vendor/profile` and `/admin/vendors`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(alias = "name")]
    pub shop_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: VendorStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub suspension_reason: Option<String>,
    #[serde(default, deserialize_with = "de::opt_name")]
    pub approved_by: Option<String>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    /// Owning account, when embedded.
    #[serde(default)]
    pub user: Option<Party>,
}

impl Vendor {
    /// Approval workflow position with only the fields that apply to it.
    #[must_use]
    pub fn standing(&self) -> VendorStanding {
        VendorStanding::from_parts(
            &self.status,
            self.rejection_reason.as_deref(),
            self.suspension_reason.as_deref(),
            self.approved_by.as_deref(),
        )
    }

    /// Contact e-mail, falling back to the owning account's.
    #[must_use]
    pub fn contact_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|u| u.email.as_deref()))
    }
}

/// Vendor counts per status (`GET /admin/vendors/stats`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct VendorStats {
    #[serde(default, deserialize_with = "de::count")]
    pub total: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub pending: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub approved: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub rejected: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub suspended: u64,
}

/// Operational figures shown on an approved vendor's dashboard (`GET /vendor/stats`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct VendorDashboardStats {
    #[serde(default, alias = "total_products", deserialize_with = "de::count")]
    pub products: u64,
    #[serde(default, alias = "total_categories", deserialize_with = "de::count")]
    pub categories: u64,
    #[serde(default, alias = "total_orders", deserialize_with = "de::count")]
    pub orders: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub pending_orders: u64,
    #[serde(default, alias = "total_revenue")]
    pub revenue: Money,
}
