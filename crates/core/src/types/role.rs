//! User roles recognised by the backend.

use serde::{Deserialize, Serialize};

/// Role attached to every backend account.
///
/// The backend is authoritative; the web tier only uses the role to pick which
/// area a user may enter and where to send them after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office operator (vendor approval, payment oversight).
    Admin,
    /// Seller managing a shop, its catalog and incoming orders.
    Vendor,
    /// Delivery / payment partner picking up orders and issuing payment codes.
    Partner,
    /// Shopper.
    #[serde(alias = "customer")]
    Client,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Vendor => "vendor",
            Self::Partner => "partner",
            Self::Client => "client",
        }
    }

    /// Human label for navigation and messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrateur",
            Self::Vendor => "Vendeur",
            Self::Partner => "Partenaire",
            Self::Client => "Client",
        }
    }

    /// Landing path of the role on the storefront host.
    ///
    /// Admins live on the separate admin host, so the storefront sends them to
    /// the public root.
    #[must_use]
    pub const fn storefront_home(&self) -> &'static str {
        match self {
            Self::Vendor => "/vendor",
            Self::Partner => "/partner",
            Self::Client => "/account/orders",
            Self::Admin => "/",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "vendor" => Ok(Self::Vendor),
            "partner" => Ok(Self::Partner),
            "client" | "customer" => Ok(Self::Client),
            other => Err(format!("invalid role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [Role::Admin, Role::Vendor, Role::Partner, Role::Client] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!("Customer".parse::<Role>(), Ok(Role::Client));
        assert!("courier".parse::<Role>().is_err());
    }

    #[test]
    fn test_storefront_home() {
        assert_eq!(Role::Vendor.storefront_home(), "/vendor");
        assert_eq!(Role::Partner.storefront_home(), "/partner");
        assert_eq!(Role::Admin.storefront_home(), "/");
    }
}
