//! Status enums for server-owned entities.
//!
//! Every status decodes unknown wire values into an `Unknown` variant carrying
//! the raw label, so a new backend status degrades to a plain badge instead of
//! failing the whole page.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Defines a string-backed status enum with an `Unknown(String)` fallback.
macro_rules! define_status {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Status value this build does not know about.
            Unknown(String),
        }

        impl $name {
            /// Every known variant, in display order (for filter dropdowns).
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire value sent to and received from the backend.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Unknown(raw) => raw.as_str(),
                }
            }

            /// Human label.
            #[must_use]
            pub fn label(&self) -> &str {
                match self {
                    $( Self::$variant => $label, )+
                    Self::Unknown(raw) => raw.as_str(),
                }
            }

            /// Parse a wire value, falling back to `Unknown`.
            #[must_use]
            pub fn from_wire(raw: &str) -> Self {
                match raw.trim().to_ascii_lowercase().as_str() {
                    $( $wire => Self::$variant, )+
                    _ => Self::Unknown(raw.to_string()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(Self::from_wire(&raw))
            }
        }
    };
}

define_status! {
    /// Vendor account approval status.
    VendorStatus {
        Pending => "pending", "En attente",
        Approved => "approved", "Approuvé",
        Rejected => "rejected", "Rejeté",
        Suspended => "suspended", "Suspendu",
    }
}

define_status! {
    /// Order lifecycle status.
    OrderStatus {
        Pending => "pending", "En attente",
        Confirmed => "confirmed", "Confirmée",
        Preparing => "preparing", "En préparation",
        Ready => "ready", "Prête",
        PickedUp => "picked_up", "Récupérée",
        Delivered => "delivered", "Livrée",
        Cancelled => "cancelled", "Annulée",
    }
}

define_status! {
    /// Payment review status.
    PaymentStatus {
        Pending => "pending", "En attente",
        Approved => "approved", "Approuvé",
        Rejected => "rejected", "Rejeté",
    }
}

define_status! {
    /// Payment code lifecycle status.
    PaymentCodeStatus {
        Active => "active", "Actif",
        Used => "used", "Utilisé",
        Expired => "expired", "Expiré",
        Cancelled => "cancelled", "Annulé",
    }
}

define_status! {
    /// Partner commission settlement status.
    CommissionStatus {
        Pending => "pending", "En attente",
        Paid => "paid", "Payée",
    }
}

impl OrderStatus {
    const FROM_PENDING: &'static [Self] = &[Self::Confirmed, Self::Cancelled];
    const FROM_CONFIRMED: &'static [Self] = &[Self::Preparing, Self::Cancelled];
    const FROM_PREPARING: &'static [Self] = &[Self::Ready];

    /// Statuses a vendor may move an order to from `self`.
    ///
    /// Vendors own the preparation leg only; pickup and delivery belong to the
    /// partner and are never offered here.
    #[must_use]
    pub fn vendor_transitions(&self) -> &'static [Self] {
        match self {
            Self::Pending => Self::FROM_PENDING,
            Self::Confirmed => Self::FROM_CONFIRMED,
            Self::Preparing => Self::FROM_PREPARING,
            _ => &[],
        }
    }

    /// Whether a partner can pick this order up.
    #[must_use]
    pub const fn awaits_pickup(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether a payment code may be requested for this order.
    #[must_use]
    pub const fn accepts_payment_code(&self) -> bool {
        matches!(self, Self::Ready | Self::PickedUp)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_decode() {
        let status: VendorStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(status, VendorStatus::Suspended);
        let status: OrderStatus = serde_json::from_str("\"PICKED_UP\"").unwrap();
        assert_eq!(status, OrderStatus::PickedUp);
    }

    #[test]
    fn test_unknown_value_falls_back() {
        let status: PaymentStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(status, PaymentStatus::Unknown("refunded".to_string()));
        assert_eq!(status.label(), "refunded");
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"refunded\"");
    }

    #[test]
    fn test_vendor_transitions() {
        assert_eq!(
            OrderStatus::Pending.vendor_transitions(),
            &[OrderStatus::Confirmed, OrderStatus::Cancelled]
        );
        assert!(OrderStatus::Ready.vendor_transitions().is_empty());
        assert!(OrderStatus::Delivered.vendor_transitions().is_empty());
    }

    #[test]
    fn test_all_lists_known_variants() {
        assert_eq!(PaymentStatus::ALL.len(), 3);
        assert!(!PaymentCodeStatus::ALL.contains(&PaymentCodeStatus::Unknown(String::new())));
    }
}
