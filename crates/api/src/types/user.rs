use serde::{Deserialize, Serialize};
use souk_core::{Role, UserId};

use crate::client::ApiToken;

/// Account returned by `/auth/me` and `/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Token and account returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    #[serde(alias = "access_token")]
    pub token: ApiToken,
    pub user: User,
}

/// Body of `POST /auth/login`.
#[derive(Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Roles a visitor may sign up for from the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupRole {
    Client,
    Vendor,
    Partner,
}

impl From<SignupRole> for Role {
    fn from(role: SignupRole) -> Self {
        match role {
            SignupRole::Client => Self::Client,
            SignupRole::Vendor => Self::Vendor,
            SignupRole::Partner => Self::Partner,
        }
    }
}

/// Body of `POST /auth/register`. `Debug` leaves both password fields out.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub role: SignupRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Required by the backend for vendor accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirmation", &"[REDACTED]")
            .field("role", &self.role)
            .field("phone", &self.phone)
            .field("shop_name", &self.shop_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_debug_hides_passwords() {
        let registration = Registration {
            name: "Awa Diop".to_string(),
            email: "awa@example.com".to_string(),
            password: "sésame-2024".to_string(),
            password_confirmation: "sésame-2024".to_string(),
            role: SignupRole::Vendor,
            phone: None,
            shop_name: Some("Bissap & Co".to_string()),
        };
        let debug = format!("{registration:?}");
        assert!(debug.contains("awa@example.com"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sésame"));
    }
}
