//! Session-related types.
//!
//! Everything the storefront keeps between requests lives in the
//! tower-sessions session: the backend token, a cached copy of the user, the
//! cart, one-shot flash messages and the last query of each list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souk_api::types::{PaymentCode, User};
use souk_core::{ListQuery, Money, OrderId, Role, UserId};
use tower_sessions::Session;

/// Session-stored user identity.
///
/// Refreshed from `/auth/me` every time a protected area is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Backend bearer token.
    pub const API_TOKEN: &str = "api_token";

    /// Cached [`super::SessionUser`].
    pub const CURRENT_USER: &str = "current_user";

    /// Shopping cart.
    pub const CART: &str = "cart";

    /// Pending flash message.
    pub const FLASH: &str = "flash";

    /// Payment code shown in the partner panel until dismissed.
    pub const PAYMENT_CODE_PANEL: &str = "payment_code_panel";

    /// Prefix of the per-list last query keys.
    pub const LIST_QUERY_PREFIX: &str = "list_query:";
}

// =============================================================================
// Flash messages
// =============================================================================

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot notification shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// CSS modifier for the notification banner.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "flash-success",
            FlashKind::Error => "flash-error",
        }
    }
}

/// Queue a flash message for the next page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::FLASH, flash).await
}

/// Take the pending flash message, if any.
///
/// Read failures are treated as "no message".
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(keys::FLASH).await.ok().flatten()
}

// =============================================================================
// List queries
// =============================================================================

/// Last query rendered for the list called `list`.
pub async fn previous_query(session: &Session, list: &str) -> Option<ListQuery> {
    session
        .get::<ListQuery>(&format!("{}{list}", keys::LIST_QUERY_PREFIX))
        .await
        .ok()
        .flatten()
}

/// Remember the query rendered for the list called `list`.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn remember_query(
    session: &Session,
    list: &str,
    query: &ListQuery,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(&format!("{}{list}", keys::LIST_QUERY_PREFIX), query)
        .await
}

// =============================================================================
// Partner payment code panel
// =============================================================================

/// Payment code shown to the partner until they dismiss it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCodePanel {
    pub code: String,
    pub order_id: OrderId,
    pub amount: Option<Money>,
    pub expires_at: DateTime<Utc>,
}

impl From<PaymentCode> for PaymentCodePanel {
    fn from(code: PaymentCode) -> Self {
        Self {
            code: code.code,
            order_id: code.order_id,
            amount: code.amount,
            expires_at: code.expires_at,
        }
    }
}

/// Payment code currently displayed in the partner panel.
pub async fn payment_code_panel(session: &Session) -> Option<PaymentCodePanel> {
    session
        .get::<PaymentCodePanel>(keys::PAYMENT_CODE_PANEL)
        .await
        .ok()
        .flatten()
}

/// Show `panel` until dismissed.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn show_payment_code(
    session: &Session,
    panel: &PaymentCodePanel,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::PAYMENT_CODE_PANEL, panel).await
}

/// Dismiss the payment code panel.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn dismiss_payment_code(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<PaymentCodePanel>(keys::PAYMENT_CODE_PANEL)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flash_is_one_shot() {
        let session = session();
        push_flash(&session, Flash::success("Produit supprimé"))
            .await
            .unwrap();

        let flash = take_flash(&session).await.unwrap();
        assert_eq!(flash.message, "Produit supprimé");
        assert_eq!(flash.css_class(), "flash-success");
        assert!(take_flash(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_filter_change_resets_remembered_page() {
        let session = session();
        let first = ListQuery::new(Some(3), None, [("status", Some("pending"))]);
        remember_query(&session, "orders", &first).await.unwrap();
        let previous = previous_query(&session, "orders").await;

        // Same filters: the requested page stands.
        let same = ListQuery::new(Some(4), None, [("status", Some("pending"))]);
        assert_eq!(ListQuery::reconcile(previous.as_ref(), same).page, 4);

        // New filter value with a stale page from the form.
        let changed = ListQuery::new(Some(4), None, [("status", Some("ready"))]);
        assert_eq!(ListQuery::reconcile(previous.as_ref(), changed).page, 1);
    }

    #[tokio::test]
    async fn test_lists_are_remembered_separately() {
        let session = session();
        let products = ListQuery::new(Some(2), None, [("search", Some("bissap"))]);
        remember_query(&session, "products", &products).await.unwrap();

        assert_eq!(previous_query(&session, "products").await, Some(products));
        assert_eq!(previous_query(&session, "categories").await, None);
    }
}
