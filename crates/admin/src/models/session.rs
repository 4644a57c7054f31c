//! Session-related types for admin authentication.
//!
//! Types stored in the session: the backend token, the signed-in
//! administrator, flash messages and the last query of each list.

use serde::{Deserialize, Serialize};
use souk_api::types::User;
use souk_core::{ListQuery, UserId};
use tower_sessions::Session;

/// Session-stored admin identity.
///
/// Refreshed from `/auth/me` on every console request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl From<User> for CurrentAdmin {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Backend bearer token.
    pub const API_TOKEN: &str = "api_token";

    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Pending flash message.
    pub const FLASH: &str = "flash";

    /// Prefix of the per-list last query keys.
    pub const LIST_QUERY_PREFIX: &str = "list_query:";
}

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
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(keys::FLASH).await.ok().flatten()
}

fn list_key(list: &str) -> String {
    format!("{}{list}", keys::LIST_QUERY_PREFIX)
}

/// Last query rendered for the list called `list`.
pub async fn previous_query(session: &Session, list: &str) -> Option<ListQuery> {
    session.get::<ListQuery>(&list_key(list)).await.ok().flatten()
}

/// Remember the query rendered for `list`.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn remember_query(
    session: &Session,
    list: &str,
    query: &ListQuery,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(&list_key(list), query).await
}
