//! Shared view models for templates.
//!
//! Handlers turn API types into plain structs with preformatted strings, so
//! templates only print and loop.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use souk_api::ApiError;
use souk_api::types::MISSING;
use souk_core::{
    FetchGenerations, FetchTicket, ListQuery, ListState, ListView, PageLinks, Paginated,
};
use tower_sessions::Session;

use crate::models::session::{previous_query, remember_query, take_flash};
use crate::models::{Cart, Flash, SessionUser, session_keys};

/// Data every full page needs: navigation user, flash, cart badge.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user: Option<SessionUser>,
    pub flash: Option<Flash>,
    pub cart_count: u32,
    /// Approved vendor: product, category and order links are shown.
    pub can_operate: bool,
}

impl Layout {
    /// Build the layout, consuming the pending flash message.
    pub async fn load(session: &Session) -> Self {
        let user = session
            .get::<SessionUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();
        let flash = take_flash(session).await;
        let cart_count = Cart::load(session).await.item_count();

        Self {
            user,
            flash,
            cart_count,
            can_operate: false,
        }
    }

    /// Same as [`Layout::load`] with `user` already resolved by the guard.
    pub async fn for_user(session: &Session, user: &SessionUser) -> Self {
        Self {
            user: Some(user.clone()),
            ..Self::load(session).await
        }
    }

    /// Mark the vendor as approved to operate.
    #[must_use]
    pub const fn operating(mut self) -> Self {
        self.can_operate = true;
        self
    }

    /// Replace the pending flash with an inline one (re-rendered forms).
    #[must_use]
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    /// Home link of the signed-in user's role.
    #[must_use]
    pub fn home(&self) -> &'static str {
        self.user
            .as_ref()
            .map_or("/", |u| u.role.storefront_home())
    }
}

/// One rendered page of a list.
#[derive(Debug, Clone)]
pub struct ListPage<R> {
    pub rows: Vec<R>,
    pub state: ListState,
    pub error: Option<String>,
    pub links: PageLinks,
    pub query: ListQuery,
}

impl<R> ListPage<R> {
    /// Render the committed state of `view`.
    pub fn from_view<T>(view: ListView<T>, base_path: &str, row: impl FnMut(T) -> R) -> Self {
        let state = view.state();
        let error = view.error().map(ToString::to_string);
        let query = view.query().clone();
        let page = view
            .into_page()
            .unwrap_or_else(|| Paginated::empty(query.per_page));
        let links = PageLinks::build(base_path, &query, &page.meta, page.items.len());

        Self {
            rows: page.items.into_iter().map(row).collect(),
            state,
            error,
            links,
            query,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state == ListState::Empty
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state == ListState::Failed
    }

    /// A newer fetch of the same list superseded this one.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == ListState::Loading
    }

    /// Value of an active filter, or empty for form inputs.
    #[must_use]
    pub fn filter(&self, key: &str) -> &str {
        self.query.filter(key).unwrap_or_default()
    }
}

/// Raw query parameters of a list page.
pub type ListParams = HashMap<String, String>;

/// Build the requested [`ListQuery`] from raw parameters, keeping only `filter_keys`.
#[must_use]
pub fn list_query(params: &ListParams, filter_keys: &[&str]) -> ListQuery {
    let number = |key: &str| params.get(key).and_then(|v| v.trim().parse().ok());
    ListQuery::new(
        number("page"),
        number("per_page"),
        filter_keys
            .iter()
            .map(|key| (*key, params.get(*key).map(String::as_str))),
    )
}

/// Run one list fetch through a [`ListView`].
///
/// The requested query is reconciled with the one last rendered for `list`
/// (a filter change resets the page). The fetch takes the next generation of
/// `list` for this session; when a newer fetch of the same list started
/// meanwhile, the result is dropped and the view is left loading. Only a
/// committed result updates the remembered query. Read failures are logged
/// and turned into the user-facing message.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written, or if the
/// backend rejected the token.
pub async fn load_list<T, F, Fut>(
    session: &Session,
    generations: &FetchGenerations,
    list: &'static str,
    requested: ListQuery,
    fetch: F,
) -> crate::error::Result<ListView<T>>
where
    F: FnOnce(FetchTicket) -> Fut,
    Fut: Future<Output = (FetchTicket, Result<Paginated<T>, ApiError>)>,
{
    let previous = previous_query(session, list).await;
    let query = ListQuery::reconcile(previous.as_ref(), requested);

    let turn = match session.id() {
        Some(id) => Some(generations.begin(&id.to_string(), list).await),
        None => None,
    };
    let mut view = ListView::new(query.clone());
    if let Some(turn) = &turn {
        view.observe(turn.generation().saturating_sub(1));
    }
    let ticket = view.request(query);

    let (ticket, result) = fetch(ticket).await;
    let result = match result {
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        other => other.map_err(|e| {
            tracing::error!(list, error = %e, "List fetch failed");
            e.user_message()
        }),
    };

    if let Some(turn) = &turn {
        view.observe(turn.latest());
    }
    if view.commit(ticket, result) {
        remember_query(session, list, view.query()).await?;
    } else {
        tracing::debug!(list, "Dropped result of a superseded list fetch");
    }
    Ok(view)
}

/// Path of `base` at the page and filters last rendered for `list`.
pub async fn list_return(session: &Session, list: &str, base: &str) -> String {
    match previous_query(session, list).await {
        Some(query) => format!("{base}?{}", query.current_query_string()),
        None => base.to_string(),
    }
}

/// `12/03/2025 14:05`
#[must_use]
pub fn datetime(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

/// [`datetime`] or the missing placeholder.
#[must_use]
pub fn opt_datetime(at: Option<&DateTime<Utc>>) -> String {
    at.map_or_else(|| MISSING.to_string(), datetime)
}

/// Options of a status filter dropdown: `(wire value, label, selected)`.
#[must_use]
pub fn status_options<'a, S>(all: &'a [S], selected: &str) -> Vec<(String, String, bool)>
where
    S: 'a + StatusLike,
{
    all.iter()
        .map(|s| (s.wire().to_string(), s.human().to_string(), s.wire() == selected))
        .collect()
}

/// Common surface of the status enums, for dropdowns.
pub trait StatusLike {
    fn wire(&self) -> &str;
    fn human(&self) -> &str;
}

macro_rules! status_like {
    ($($ty:ty),+) => {
        $(impl StatusLike for $ty {
            fn wire(&self) -> &str { self.as_str() }
            fn human(&self) -> &str { self.label() }
        })+
    };
}

status_like!(
    souk_core::OrderStatus,
    souk_core::PaymentCodeStatus,
    souk_core::CommissionStatus
);
