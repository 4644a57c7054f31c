//! View models shared by the console pages.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use souk_api::ApiError;
use souk_api::types::MISSING;
use souk_core::{
    FetchGenerations, FetchTicket, ListQuery, ListState, ListView, PageLinks, Paginated,
};
use tower_sessions::Session;

use crate::models::session::{previous_query, remember_query, take_flash};
use crate::models::{CurrentAdmin, Flash, session_keys};

/// Data every full page needs: signed-in admin and flash.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub admin: Option<CurrentAdmin>,
    pub flash: Option<Flash>,
}

impl Layout {
    /// Build the layout, consuming the pending flash message.
    pub async fn load(session: &Session) -> Self {
        let admin = session
            .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten();
        Self {
            admin,
            flash: take_flash(session).await,
        }
    }

    /// Same as [`Layout::load`] with the admin already resolved.
    pub async fn for_admin(session: &Session, admin: &CurrentAdmin) -> Self {
        Self {
            admin: Some(admin.clone()),
            flash: take_flash(session).await,
        }
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

    /// Nothing matched: the empty-state message replaces the table.
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
}

/// Aggregates shown beside a list or on the dashboard.
///
/// A failure only blanks this panel; the rest of the page still renders.
#[derive(Debug, Clone)]
pub struct Panel<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Panel<T> {
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] so the caller can send the admin
    /// back to the login page.
    pub fn load(result: Result<T, ApiError>, what: &'static str) -> Result<Self, ApiError> {
        match result {
            Ok(data) => Ok(Self {
                data: Some(data),
                error: None,
            }),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                tracing::error!(panel = what, error = %e, "Stats fetch failed");
                Ok(Self {
                    data: None,
                    error: Some(e.user_message()),
                })
            }
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Panel<U> {
        Panel {
            data: self.data.map(f),
            error: self.error,
        }
    }
}

/// Raw query parameters of a list page.
pub type ListParams = HashMap<String, String>;

/// Requested [`ListQuery`] from raw parameters, keeping only `filter_keys`.
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

/// Fetch one page of `list` through a [`ListView`].
///
/// A filter change since the last render resets the page to 1. Overlapping
/// fetches of the same list in one session share a generation counter; only
/// the newest may commit, and only a committed query is remembered so
/// actions can return to it.
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
    previous_query(session, list).await.map_or_else(
        || base.to_string(),
        |query| format!("{base}?{}", query.current_query_string()),
    )
}

/// `12/03/2025 14:05`
#[must_use]
pub fn datetime(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

#[must_use]
pub fn opt_datetime(at: Option<&DateTime<Utc>>) -> String {
    at.map_or_else(|| MISSING.to_string(), datetime)
}

/// Blank values read as the missing placeholder.
#[must_use]
pub fn or_missing(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING)
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use souk_core::PageMeta;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn lists() -> FetchGenerations {
        FetchGenerations::default()
    }

    #[tokio::test]
    async fn test_zero_total_is_empty_state() {
        let session = session();
        let view: ListView<u32> =
            load_list(&session, &lists(), "payments", ListQuery::default(), |ticket| async move {
                (ticket, Ok(Paginated::empty(15)))
            })
            .await
            .unwrap();

        let page = ListPage::from_view(view, "/payments", |n| n);
        assert!(page.is_empty());
        assert!(!page.is_failed());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_message() {
        let session = session();
        let view: ListView<u32> =
            load_list(&session, &lists(), "vendors", ListQuery::default(), |ticket| async move {
                (ticket, Err(ApiError::NotFound("Route introuvable".to_string())))
            })
            .await
            .unwrap();

        let page = ListPage::from_view(view, "/vendors", |n| n);
        assert!(page.is_failed());
        assert_eq!(page.error.as_deref(), Some("Route introuvable"));
    }

    #[tokio::test]
    async fn test_filter_change_resets_page_and_is_remembered() {
        let session = session();
        let first = ListQuery::new(Some(4), None, [("status", Some("pending"))]);
        remember_query(&session, "vendors", &first).await.unwrap();

        let requested = ListQuery::new(Some(4), None, [("status", Some("suspended"))]);
        let view = load_list(&session, &lists(), "vendors", requested, |ticket| async move {
            assert_eq!(ticket.query().page, 1);
            let meta = PageMeta {
                current_page: 1,
                last_page: 1,
                per_page: 15,
                total: 1,
            };
            (ticket, Ok(Paginated { items: vec![7_u32], meta }))
        })
        .await
        .unwrap();

        assert_eq!(view.query().page, 1);
        assert_eq!(
            list_return(&session, "vendors", "/vendors").await,
            "/vendors?page=1&status=suspended"
        );
    }

    #[tokio::test]
    async fn test_overlapping_fetches_keep_newest_query() {
        let session = session();
        session.insert("seen", true).await.unwrap();
        session.save().await.unwrap();
        let lists = lists();

        let older = ListQuery::new(None, None, [("status", Some("pending"))]);
        let newer = ListQuery::new(None, None, [("status", Some("approved"))]);
        let (older, newer) = tokio::join!(
            load_list(&session, &lists, "vendors", older, |ticket| async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                (ticket, Ok(Paginated::single_page(vec![1_u32])))
            }),
            load_list(&session, &lists, "vendors", newer, |ticket| async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                (ticket, Ok(Paginated::single_page(vec![2_u32])))
            }),
        );

        let older = ListPage::from_view(older.unwrap(), "/vendors", |n| n);
        let newer = ListPage::from_view(newer.unwrap(), "/vendors", |n| n);
        assert!(older.is_loading());
        assert!(older.rows.is_empty());
        assert_eq!(newer.rows, vec![2]);

        let remembered = previous_query(&session, "vendors").await.unwrap();
        assert_eq!(remembered.filter("status"), Some("approved"));
    }

    #[tokio::test]
    async fn test_rejected_token_is_not_a_list_error() {
        let session = session();
        let result: crate::error::Result<ListView<u32>> =
            load_list(&session, &lists(), "vendors", ListQuery::default(), |ticket| async move {
                (ticket, Err(ApiError::Unauthorized("expired".to_string())))
            })
            .await;

        assert!(matches!(
            result,
            Err(crate::error::AppError::Api(ApiError::Unauthorized(_)))
        ));
        assert_eq!(previous_query(&session, "vendors").await, None);
    }

    #[test]
    fn test_list_query_drops_unknown_keys() {
        let params: ListParams = [("status", "approved"), ("role", "admin"), ("page", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let query = list_query(&params, &["status", "search"]);
        assert_eq!(query.page, 2);
        assert_eq!(query.filter("status"), Some("approved"));
        assert_eq!(query.filter("role"), None);
    }

    #[test]
    fn test_panel_isolates_failure() {
        let panel: Panel<u32> = Panel::load(
            Err(ApiError::Api {
                status: 503,
                message: "Service indisponible".to_string(),
            }),
            "vendor_stats",
        )
        .unwrap();
        assert!(panel.data.is_none());
        assert_eq!(panel.error.as_deref(), Some("Service indisponible"));

        let expired: Result<Panel<u32>, _> =
            Panel::load(Err(ApiError::Unauthorized("expired".to_string())), "vendor_stats");
        assert!(expired.is_err());

        let ok = Panel::load(Ok(3_u32), "vendor_stats").unwrap().map(|n| n * 2);
        assert_eq!(ok.data, Some(6));
    }

    #[test]
    fn test_or_missing() {
        assert_eq!(or_missing(Some("  ")), MISSING);
        assert_eq!(or_missing(Some("Dakar")), "Dakar");
        assert_eq!(or_missing(None), MISSING);
    }
}
