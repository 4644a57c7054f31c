//! Generation-tracked state for a paginated list.
//!
//! Every fetch is started with [`ListView::request`], which hands out a
//! [`FetchTicket`]. Only the result carrying the most recent ticket is
//! committed; anything older is discarded, so out-of-order responses can never
//! overwrite the rows of a newer request.
//!
//! A view lives for one HTTP request. Requests for the same list that overlap
//! share their generation through [`FetchGenerations`], keyed by session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

use crate::pagination::{ListQuery, PageMeta, Paginated};

/// Proof that a fetch was requested, tagged with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: ListQuery,
}

impl FetchTicket {
    /// The query this fetch was issued for.
    #[must_use]
    pub const fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Generation number (monotonically increasing per view).
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a list page should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// A fetch is in flight and nothing has been committed yet.
    Loading,
    /// The last committed fetch returned no items.
    Empty,
    /// The last committed fetch returned items.
    Rows,
    /// The last fetch failed and there are no rows to keep showing.
    Failed,
}

/// State of one paginated list: the committed page, the last error, and the
/// generation of the latest request.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    query: ListQuery,
    generation: u64,
    committed: u64,
    page: Option<Paginated<T>>,
    error: Option<String>,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self::new(ListQuery::default())
    }
}

impl<T> ListView<T> {
    #[must_use]
    pub const fn new(query: ListQuery) -> Self {
        Self {
            query,
            generation: 0,
            committed: 0,
            page: None,
            error: None,
        }
    }

    /// Start a fetch for `query`, superseding any fetch still in flight.
    pub fn request(&mut self, query: ListQuery) -> FetchTicket {
        self.generation += 1;
        self.query = query.clone();
        FetchTicket {
            generation: self.generation,
            query,
        }
    }

    /// Raise the latest generation to `latest` when a fetch was started elsewhere.
    ///
    /// Tickets older than `latest` can no longer be committed.
    pub fn observe(&mut self, latest: u64) {
        if latest > self.generation {
            self.generation = latest;
        }
    }

    /// Start a fetch for the current query again (after a mutation).
    pub fn reload(&mut self) -> FetchTicket {
        let query = self.query.clone();
        self.request(query)
    }

    /// Apply the result of a fetch.
    ///
    /// Returns `false` and leaves the view untouched when `ticket` is not the
    /// latest one. A failure records its message but keeps the rows of the
    /// previous successful fetch.
    pub fn commit<E: std::fmt::Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Paginated<T>, E>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.committed = ticket.generation;
        match result {
            Ok(page) => {
                if page.meta.current_page != self.query.page {
                    self.query.page = page.meta.current_page;
                }
                self.page = Some(page);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        true
    }

    /// Current rendering state.
    #[must_use]
    pub fn state(&self) -> ListState {
        match (&self.page, &self.error) {
            (Some(page), _) if !page.items.is_empty() => ListState::Rows,
            (_, Some(_)) => ListState::Failed,
            (Some(_), None) => ListState::Empty,
            (None, None) if self.committed < self.generation => ListState::Loading,
            (None, None) => ListState::Empty,
        }
    }

    /// Whether a requested fetch has not been committed yet.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.committed < self.generation
    }

    /// Query of the latest request.
    #[must_use]
    pub const fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Rows of the last successful fetch.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        self.page.as_ref().map_or(&[], |p| p.items.as_slice())
    }

    /// Bounds of the last successful fetch.
    #[must_use]
    pub fn meta(&self) -> Option<&PageMeta> {
        self.page.as_ref().map(|p| &p.meta)
    }

    /// Message of the last failed fetch, cleared by the next success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Take the committed page out of the view.
    #[must_use]
    pub fn into_page(self) -> Option<Paginated<T>> {
        self.page
    }
}

/// Latest fetch generation of every `(session, list)` pair.
///
/// Entries idle for longer than the session lifetime are evicted.
#[derive(Clone)]
pub struct FetchGenerations {
    latest: Cache<String, Arc<AtomicU64>>,
}

impl std::fmt::Debug for FetchGenerations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchGenerations")
            .field("entries", &self.latest.entry_count())
            .finish()
    }
}

impl Default for FetchGenerations {
    fn default() -> Self {
        Self::new(10_000, Duration::from_secs(60 * 60))
    }
}

impl FetchGenerations {
    #[must_use]
    pub fn new(max_entries: u64, idle: Duration) -> Self {
        Self {
            latest: Cache::builder()
                .max_capacity(max_entries)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Register a new fetch of `list` for `owner` (a session ID).
    pub async fn begin(&self, owner: &str, list: &str) -> FetchTurn {
        let counter = self
            .latest
            .get_with(format!("{owner}:{list}"), async { Arc::new(AtomicU64::new(0)) })
            .await;
        let generation = counter.fetch_add(1, Ordering::AcqRel) + 1;
        FetchTurn {
            counter,
            generation,
        }
    }
}

/// One registered fetch; knows whether a newer one has started since.
#[derive(Debug, Clone)]
pub struct FetchTurn {
    counter: Arc<AtomicU64>,
    generation: u64,
}

impl FetchTurn {
    /// Generation handed to this fetch.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the newest fetch of the same list.
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.latest() == self.generation
    }
}
