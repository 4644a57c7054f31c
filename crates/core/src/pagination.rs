//! Pagination primitives shared by every list page.
//!
//! - [`PageMeta`] / [`Paginated`] - one page of server results and its bounds
//! - [`ListQuery`] - page number, page size and active filters of a list
//! - [`PageLinks`] - prev/next/window links for rendering pagination controls

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default page size when the request does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Largest page size a list may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Number of numbered page links shown around the current page.
const LINK_WINDOW: u32 = 2;

/// Bounds of one page of results, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl PageMeta {
    /// Meta for a single, complete page of `len` items.
    #[must_use]
    pub fn single(len: usize) -> Self {
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        Self {
            current_page: 1,
            last_page: 1,
            per_page: len.max(1),
            total: u64::from(len),
        }
    }

    /// Clamp a requested page into `[1, last_page]`.
    #[must_use]
    pub fn clamp_page(&self, page: u32) -> u32 {
        page.clamp(1, self.last_page.max(1))
    }

    /// Whether a page after the current one exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    /// Whether a page before the current one exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// One page of items plus its bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    /// Build a page, enforcing the envelope invariants.
    ///
    /// `last_page` is raised to at least 1, `per_page` to at least 1,
    /// `current_page` is clamped into `[1, last_page]` and surplus items beyond
    /// `per_page` are dropped. The returned flag is `true` when the server
    /// response had to be corrected.
    #[must_use]
    pub fn normalized(mut items: Vec<T>, meta: PageMeta) -> (Self, bool) {
        let mut fixed = meta;
        fixed.last_page = fixed.last_page.max(1);
        fixed.per_page = fixed.per_page.max(1);
        fixed.current_page = fixed.current_page.clamp(1, fixed.last_page);

        let per_page = usize::try_from(fixed.per_page).unwrap_or(usize::MAX);
        let truncated = items.len() > per_page;
        items.truncate(per_page);

        let corrected = truncated || fixed != meta;
        (Self { items, meta: fixed }, corrected)
    }

    /// A complete result set delivered without pagination metadata.
    #[must_use]
    pub fn single_page(items: Vec<T>) -> Self {
        let meta = PageMeta::single(items.len());
        Self { items, meta }
    }

    /// An empty first page.
    #[must_use]
    pub fn empty(per_page: u32) -> Self {
        Self {
            items: Vec::new(),
            meta: PageMeta {
                current_page: 1,
                last_page: 1,
                per_page: per_page.max(1),
                total: 0,
            },
        }
    }

    /// Whether the server reported no matching items at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meta.total == 0 && self.items.is_empty()
    }

    /// Map the items, keeping the bounds.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Page number, page size and filters of a list request.
///
/// Filters with blank values are dropped on construction so `?status=` and no
/// status filter at all compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    /// Build a query from raw request parameters.
    ///
    /// `page` is raised to at least 1 and `per_page` is bounded to
    /// `[1, MAX_PER_PAGE]`.
    #[must_use]
    pub fn new<I, K, V>(page: Option<u32>, per_page: Option<u32>, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let filters = filters
            .into_iter()
            .filter_map(|(k, v)| {
                let v = v?;
                let v = v.as_ref().trim();
                (!v.is_empty()).then(|| (k.into(), v.to_string()))
            })
            .collect();

        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
            filters,
        }
    }

    /// Value of an active filter.
    #[must_use]
    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Apply new filters; the page resets to 1 whenever they differ.
    #[must_use]
    pub fn refine(mut self, filters: BTreeMap<String, String>) -> Self {
        if filters != self.filters {
            self.filters = filters;
            self.page = 1;
        }
        self
    }

    /// Reconcile a freshly submitted query with the last one rendered.
    ///
    /// If the filters changed since `previous`, the page the form carried is
    /// stale (it indexed a different result set) and is reset to 1. A page
    /// size change also resets the page.
    #[must_use]
    pub fn reconcile(previous: Option<&Self>, requested: Self) -> Self {
        match previous {
            Some(prev) if prev.filters != requested.filters || prev.per_page != requested.per_page => {
                Self {
                    page: 1,
                    ..requested
                }
            }
            _ => requested,
        }
    }

    /// Move to `page`, clamped into the bounds of the last known result.
    #[must_use]
    pub fn go_to(mut self, page: u32, meta: &PageMeta) -> Self {
        self.page = meta.clamp_page(page);
        self
    }

    /// Query parameters sent to the backend.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ];
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }

    /// URL query string for `page`, preserving filters and page size.
    #[must_use]
    pub fn query_string(&self, page: u32) -> String {
        let mut parts = vec![format!("page={page}")];
        if self.per_page != DEFAULT_PER_PAGE {
            parts.push(format!("per_page={}", self.per_page));
        }
        parts.extend(self.filters.iter().map(|(k, v)| {
            format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))
        }));
        parts.join("&")
    }

    /// URL query string of the current page (used to return after an action).
    #[must_use]
    pub fn current_query_string(&self) -> String {
        self.query_string(self.page)
    }
}

/// A numbered pagination link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// Rendered pagination controls for a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
    pub pages: Vec<PageLink>,
    /// 1-based index of the first item shown (0 when empty).
    pub first_item: u64,
    /// 1-based index of the last item shown (0 when empty).
    pub last_item: u64,
    pub total: u64,
}

impl PageLinks {
    /// Build links for `meta`, rooted at `base_path`, preserving `query`'s filters.
    ///
    /// Every link targets a page inside `[1, last_page]`.
    #[must_use]
    pub fn build(base_path: &str, query: &ListQuery, meta: &PageMeta, shown: usize) -> Self {
        let href = |page: u32| format!("{base_path}?{}", query.query_string(meta.clamp_page(page)));

        let start = meta.current_page.saturating_sub(LINK_WINDOW).max(1);
        let end = meta
            .current_page
            .saturating_add(LINK_WINDOW)
            .min(meta.last_page.max(1));

        let pages = (start..=end)
            .map(|number| PageLink {
                number,
                href: href(number),
                current: number == meta.current_page,
            })
            .collect();

        let shown = u64::try_from(shown).unwrap_or(u64::MAX);
        let offset = u64::from(meta.current_page.saturating_sub(1)) * u64::from(meta.per_page);
        let (first_item, last_item) = if shown == 0 {
            (0, 0)
        } else {
            (offset + 1, offset + shown)
        };

        Self {
            prev: meta.has_prev().then(|| href(meta.current_page - 1)),
            next: meta.has_next().then(|| href(meta.current_page + 1)),
            pages,
            first_item,
            last_item,
            total: meta.total,
        }
    }

    /// Whether more than one page exists.
    #[must_use]
    pub fn is_multi_page(&self) -> bool {
        self.pages.len() > 1 || self.prev.is_some() || self.next.is_some()
    }
}
