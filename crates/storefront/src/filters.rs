//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Fingerprint of the stylesheet, computed by the build script.
///
/// Usage in templates: `/static/css/derived/main.{{ ""|css_hash }}.css`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// CSS class of the badge for a status wire value.
///
/// Unknown statuses get the neutral badge.
///
/// Usage in templates: `<span class="badge {{ row.status|badge }}">`
#[askama::filter_fn]
pub fn badge(status: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(badge_class(&status.to_string()))
}

pub(crate) fn badge_class(status: &str) -> &'static str {
    match status {
        "approved" | "active" | "paid" | "delivered" | "ready" => "badge-success",
        "pending" | "preparing" | "confirmed" => "badge-warning",
        "rejected" | "cancelled" | "suspended" | "expired" => "badge-danger",
        "used" | "picked_up" => "badge-info",
        _ => "badge-neutral",
    }
}
