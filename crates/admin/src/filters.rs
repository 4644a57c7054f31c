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

/// Badge modifier for a status wire value.
///
/// Usage in templates: `<span class="badge {{ row.status|badge }}">`
#[askama::filter_fn]
pub fn badge(status: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(badge_class(&status.to_string()))
}

fn badge_class(status: &str) -> &'static str {
    match status {
        "approved" | "active" => "badge-success",
        "pending" => "badge-warning",
        "rejected" | "suspended" | "expired" | "cancelled" => "badge-danger",
        "used" => "badge-info",
        _ => "badge-neutral",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_classes() {
        assert_eq!(badge_class("approved"), "badge-success");
        assert_eq!(badge_class("pending"), "badge-warning");
        assert_eq!(badge_class("rejected"), "badge-danger");
        assert_eq!(badge_class("used"), "badge-info");
        assert_eq!(badge_class("refunded"), "badge-neutral");
    }
}
