//! Role-gated area access.
//!
//! Each protected area is a marker type implementing [`Area`]. The web crates
//! resolve the session (token present? `/auth/me` accepted?) and feed the
//! result to [`decide`], then apply the returned [`GuardOutcome`]. Keeping the
//! decision pure means every branch is unit tested here, once, for all areas.

use crate::types::Role;

/// A protected area of the application.
pub trait Area: Send + Sync + 'static {
    /// Role a user must hold to enter.
    const ROLE: Role;
    /// Public route unauthenticated users are sent to.
    const ENTRY: &'static str;
    /// Human name of the area, used in log fields and notices.
    const LABEL: &'static str;

    /// Where a signed-in user holding `role` is sent when it is not [`Self::ROLE`].
    #[must_use]
    fn home_for(role: Role) -> &'static str {
        role.storefront_home()
    }
}

/// Vendor dashboard (`/vendor`).
#[derive(Debug, Clone, Copy)]
pub struct VendorArea;

impl Area for VendorArea {
    const ROLE: Role = Role::Vendor;
    const ENTRY: &'static str = "/auth/login";
    const LABEL: &'static str = "vendor";
}

/// Partner portal (`/partner`).
#[derive(Debug, Clone, Copy)]
pub struct PartnerArea;

impl Area for PartnerArea {
    const ROLE: Role = Role::Partner;
    const ENTRY: &'static str = "/auth/login";
    const LABEL: &'static str = "partner";
}

/// Customer account pages and checkout.
#[derive(Debug, Clone, Copy)]
pub struct ClientArea;

impl Area for ClientArea {
    const ROLE: Role = Role::Client;
    const ENTRY: &'static str = "/auth/login";
    const LABEL: &'static str = "client";
}

/// Back-office console.
#[derive(Debug, Clone, Copy)]
pub struct AdminArea;

impl Area for AdminArea {
    const ROLE: Role = Role::Admin;
    const ENTRY: &'static str = "/auth/login";
    const LABEL: &'static str = "admin";

    /// The console has no pages for other roles; send them back to the login
    /// screen with a notice, session intact.
    fn home_for(_role: Role) -> &'static str {
        "/auth/login?denied=1"
    }
}

/// Result of resolving the session against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionResolution {
    /// No token stored in the session.
    NoToken,
    /// A token was stored but `/auth/me` failed (network error or non-2xx).
    Rejected,
    /// The backend accepted the token and reported this role.
    Resolved(Role),
}

/// What the guard does with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the protected content.
    Allow,
    /// Redirect to the area's entry route.
    RedirectToEntry,
    /// Clear stored credentials, then redirect to the entry route.
    ClearAndRedirect,
    /// Valid session with the wrong role: redirect here, session untouched.
    RedirectAway(&'static str),
}

/// Decide access to area `A`.
#[must_use]
pub fn decide<A: Area>(resolution: SessionResolution) -> GuardOutcome {
    match resolution {
        SessionResolution::NoToken => GuardOutcome::RedirectToEntry,
        SessionResolution::Rejected => GuardOutcome::ClearAndRedirect,
        SessionResolution::Resolved(role) if role == A::ROLE => GuardOutcome::Allow,
        SessionResolution::Resolved(role) => GuardOutcome::RedirectAway(A::home_for(role)),
    }
}

/// Accept a post-login redirect target only when it is a local path.
///
/// Rejects absolute URLs, protocol-relative (`//host`) and backslash tricks
/// (`/\host`) that browsers treat as off-site.
#[must_use]
pub fn safe_next(next: &str) -> Option<&str> {
    let next = next.trim();
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.contains("://")
        && !next.chars().any(char::is_control);
    local.then_some(next)
}

/// Entry route for area `A`, remembering where the user was going.
#[must_use]
pub fn entry_with_next<A: Area>(original: &str) -> String {
    match safe_next(original) {
        Some(path) if path != A::ENTRY => {
            format!("{}?next={}", A::ENTRY, urlencoding::encode(path))
        }
        _ => A::ENTRY.to_string(),
    }
}
