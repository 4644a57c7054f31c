//! Edge check for token presence.
//!
//! A cheap first pass in front of the protected prefixes: without a token in
//! the session there is nothing to resolve, so the visitor goes straight back
//! to the shop. Role checks happen later, in [`super::auth::RequireArea`].

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::auth::current_token;

/// Path prefixes that need a session token.
pub const PROTECTED_PREFIXES: &[&str] = &["/vendor", "/partner", "/account", "/checkout"];

/// Whether `path` lies under one of [`PROTECTED_PREFIXES`].
///
/// Matches whole segments: `/vendor/orders` is protected, `/vendors` is not.
#[must_use]
pub fn requires_token(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Redirect token-less requests for protected prefixes to `/`.
pub async fn edge_middleware(session: Session, request: Request, next: Next) -> Response {
    if requires_token(request.uri().path()) && current_token(&session).await.is_none() {
        tracing::debug!(path = %request.uri().path(), "No session token at edge");
        return Redirect::to("/").into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_prefixes() {
        assert!(requires_token("/vendor"));
        assert!(requires_token("/vendor/products/3/edit"));
        assert!(requires_token("/partner/commissions"));
        assert!(requires_token("/account/orders"));
        assert!(requires_token("/checkout"));
    }

    #[test]
    fn test_public_paths() {
        assert!(!requires_token("/"));
        assert!(!requires_token("/products/12"));
        assert!(!requires_token("/vendors"));
        assert!(!requires_token("/partnership"));
        assert!(!requires_token("/auth/login"));
    }
}
