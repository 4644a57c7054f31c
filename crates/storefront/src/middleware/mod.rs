//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, path, status, latency)
//! 3. Request ID (`x-request-id`, recorded in the span)
//! 4. Security headers
//! 5. Session layer (tower-sessions)
//! 6. Expired-session cleanup (clears credentials after a handler's backend `401`)
//! 7. Edge check (token presence under the protected prefixes)
//! 8. Rate limiting on the auth form submissions (governor)
//!
//! Role checks are not middleware: handlers take a [`RequireArea`] extractor.

pub mod auth;
pub mod edge;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AreaRejection, CurrentUser, RequireArea, clear_current_session, current_token,
    end_expired_session, set_current_session,
};
pub use edge::edge_middleware;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
