//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, path, status, latency)
//! 3. Request ID (`x-request-id`, recorded in the span)
//! 4. Security headers (stricter than the storefront)
//! 5. Session layer (tower-sessions, `SameSite=Strict`)
//! 6. Expired-session cleanup (clears credentials after a handler's backend `401`)
//!
//! Authentication is an extractor, [`RequireAdminAuth`], taken by every
//! console handler.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AdminAuthRejection, RequireAdminAuth, clear_current_admin, current_token,
    end_expired_session, set_current_admin,
};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
