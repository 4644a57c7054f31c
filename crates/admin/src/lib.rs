//! Souk admin console library.
//!
//! Vendor approval and payment oversight in front of the Souk REST API.
//! Every page requires an account with the `admin` role; the console keeps
//! its own cookie and session table, separate from the storefront.
//!
//! # Security
//!
//! Serve over TLS (`ADMIN_TLS_CERT` / `ADMIN_TLS_KEY`) or behind a
//! terminating proxy with an `https` base URL, so the session cookie is
//! marked `Secure`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod views;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, middleware::from_fn, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::state::AppState;

/// Build the admin router over a session `store`.
///
/// Layers, outermost first: Sentry, trace span, request ID, security
/// headers, session, expired-session cleanup.
pub fn app<Store>(state: AppState, store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(store, state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/admin/static"))
        .layer(from_fn(middleware::end_expired_session))
        .layer(session_layer)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the session database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::Json;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use souk_api::ApiToken;
    use souk_core::UserId;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};
    use url::Url;

    use super::*;
    use crate::config::test_config;
    use crate::models::{CurrentAdmin, session_keys};

    fn router() -> Router {
        let state = AppState::new(test_config(), None).unwrap();
        app(state, MemoryStore::default())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// Backend on a local port: `/auth/me` knows an admin when `admin_ok`,
    /// everything else answers `401`.
    async fn spawn_backend(admin_ok: bool) -> Url {
        let unauthorized = || async {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"status": "error", "message": "Jeton expiré"})),
            )
        };
        let mut backend = Router::new();
        if admin_ok {
            backend = backend.route(
                "/api/auth/me",
                axum::routing::get(|| async {
                    Json(serde_json::json!({
                        "status": "success",
                        "data": {"id": 1, "name": "Ines", "email": "ines@souk.test", "role": "admin"}
                    }))
                }),
            );
        }
        let backend = backend.fallback(unauthorized);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, backend).await.unwrap() });
        Url::parse(&format!("http://{addr}/api")).unwrap()
    }

    /// Console against `backend`, and a router on the same store that signs
    /// an admin in (`/seed`) and echoes the stored token (`/peek`).
    fn signed_in_router(backend: Url) -> (Router, Router) {
        let store = MemoryStore::default();
        let mut config = test_config();
        config.api_url = backend;

        let side = Router::new()
            .route(
                "/seed",
                axum::routing::get(|session: Session| async move {
                    let admin = CurrentAdmin {
                        id: UserId::from(1),
                        email: "ines@souk.test".to_string(),
                        name: "Ines".to_string(),
                    };
                    session
                        .insert(session_keys::API_TOKEN, ApiToken::new("tok-1".to_string()))
                        .await
                        .unwrap();
                    session.insert(session_keys::CURRENT_ADMIN, admin).await.unwrap();
                }),
            )
            .route(
                "/peek",
                axum::routing::get(|session: Session| async move {
                    middleware::current_token(&session)
                        .await
                        .map(|token| token.expose().to_string())
                        .unwrap_or_default()
                }),
            )
            .layer(middleware::create_session_layer(store.clone(), &config));

        let state = AppState::new(config, None).unwrap();
        (app(state, store), side)
    }

    async fn seed(side: &Router) -> String {
        let response = side.clone().oneshot(get("/seed")).await.unwrap();
        response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_console_redirects_to_login_with_next() {
        let response = router().oneshot(get("/vendors")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login?next=%2Fvendors"
        );

        let response = router().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_actions_require_login() {
        let request = Request::builder()
            .method("POST")
            .uri("/vendors/3/reject")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("reason=Fraude"))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(
            response.headers()[header::LOCATION]
                .to_str()
                .unwrap()
                .starts_with("/auth/login")
        );
    }

    #[tokio::test]
    async fn test_login_page_renders_with_headers() {
        let response = router().oneshot(get("/auth/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(body_text(response).await.contains("Connexion"));
    }

    #[tokio::test]
    async fn test_denied_notice() {
        let response = router()
            .oneshot(get("/auth/login?denied=1"))
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.contains("console d"));
        assert!(!body.contains("Déconnexion"));
    }

    #[tokio::test]
    async fn test_rejected_token_clears_session_and_keeps_next() {
        let (app, side) = signed_in_router(spawn_backend(false).await);
        let cookie = seed(&side).await;

        let response = app
            .oneshot(get_with_cookie("/vendors?status=pending", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login?next=%2Fvendors%3Fstatus%3Dpending"
        );
        let body = body_text(response).await;
        assert!(!body.contains("<table"));
        assert!(!body.contains("Vendeurs"));

        let peek = side.oneshot(get_with_cookie("/peek", &cookie)).await.unwrap();
        assert_eq!(body_text(peek).await, "");
    }

    #[tokio::test]
    async fn test_backend_401_inside_handler_ends_session() {
        let (app, side) = signed_in_router(spawn_backend(true).await);
        let cookie = seed(&side).await;

        let response = app
            .oneshot(get_with_cookie("/payments", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");

        let peek = side.oneshot(get_with_cookie("/peek", &cookie)).await.unwrap();
        assert_eq!(body_text(peek).await, "");
    }
}
