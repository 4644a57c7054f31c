//! Souk storefront library.
//!
//! Shop, vendor dashboard and partner portal in front of the Souk REST API.
//! The binary wires a `PostgreSQL` session store into [`app`]; tests use a
//! `MemoryStore`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
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

/// Build the storefront router over a session `store`.
///
/// Layers, outermost first: Sentry, trace span, request ID, security
/// headers, session, expired-session cleanup, edge check.
pub fn app<Store>(state: AppState, store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(store, state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .layer(from_fn(middleware::edge_middleware))
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

/// Liveness probe. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness probe: 503 when the session database is unreachable.
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
    use souk_core::{Role, UserId};
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};
    use url::Url;

    use super::*;
    use crate::config::test_config;
    use crate::models::{SessionUser, session_keys};

    fn router() -> Router {
        let state = AppState::new(test_config(), None).unwrap();
        app(state, MemoryStore::default())
    }

    /// Stand-in backend on a local port. `/auth/me` answers with a `role`
    /// account when given; every other call is refused with `401`.
    async fn spawn_backend(role: Option<&'static str>) -> Url {
        let unauthorized = || async {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"status": "error", "message": "Jeton expiré"})),
            )
        };
        let backend = match role {
            Some(role) => Router::new().route(
                "/api/auth/me",
                axum::routing::get(move || async move {
                    Json(serde_json::json!({
                        "status": "success",
                        "data": {"id": 7, "name": "Awa", "email": "awa@example.com", "role": role}
                    }))
                }),
            ),
            None => Router::new(),
        }
        .fallback(unauthorized);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, backend).await.unwrap() });
        Url::parse(&format!("http://{addr}/api")).unwrap()
    }

    /// Storefront against `backend`, plus a side router on the same store that
    /// signs a partner in (`/seed`) and reports the stored token (`/peek`).
    fn signed_in_router(backend: Url) -> (Router, Router) {
        let store = MemoryStore::default();
        let mut config = test_config();
        config.api.base_url = backend;

        let side = Router::new()
            .route(
                "/seed",
                axum::routing::get(|session: Session| async move {
                    let user = SessionUser {
                        id: UserId::from(7),
                        name: "Awa".to_string(),
                        email: "awa@example.com".to_string(),
                        role: Role::Partner,
                    };
                    session
                        .insert(session_keys::API_TOKEN, ApiToken::new("tok-7".to_string()))
                        .await
                        .unwrap();
                    session.insert(session_keys::CURRENT_USER, user).await.unwrap();
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
            .header("x-forwarded-for", "203.0.113.7")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.7")
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
    async fn test_readiness_without_database() {
        let response = router().oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_areas_redirect_without_token() {
        for path in ["/vendor", "/vendor/products", "/partner", "/account/orders", "/checkout"] {
            let response = router().oneshot(get(path)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert_eq!(response.headers()[header::LOCATION], "/", "{path}");
        }
    }

    #[tokio::test]
    async fn test_protected_post_redirects_without_token() {
        let request = Request::builder()
            .method("POST")
            .uri("/partner/payment-codes/validate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("code=PAY-1234"))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_empty_cart_renders_placeholder() {
        let response = router().oneshot(get("/cart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Votre panier est vide"));
    }

    #[tokio::test]
    async fn test_login_page_carries_safe_next_only() {
        let response = router()
            .oneshot(get("/auth/login?next=https://evil.example/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));

        let body = body_text(response).await;
        assert!(body.contains("Connexion"));
        assert!(!body.contains("evil.example"));
    }

    #[tokio::test]
    async fn test_cart_count_fragment() {
        let response = router().oneshot(get("/cart/count")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"id="cart-count""#));
    }

    #[tokio::test]
    async fn test_rejected_token_clears_session_and_keeps_next() {
        let (app, side) = signed_in_router(spawn_backend(None).await);
        let cookie = seed(&side).await;
        assert_eq!(
            body_text(side.clone().oneshot(get_with_cookie("/peek", &cookie)).await.unwrap()).await,
            "tok-7"
        );

        let response = app
            .oneshot(get_with_cookie("/vendor/products?page=2", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login?next=%2Fvendor%2Fproducts%3Fpage%3D2"
        );
        let body = body_text(response).await;
        assert!(!body.contains("<table"));
        assert!(!body.contains("Produits"));

        let peek = side.oneshot(get_with_cookie("/peek", &cookie)).await.unwrap();
        assert_eq!(body_text(peek).await, "");
    }

    #[tokio::test]
    async fn test_backend_401_inside_handler_ends_session() {
        let (app, side) = signed_in_router(spawn_backend(Some("partner")).await);
        let cookie = seed(&side).await;

        let response = app
            .oneshot(get_with_cookie("/partner/commissions", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
        assert!(!body_text(response).await.contains("Commissions"));

        let peek = side.oneshot(get_with_cookie("/peek", &cookie)).await.unwrap();
        assert_eq!(body_text(peek).await, "");
    }
}
