//! In-process fake of the Souk backend for facade tests.
//!
//! Serves a small, stateful subset of the REST API on `127.0.0.1:0` and
//! records every request so tests can assert on what went over the wire.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use souk_api::{ApiClient, ApiToken};

pub const ADMIN_TOKEN: &str = "1|admin-token";
pub const PARTNER_TOKEN: &str = "2|partner-token";

/// A request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct FakeState {
    pub vendors: Vec<Value>,
    pub payments: Vec<Value>,
    pub requests: Vec<Recorded>,
}

pub type Shared = Arc<Mutex<FakeState>>;

pub struct FakeBackend {
    pub state: Shared,
    pub client: ApiClient,
}

impl FakeBackend {
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

pub fn admin_token() -> ApiToken {
    ApiToken::new(ADMIN_TOKEN.to_string())
}

pub fn partner_token() -> ApiToken {
    ApiToken::new(PARTNER_TOKEN.to_string())
}

fn vendor(id: i64, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "shop_name": name,
        "email": format!("{}@souk.test", name.to_lowercase().replace(' ', "-")),
        "status": status,
        "rejection_reason": null,
        "suspension_reason": null,
        "approved_by": null,
        "created_at": "2025-01-10T08:00:00.000000Z"
    })
}

/// Start the fake backend with three vendors and no payments.
pub async fn spawn() -> FakeBackend {
    let state: Shared = Arc::new(Mutex::new(FakeState {
        vendors: vec![
            vendor(1, "Chez Awa", "pending"),
            vendor(2, "Marché Dakar", "approved"),
            vendor(3, "Boutique Fatou", "suspended"),
        ],
        payments: Vec::new(),
        requests: Vec::new(),
    }));

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/admin/vendors", get(list_vendors))
        .route("/api/admin/vendors/stats", get(vendor_stats))
        .route("/api/admin/vendors/{id}", delete(delete_vendor))
        .route("/api/admin/vendors/{id}/{action}", post(vendor_action))
        .route("/api/admin/payments", get(list_payments))
        .route("/api/admin/payments/stats", get(payment_stats))
        .route("/api/partner/orders/{id}/payment-code", post(payment_code))
        .route("/api/partner/payment-codes/validate", post(validate_code))
        .route("/api/products", get(products))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(&format!("http://{addr}/api"), Duration::from_secs(5)).unwrap();
    FakeBackend { state, client }
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let recorded = Recorded {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(ToString::to_string),
        authorization: request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };
    state.lock().unwrap().requests.push(recorded);
    next.run(request).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"status": "error", "message": "Unauthenticated."})),
    )
        .into_response()
}

fn require(headers: &HeaderMap, token: &str) -> Result<(), Response> {
    if bearer(headers) == Some(token) {
        Ok(())
    } else {
        Err(unauthorized())
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "admin@souk.test" && body["password"] == "secret" {
        Json(json!({
            "status": "success",
            "data": {
                "token": ADMIN_TOKEN,
                "user": {"id": 1, "name": "Moussa", "email": "admin@souk.test", "role": "admin"}
            }
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "error", "message": "Identifiants invalides"})),
        )
            .into_response()
    }
}

async fn me(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(ADMIN_TOKEN) => Json(json!({
            "status": "success",
            "data": {"id": 1, "name": "Moussa", "email": "admin@souk.test", "role": "admin"}
        }))
        .into_response(),
        Some(PARTNER_TOKEN) => Json(json!({
            "status": "success",
            "data": {"id": 9, "name": "Rapide", "email": "rapide@souk.test", "role": "partner"}
        }))
        .into_response(),
        _ => unauthorized(),
    }
}

async fn list_vendors(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = require(&headers, ADMIN_TOKEN) {
        return resp;
    }
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: usize = params
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(15);
    let status = params.get("status");

    let state = state.lock().unwrap();
    let matching: Vec<&Value> = state
        .vendors
        .iter()
        .filter(|v| status.is_none_or(|s| v["status"] == s.as_str()))
        .collect();
    let total = matching.len();
    let last_page = total.div_ceil(per_page).max(1);
    let items: Vec<&Value> = matching
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Json(json!({
        "status": "success",
        "data": items,
        "meta": {"current_page": page, "last_page": last_page, "per_page": per_page, "total": total}
    }))
    .into_response()
}

async fn vendor_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = require(&headers, ADMIN_TOKEN) {
        return resp;
    }
    let state = state.lock().unwrap();
    let count = |s: &str| state.vendors.iter().filter(|v| v["status"] == s).count();
    Json(json!({
        "status": "success",
        "data": {
            "total": state.vendors.len(),
            "pending": count("pending"),
            "approved": count("approved"),
            "rejected": count("rejected"),
            "suspended": count("suspended"),
        }
    }))
    .into_response()
}

async fn vendor_action(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((id, action)): Path<(i64, String)>,
    body: Option<Json<Value>>,
) -> Response {
    if let Err(resp) = require(&headers, ADMIN_TOKEN) {
        return resp;
    }
    let reason = body.and_then(|Json(b)| b["reason"].as_str().map(ToString::to_string));
    let mut state = state.lock().unwrap();
    let Some(vendor) = state.vendors.iter_mut().find(|v| v["id"] == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "Vendeur introuvable"})),
        )
            .into_response();
    };

    let current = vendor["status"].as_str().unwrap_or_default().to_string();
    let next = match (current.as_str(), action.as_str()) {
        ("pending", "approve") | ("suspended", "reactivate") => "approved",
        ("pending", "reject") => "rejected",
        ("approved", "suspend") => "suspended",
        _ => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"status": "error", "message": format!("Action {action} impossible depuis {current}")})),
            )
                .into_response();
        }
    };

    vendor["status"] = json!(next);
    match action.as_str() {
        "reject" => vendor["rejection_reason"] = json!(reason),
        "suspend" => vendor["suspension_reason"] = json!(reason),
        "approve" => vendor["approved_by"] = json!("Moussa"),
        _ => {}
    }

    Json(json!({"status": "success", "message": format!("Vendeur mis à jour ({next})")}))
        .into_response()
}

async fn delete_vendor(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = require(&headers, ADMIN_TOKEN) {
        return resp;
    }
    state.lock().unwrap().vendors.retain(|v| v["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_payments(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = require(&headers, ADMIN_TOKEN) {
        return resp;
    }
    let state = state.lock().unwrap();
    let total = state.payments.len();
    Json(json!({
        "status": "success",
        "data": state.payments,
        "meta": {"current_page": 1, "last_page": 1, "per_page": 15, "total": total}
    }))
    .into_response()
}

async fn payment_stats(headers: HeaderMap) -> Response {
    if let Err(resp) = require(&headers, ADMIN_TOKEN) {
        return resp;
    }
    Json(json!({
        "status": "success",
        "data": {"total_count": 0, "total_amount": "0.00", "pending_count": 0, "approved_count": 0, "rejected_count": 0}
    }))
    .into_response()
}

async fn payment_code(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(resp) = require(&headers, PARTNER_TOKEN) {
        return resp;
    }
    Json(json!({
        "status": "success",
        "message": "Code généré",
        "data": {
            "id": 100 + id,
            "code": format!("PAY-{id:04}"),
            "order_id": id,
            "amount": "7500.00",
            "status": "active",
            "expires_at": "2999-01-01T00:00:00Z",
            "created_at": "2025-03-01T10:00:00Z"
        }
    }))
    .into_response()
}

async fn validate_code(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(resp) = require(&headers, PARTNER_TOKEN) {
        return resp;
    }
    if body["code"] == "PAY-OLD" {
        return Json(json!({"status": "error", "message": "Ce code a expiré"})).into_response();
    }
    if body["code"] == "PAY-0042" {
        Json(json!({
            "status": "success",
            "data": {
                "id": 142, "code": "PAY-0042", "order_id": 42, "status": "used",
                "expires_at": "2999-01-01T00:00:00Z"
            }
        }))
        .into_response()
    } else {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "status": "error",
                "message": "Code invalide",
                "errors": {"code": ["Ce code est inconnu ou expiré."]}
            })),
        )
            .into_response()
    }
}

/// Returns more items than `per_page` and an out-of-range page; `search=boom`
/// fails with a plain-text 500.
async fn products(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("search").is_some_and(|s| s == "boom") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    let per_page: u32 = params
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(15);
    let items: Vec<Value> = (1..=per_page + 2)
        .map(|i| json!({"id": i, "name": format!("Produit {i}"), "price": "1000.00", "stock": 3}))
        .collect();
    Json(json!({
        "status": "success",
        "data": items,
        "meta": {"current_page": 9, "last_page": 2, "per_page": per_page, "total": 30}
    }))
    .into_response()
}

