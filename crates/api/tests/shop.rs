//! Auth and catalog facades against the fake backend.

#![allow(clippy::unwrap_used)]

mod common;

use souk_api::ApiError;
use souk_core::{Email, ListQuery, Role};

#[tokio::test]
async fn test_login_then_me() {
    let backend = common::spawn().await;
    let auth = backend.client.auth();

    let email = Email::parse("admin@souk.test").unwrap();
    let session = auth.login(&email, "secret").await.unwrap();
    assert_eq!(session.user.role, Role::Admin);

    let user = auth.me(&session.token).await.unwrap();
    assert_eq!(user.name, "Moussa");
}

#[tokio::test]
async fn test_bad_credentials_use_server_message() {
    let backend = common::spawn().await;
    let email = Email::parse("admin@souk.test").unwrap();

    let err = backend
        .client
        .auth()
        .login(&email, "wrong")
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Identifiants invalides");

    let recorded = backend.requests_to("/api/auth/login");
    assert!(recorded.iter().all(|r| r.authorization.is_none()));
}

#[tokio::test]
async fn test_oversized_page_is_normalised() {
    let backend = common::spawn().await;
    let query = ListQuery::new(Some(9), Some(5), [("search", Some("bissap"))]);

    let page = backend.client.shop(None).products(&query).await.unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.meta.current_page, 2);
    assert_eq!(page.meta.last_page, 2);
}

#[tokio::test]
async fn test_plain_text_error_gets_generic_message() {
    let backend = common::spawn().await;
    let query = ListQuery::new(Some(1), None, [("search", Some("boom"))]);

    let err = backend.client.shop(None).products(&query).await.unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 500, .. }));
    assert_eq!(err.to_string(), "Request failed with status 500");
}

#[tokio::test]
async fn test_orders_require_token() {
    let backend = common::spawn().await;

    let err = backend
        .client
        .shop(None)
        .my_orders(&ListQuery::default())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(backend.requests_to("/api/client/orders").is_empty());
}
