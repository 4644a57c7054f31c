//! Partner facade against the fake backend.

#![allow(clippy::unwrap_used)]

mod common;

use chrono::Utc;
use souk_api::ApiError;
use souk_api::types::CodeValidation;
use souk_core::{OrderId, PaymentCodeStatus};

#[tokio::test]
async fn test_generated_code_belongs_to_order_and_expires_later() {
    let backend = common::spawn().await;
    let token = common::partner_token();

    let code = backend
        .client
        .partner(&token)
        .generate_payment_code(OrderId::new(42))
        .await
        .unwrap();

    assert_eq!(code.order_id, OrderId::new(42));
    assert_eq!(code.status, PaymentCodeStatus::Active);
    assert!(code.expires_at > Utc::now());
    assert!(!code.is_expired_at(Utc::now()));
}

#[tokio::test]
async fn test_validate_code() {
    let backend = common::spawn().await;
    let token = common::partner_token();
    let partner = backend.client.partner(&token);

    let code = partner
        .validate_code(&CodeValidation::parse(" pay-0042 ").unwrap())
        .await
        .unwrap();
    assert_eq!(code.order_id, OrderId::new(42));

    let err = partner
        .validate_code(&CodeValidation::parse("NOPE").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.field_error("code"), Some("Ce code est inconnu ou expiré."));
}

#[tokio::test]
async fn test_error_status_in_successful_response() {
    let backend = common::spawn().await;
    let token = common::partner_token();

    let err = backend
        .client
        .partner(&token)
        .validate_code(&CodeValidation::parse("pay-old").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Api { status: 200, .. }));
    assert_eq!(err.user_message(), "Ce code a expiré");
}

#[tokio::test]
async fn test_admin_token_is_refused_on_partner_routes() {
    let backend = common::spawn().await;
    let token = common::admin_token();

    let err = backend
        .client
        .partner(&token)
        .generate_payment_code(OrderId::new(42))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}
