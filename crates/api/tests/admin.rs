//! Admin facade against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use souk_api::ApiError;
use souk_core::{ListQuery, Reason, VendorId, VendorStanding, VendorStatus};

fn with_status(status: &str) -> ListQuery {
    ListQuery::new(Some(1), None, [("status", Some(status))])
}

#[tokio::test]
async fn test_reject_with_reason_is_visible_after_reload() {
    let backend = common::spawn().await;
    let token = common::admin_token();
    let admin = backend.client.admin(&token);

    let reason = Reason::parse("Documents incomplets").unwrap();
    let ack = admin.reject_vendor(VendorId::new(1), &reason).await.unwrap();
    assert!(ack.message.is_some());

    let page = admin.vendors(&with_status("rejected")).await.unwrap();
    assert_eq!(page.items.len(), 1);
    let vendor = &page.items[0];
    assert_eq!(vendor.status, VendorStatus::Rejected);
    assert_eq!(
        vendor.standing(),
        VendorStanding::Rejected {
            reason: Some("Documents incomplets".to_string())
        }
    );
}

#[tokio::test]
async fn test_requests_carry_bearer_token_and_filters() {
    let backend = common::spawn().await;
    let token = common::admin_token();

    backend
        .client
        .admin(&token)
        .vendors(&with_status("pending"))
        .await
        .unwrap();

    let recorded = backend.requests_to("/api/admin/vendors");
    assert_eq!(recorded.len(), 1);
    assert_eq!(
        recorded[0].authorization.as_deref(),
        Some("Bearer 1|admin-token")
    );
    let query = recorded[0].query.as_deref().unwrap();
    assert!(query.contains("page=1"));
    assert!(query.contains("per_page=15"));
    assert!(query.contains("status=pending"));
}

#[tokio::test]
async fn test_refused_transition_surfaces_server_message() {
    let backend = common::spawn().await;
    let token = common::admin_token();

    let err = backend
        .client
        .admin(&token)
        .reactivate_vendor(VendorId::new(2))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Api { status: 409, .. }));
    assert_eq!(err.to_string(), "Action reactivate impossible depuis approved");
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let backend = common::spawn().await;
    let token = souk_api::ApiToken::new("forged".to_string());

    let err = backend
        .client
        .admin(&token)
        .vendor_stats()
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_stats_follow_mutations() {
    let backend = common::spawn().await;
    let token = common::admin_token();
    let admin = backend.client.admin(&token);

    let before = admin.vendor_stats().await.unwrap();
    assert_eq!(before.pending, 1);

    admin.approve_vendor(VendorId::new(1)).await.unwrap();
    admin.delete_vendor(VendorId::new(3)).await.unwrap();

    let after = admin.vendor_stats().await.unwrap();
    assert_eq!(after.pending, 0);
    assert_eq!(after.approved, 2);
    assert_eq!(after.total, 2);
}

#[tokio::test]
async fn test_empty_payments_page() {
    let backend = common::spawn().await;
    let token = common::admin_token();
    let admin = backend.client.admin(&token);

    let page = admin.payments(&ListQuery::default()).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.meta.total, 0);

    let stats = admin.payment_stats().await.unwrap();
    assert_eq!(stats.total_count, 0);
    assert_eq!(backend.requests_to("/api/admin/payments/stats").len(), 1);
}
