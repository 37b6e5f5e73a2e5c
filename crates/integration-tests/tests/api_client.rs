//! Bearer-token HTTP client against the fake backend.
//!
//! Run with: `cargo test -p bazaar-integration-tests --test api_client`

#![allow(clippy::unwrap_used)]

use bazaar_client::ApiError;
use bazaar_client::api::{ProductQuery, Report};
use bazaar_integration_tests::{FakeBackend, RETRY_AFTER_SECS};
use rust_decimal::Decimal;
use secrecy::SecretString;

// ============================================================================
// Authorization header
// ============================================================================

#[tokio::test]
async fn test_no_header_without_token() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();

    api.products(&ProductQuery::default()).await.unwrap();
    assert_eq!(backend.recorded.authorization_headers(), [None]);
}

#[tokio::test]
async fn test_token_is_sent_as_bearer_on_every_request() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();
    api.set_token(SecretString::from("tok-customer")).await;

    api.products(&ProductQuery::default()).await.unwrap();
    api.product("p-lamp").await.unwrap();
    api.customer_orders().await.unwrap();

    let headers = backend.recorded.authorization_headers();
    assert_eq!(headers.len(), 3);
    assert!(
        headers
            .iter()
            .all(|h| h.as_deref() == Some("Bearer tok-customer"))
    );
}

#[tokio::test]
async fn test_clones_share_the_token() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();
    let other = api.clone();

    api.set_token(SecretString::from("tok-root")).await;
    other.products(&ProductQuery::default()).await.unwrap();
    assert_eq!(
        backend.recorded.last_authorization().as_deref(),
        Some("Bearer tok-root")
    );

    api.clear_token().await;
    other.products(&ProductQuery::default()).await.unwrap();
    assert_eq!(backend.recorded.last_authorization(), None);
}

// ============================================================================
// Error mapping
// ============================================================================

#[tokio::test]
async fn test_not_found_carries_server_message() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();

    let err = api.product("nope").await.unwrap_err();
    assert!(matches!(&err, ApiError::NotFound(msg) if msg == "Product not found"));
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message("Failed"), "Product not found");
}

#[tokio::test]
async fn test_nested_error_message_is_read() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();
    api.set_token(SecretString::from("tok-seller")).await;

    let err = api.customer_orders().await.unwrap_err();
    assert!(matches!(&err, ApiError::Forbidden(msg) if msg == "Customers only"));
}

#[tokio::test]
async fn test_unauthorized_without_token() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();

    let err = api.me().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();

    let err = api.recent_orders(5).await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited(secs) if secs == RETRY_AFTER_SECS));
}

// ============================================================================
// Payloads
// ============================================================================

#[tokio::test]
async fn test_catalog_decodes_string_and_number_prices() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();

    let products = api.products(&ProductQuery::default()).await.unwrap();
    let prices: Vec<_> = products
        .iter()
        .map(|p| p.display_price().display())
        .collect();
    assert_eq!(prices, ["USD 19.50", "USD 4.25"]);
}

#[tokio::test]
async fn test_snapshot_keeps_unknown_fields() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();

    let snapshot = api.product_snapshot("p-lamp").await.unwrap();
    assert_eq!(snapshot.id(), "p-lamp");
    assert_eq!(
        snapshot.get("warehouse").and_then(|v| v.as_str()),
        Some("north")
    );
}

#[tokio::test]
async fn test_settings_round_trip_for_super_admin() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();
    api.set_token(SecretString::from("tok-root")).await;

    let before = api.platform_settings().await.unwrap();
    assert_eq!(before.commission_pct.to_string(), "10");

    let after = api
        .update_commission(Decimal::new(125, 1))
        .await
        .unwrap();
    assert_eq!(after.commission_pct, Decimal::new(125, 1));
    assert!(!after.maintenance_enabled);
}

#[tokio::test]
async fn test_settings_forbidden_for_customer() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();
    api.set_token(SecretString::from("tok-customer")).await;

    let err = api.platform_settings().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn test_report_download_returns_raw_csv() {
    let backend = FakeBackend::start().await.unwrap();
    let api = backend.client().unwrap();
    api.set_token(SecretString::from("tok-root")).await;

    let csv = api.download_report(Report::Orders).await.unwrap();
    assert_eq!(csv, b"id,total\no1,23.75\n");
    assert!(api.download_report(Report::Sellers).await.is_err());
}
