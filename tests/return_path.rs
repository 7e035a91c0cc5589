//! Tests for GET /return - the pull-path reconciliation entry point.
//!
//! The live status fetched from the processor drives both order mutation and
//! routing; the URL hint only ever routes, and only when the processor is
//! unreachable.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use common::*;

fn return_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get("location")
        .expect("redirect should carry a location header")
        .to_str()
        .unwrap()
        .to_string()
}

fn receipt_for(order_id: u64) -> String {
    format!("{}?order_id={}", RECEIPT_BASE, order_id)
}

#[tokio::test]
async fn test_live_success_settles_and_routes_to_receipt() {
    let api = StubPaymentApi::new();
    api.push_status(Ok(status_result("success")));
    let h = harness(api);
    seed_initiated_order(&h.store, 501, "pay_abc");

    // The URL hint contradicts the live status; the live status wins.
    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501&status=failed"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), receipt_for(501));

    let order = load_order(&h.store, 501);
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.settlement_reference.as_deref(), Some("pay_abc"));
    assert_eq!(h.api.status_requests.lock().unwrap().as_slice(), ["pay_abc"]);
}

#[tokio::test]
async fn test_live_failed_routes_to_checkout() {
    let api = StubPaymentApi::new();
    api.push_status(Ok(status_result("failed")));
    let h = harness(api);
    seed_initiated_order(&h.store, 501, "pay_abc");

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501&status=success"))
        .await
        .unwrap();

    assert_eq!(location(&response), CHECKOUT_URL);
    assert_eq!(load_order(&h.store, 501).status, OrderStatus::Failed);
}

#[tokio::test]
async fn test_live_pending_routes_to_receipt() {
    let api = StubPaymentApi::new();
    api.push_status(Ok(status_result("processing")));
    let h = harness(api);
    seed_initiated_order(&h.store, 501, "pay_abc");

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501"))
        .await
        .unwrap();

    assert_eq!(location(&response), receipt_for(501));
    assert_eq!(load_order(&h.store, 501).status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_live_expired_routes_to_checkout_without_mutation() {
    let api = StubPaymentApi::new();
    api.push_status(Ok(status_result("expired")));
    let h = harness(api);
    seed_initiated_order(&h.store, 501, "pay_abc");

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501"))
        .await
        .unwrap();

    assert_eq!(location(&response), CHECKOUT_URL);
    // "expired" is not settlement vocabulary; the order stays as it was.
    let order = load_order(&h.store, 501);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(notes_containing(&order, "Unrecognized Grateful payment status"), 1);
}

#[tokio::test]
async fn test_live_unknown_status_routes_to_receipt_without_mutation() {
    let api = StubPaymentApi::new();
    api.push_status(Ok(status_result("on-chain-review")));
    let h = harness(api);
    seed_initiated_order(&h.store, 501, "pay_abc");

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501"))
        .await
        .unwrap();

    // Fail open for navigation; the webhook remains the source of truth.
    assert_eq!(location(&response), receipt_for(501));
    assert_eq!(load_order(&h.store, 501).status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_hint_success_routes_to_receipt_when_remote_down() {
    let h = harness(StubPaymentApi::new());
    seed_initiated_order(&h.store, 501, "pay_abc");

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501&status=success"))
        .await
        .unwrap();

    assert_eq!(location(&response), receipt_for(501));
    let order = load_order(&h.store, 501);
    assert_eq!(
        order.status,
        OrderStatus::Pending,
        "The untrusted hint must never mutate the order"
    );
    assert!(order.settlement_reference.is_none());
}

#[tokio::test]
async fn test_hint_failed_routes_to_checkout_when_remote_down() {
    let h = harness(StubPaymentApi::new());
    seed_initiated_order(&h.store, 501, "pay_abc");

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501&status=failed"))
        .await
        .unwrap();

    assert_eq!(location(&response), CHECKOUT_URL);
    assert_eq!(load_order(&h.store, 501).status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_hint_expired_routes_to_checkout_when_remote_down() {
    let h = harness(StubPaymentApi::new());
    seed_initiated_order(&h.store, 501, "pay_abc");

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501&status=expired"))
        .await
        .unwrap();

    assert_eq!(location(&response), CHECKOUT_URL);
}

#[tokio::test]
async fn test_absent_hint_routes_to_receipt_when_remote_down() {
    let h = harness(StubPaymentApi::new());
    seed_initiated_order(&h.store, 501, "pay_abc");

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501"))
        .await
        .unwrap();

    assert_eq!(location(&response), receipt_for(501));
    assert_eq!(load_order(&h.store, 501).status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_missing_order_id_redirects_to_checkout() {
    let h = harness(StubPaymentApi::new());

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), CHECKOUT_URL);
}

#[tokio::test]
async fn test_non_numeric_order_id_redirects_to_checkout() {
    let h = harness(StubPaymentApi::new());

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=abc&status=success"))
        .await
        .unwrap();

    assert_eq!(location(&response), CHECKOUT_URL);
}

#[tokio::test]
async fn test_unknown_order_redirects_to_checkout() {
    let h = harness(StubPaymentApi::new());

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=999&status=success"))
        .await
        .unwrap();

    assert_eq!(location(&response), CHECKOUT_URL);
}

#[tokio::test]
async fn test_order_without_payment_id_redirects_to_checkout() {
    let h = harness(StubPaymentApi::new());
    seed_order(&h.store, 501, 42_00, "USD");

    let response = gateway_app(h.state.clone())
        .oneshot(return_request("/return?order_id=501&status=success"))
        .await
        .unwrap();

    // This order was never handed to Grateful; no status fetch happens.
    assert_eq!(location(&response), CHECKOUT_URL);
    assert!(h.api.status_requests.lock().unwrap().is_empty());
}
