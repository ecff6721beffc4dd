//! HTTP API integration tests.
//!
//! Exercises the full router over the in-memory store and mock gateway:
//! routing, status codes, wire shapes, and the checkout protocol
//! end-to-end.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum_test::TestServer;
use gatepass_core::signature;
use gatepass_gateway::MockPaymentGateway;
use gatepass_store::InMemoryTicketStore;
use gatepass_web::{build_router, AppState, CheckoutService};
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "test_key_secret";
const ADMIN_TOKEN: &str = "admin-test-token";

fn test_server() -> TestServer {
    let service = Arc::new(CheckoutService::new(
        Arc::new(InMemoryTicketStore::new()),
        MockPaymentGateway::shared(),
        SECRET.to_string(),
        "INR".to_string(),
    ));
    let state = AppState::new(
        service,
        "rzp_test_key".to_string(),
        Some(ADMIN_TOKEN.to_string()),
    );
    TestServer::new(build_router(state)).expect("failed to build test server")
}

fn order_body() -> Value {
    json!({"amount": 300, "name": "Asha", "email": "a@x.com", "quantity": 3})
}

async fn create_order(server: &TestServer) -> Value {
    let response = server.post("/create-order").json(&order_body()).await;
    response.assert_status_ok();
    response.json::<Value>()
}

fn signed_callback(order_id: &str, payment_id: &str) -> Value {
    let sig = signature::expected_signature(order_id, payment_id, SECRET).unwrap();
    json!({"orderId": order_id, "paymentId": payment_id, "signature": sig})
}

#[tokio::test]
async fn health_reports_ok() {
    let server = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn create_order_returns_widget_parameters() {
    let server = test_server();
    let body = create_order(&server).await;

    assert_eq!(body["amount"], 30_000);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["gatewayPublicKey"], "rzp_test_key");
    assert!(body["orderId"].as_str().unwrap().starts_with("order_mock_"));
    assert!(body["ticketId"].as_str().unwrap().starts_with("TKT-"));
}

#[tokio::test]
async fn create_order_rejects_missing_fields() {
    let server = test_server();
    let response = server
        .post("/create-order")
        .json(&json!({"amount": 300, "quantity": 3}))
        .await;
    response.assert_status_bad_request();
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn create_order_rejects_out_of_range_quantity() {
    let server = test_server();
    for quantity in [0, 11] {
        let response = server
            .post("/create-order")
            .json(&json!({"amount": 300, "name": "Asha", "email": "a@x.com", "quantity": quantity}))
            .await;
        response.assert_status_bad_request();
    }
}

#[tokio::test]
async fn verify_payment_completes_the_ticket() {
    let server = test_server();
    let order = create_order(&server).await;
    let order_id = order["orderId"].as_str().unwrap();

    let response = server
        .post("/verify-payment")
        .json(&signed_callback(order_id, "pay_http_1"))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["ticket"]["quantity"], 3);
    assert_eq!(body["ticket"]["totalAmount"], 300.0);
    assert_eq!(body["ticket"]["ticketId"], order["ticketId"]);
    // Sanitized view: no order or payment ids.
    assert!(body["ticket"].get("orderId").is_none());
    assert!(body["ticket"].get("paymentId").is_none());

    // The persisted ticket reflects the completed payment.
    let ticket_id = order["ticketId"].as_str().unwrap();
    let ticket = server.get(&format!("/ticket/{ticket_id}")).await;
    ticket.assert_status_ok();
    let ticket = ticket.json::<Value>();
    assert_eq!(ticket["paymentStatus"], "completed");
    assert_eq!(ticket["paymentId"], "pay_http_1");
}

#[tokio::test]
async fn verify_payment_is_idempotent() {
    let server = test_server();
    let order = create_order(&server).await;
    let callback = signed_callback(order["orderId"].as_str().unwrap(), "pay_http_1");

    server.post("/verify-payment").json(&callback).await.assert_status_ok();
    let second = server.post("/verify-payment").json(&callback).await;
    second.assert_status_ok();
    assert_eq!(second.json::<Value>()["ticket"]["ticketId"], order["ticketId"]);
}

#[tokio::test]
async fn verify_payment_rejects_bad_signature_and_fails_ticket() {
    let server = test_server();
    let order = create_order(&server).await;
    let order_id = order["orderId"].as_str().unwrap();

    let response = server
        .post("/verify-payment")
        .json(&json!({"orderId": order_id, "paymentId": "pay_http_1", "signature": "forged"}))
        .await;
    response.assert_status_bad_request();
    assert!(response.json::<Value>()["error"].is_string());

    let ticket_id = order["ticketId"].as_str().unwrap();
    let ticket = server.get(&format!("/ticket/{ticket_id}")).await.json::<Value>();
    assert_eq!(ticket["paymentStatus"], "failed");
    assert!(ticket["paymentId"].is_null());
}

#[tokio::test]
async fn verify_payment_unknown_order_is_404_with_valid_signature() {
    let server = test_server();
    let response = server
        .post("/verify-payment")
        .json(&signed_callback("order_ghost", "pay_1"))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn verify_payment_unknown_order_is_400_with_bad_signature() {
    let server = test_server();
    let response = server
        .post("/verify-payment")
        .json(&json!({"orderId": "order_ghost", "paymentId": "pay_1", "signature": "nope"}))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn get_ticket_unknown_id_is_404() {
    let server = test_server();
    server.get("/ticket/TKT-unknown").await.assert_status_not_found();
}

#[tokio::test]
async fn list_tickets_requires_admin_token() {
    let server = test_server();
    server.get("/tickets").await.assert_status_unauthorized();

    let response = server
        .get("/tickets")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer wrong"))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn list_tickets_returns_newest_first_for_admin() {
    let server = test_server();
    let first = create_order(&server).await;
    let second = create_order(&server).await;

    let response = server
        .get("/tickets")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer admin-test-token"),
        )
        .await;
    response.assert_status_ok();

    let tickets = response.json::<Vec<Value>>();
    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0]["ticketId"], second["ticketId"]);
    assert_eq!(tickets[1]["ticketId"], first["ticketId"]);
}
