//! Order creation and payment verification endpoints.

use crate::service::PaymentCallback;
use crate::WebResult;
use crate::state::AppState;
use axum::{extract::State, Json};
use gatepass_core::{OrderRequest, TicketView};
use serde::Serialize;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response after creating an order: everything the client needs to open
/// the payment widget.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Gateway order id.
    pub order_id: String,
    /// Amount in the gateway's minor currency unit.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// The pending ticket's id.
    pub ticket_id: String,
    /// Public gateway key id for the widget.
    pub gateway_public_key: String,
}

/// Response after a verified payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    /// Always `true` on this path; mismatches are HTTP 400.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: &'static str,
    /// Sanitized ticket view.
    pub ticket: TicketView,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a gateway order and its pending ticket.
///
/// # Endpoint
///
/// ```text
/// POST /create-order
/// ```
///
/// # Errors
///
/// `400` on missing/invalid fields, `500` on gateway or store failure.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> WebResult<Json<CreateOrderResponse>> {
    let created = state.service.create_order(&request).await?;

    Ok(Json(CreateOrderResponse {
        order_id: created.order_id,
        amount: created.amount,
        currency: created.currency,
        ticket_id: created.ticket_id,
        gateway_public_key: state.gateway_key_id.clone(),
    }))
}

/// Verify a gateway payment callback.
///
/// # Endpoint
///
/// ```text
/// POST /verify-payment
/// ```
///
/// # Errors
///
/// `400` on signature mismatch, `404` when no ticket matches the order id,
/// `500` on unexpected failure.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(callback): Json<PaymentCallback>,
) -> WebResult<Json<VerifyPaymentResponse>> {
    let ticket = state.service.verify_payment(&callback).await?;

    Ok(Json(VerifyPaymentResponse {
        success: true,
        message: "Payment verified successfully",
        ticket,
    }))
}
