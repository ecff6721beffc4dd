//! Payment gateway adapter.
//!
//! Wraps the external payment service's order-creation API behind the
//! [`PaymentGateway`] trait. The HTTP implementation targets a
//! Razorpay-compatible Orders API; the mock implementation (behind the
//! `test-utils` feature) lets the checkout flow be exercised without the
//! external service.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod http;

#[cfg(feature = "test-utils")]
pub mod mock;

use async_trait::async_trait;
use gatepass_core::Result;
use serde::{Deserialize, Serialize};

pub use http::HttpPaymentGateway;

#[cfg(feature = "test-utils")]
pub use mock::MockPaymentGateway;

/// The gateway's representation of an intended charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway-assigned order id.
    pub order_id: String,
    /// Amount in the gateway's minor currency unit.
    pub amount_minor: i64,
    /// ISO currency code.
    pub currency: String,
}

/// Ticket metadata attached to a gateway order for auditability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNotes {
    /// Buyer name.
    pub name: String,
    /// Buyer email.
    pub email: String,
    /// Ticket quantity, stringified per the gateway's notes contract.
    pub quantity: String,
    /// The pre-generated ticket id (also used as the order receipt).
    pub ticket_id: String,
}

/// External payment service adapter.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order at the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`gatepass_core::CheckoutError::Gateway`] on network, auth,
    /// timeout, or decode failure. Failures must propagate to the caller,
    /// never be swallowed.
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
        notes: OrderNotes,
    ) -> Result<GatewayOrder>;
}
