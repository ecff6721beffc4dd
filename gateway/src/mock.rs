//! Mock payment gateway for development and testing.

use crate::{GatewayOrder, OrderNotes, PaymentGateway};
use async_trait::async_trait;
use gatepass_core::{CheckoutError, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A gateway order the mock recorded, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedOrder {
    /// Assigned order id.
    pub order_id: String,
    /// Requested amount in minor units.
    pub amount_minor: i64,
    /// Requested currency.
    pub currency: String,
    /// Receipt (the ticket id).
    pub receipt: String,
    /// Attached metadata.
    pub notes: OrderNotes,
}

/// Deterministic in-process [`PaymentGateway`].
///
/// Assigns sequential order ids (`order_mock_1`, `order_mock_2`, …) and
/// records every created order. Can be switched into a failing mode to
/// exercise the gateway-error paths.
#[derive(Default)]
pub struct MockPaymentGateway {
    sequence: AtomicU64,
    failing: AtomicBool,
    orders: Mutex<Vec<RecordedOrder>>,
}

impl MockPaymentGateway {
    /// Create a mock gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Arc-wrapped instance for sharing.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make every subsequent `create_order` call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every order created so far, in creation order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned; that only happens after a
    /// panic in another test thread.
    #[must_use]
    #[allow(clippy::unwrap_used, clippy::panic)]
    pub fn orders(&self) -> Vec<RecordedOrder> {
        match self.orders.lock() {
            Ok(orders) => orders.clone(),
            Err(_) => panic!("mock gateway lock poisoned"),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
        notes: OrderNotes,
    ) -> Result<GatewayOrder> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CheckoutError::Gateway("mock gateway unavailable".into()));
        }

        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let order = GatewayOrder {
            order_id: format!("order_mock_{n}"),
            amount_minor,
            currency: currency.to_string(),
        };

        if let Ok(mut orders) = self.orders.lock() {
            orders.push(RecordedOrder {
                order_id: order.order_id.clone(),
                amount_minor,
                currency: currency.to_string(),
                receipt: receipt.to_string(),
                notes,
            });
        }

        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn notes() -> OrderNotes {
        OrderNotes {
            name: "Asha".into(),
            email: "a@x.com".into(),
            quantity: "3".into(),
            ticket_id: "TKT-1-ABCDE12345".into(),
        }
    }

    #[tokio::test]
    async fn assigns_sequential_order_ids() {
        let gateway = MockPaymentGateway::new();
        let first = gateway
            .create_order(30_000, "INR", "TKT-1", notes())
            .await
            .unwrap();
        let second = gateway
            .create_order(10_000, "INR", "TKT-2", notes())
            .await
            .unwrap();

        assert_eq!(first.order_id, "order_mock_1");
        assert_eq!(second.order_id, "order_mock_2");
        assert_eq!(first.amount_minor, 30_000);

        let recorded = gateway.orders();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].receipt, "TKT-1");
    }

    #[tokio::test]
    async fn failing_mode_surfaces_gateway_error() {
        let gateway = MockPaymentGateway::new();
        gateway.set_failing(true);
        let err = gateway
            .create_order(30_000, "INR", "TKT-1", notes())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Gateway(_)));

        gateway.set_failing(false);
        assert!(gateway.create_order(30_000, "INR", "TKT-1", notes()).await.is_ok());
    }
}
