//! The order-creation / payment-verification service.
//!
//! Orchestrates the ticket store and the payment gateway. Per ticket the
//! state machine is `pending → {completed, failed}`, both terminal. The
//! signature check in [`gatepass_core::signature`] is the only gate into
//! `completed`.

use gatepass_core::{
    signature, CheckoutError, NewTicket, OrderRequest, Result, Ticket, TicketUpdate, TicketView,
};
use gatepass_gateway::{OrderNotes, PaymentGateway};
use gatepass_store::TicketStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How many times a colliding ticket id is regenerated before giving up.
const MAX_CREATE_ATTEMPTS: u32 = 3;

/// Result of creating an order: everything the client needs to open the
/// gateway's payment widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    /// Gateway-assigned order id.
    pub order_id: String,
    /// Amount in the gateway's minor currency unit.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// The pending ticket's id.
    pub ticket_id: String,
}

/// The gateway's client-side payment callback, as a fixed structural type:
/// all three fields are required text.
///
/// Fields default to empty when absent; an empty signature can never
/// verify, so the request fails as a mismatch rather than a
/// deserialization rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentCallback {
    /// Gateway order id the payment was made against.
    pub order_id: String,
    /// Gateway payment id.
    pub payment_id: String,
    /// Hex HMAC-SHA256 signature over `"{order_id}|{payment_id}"`.
    pub signature: String,
}

/// Checkout orchestration over injected store and gateway handles.
pub struct CheckoutService {
    store: Arc<dyn TicketStore>,
    gateway: Arc<dyn PaymentGateway>,
    key_secret: String,
    currency: String,
}

impl CheckoutService {
    /// Create a service over the given collaborators.
    ///
    /// `key_secret` is the gateway shared secret used to verify payment
    /// callback signatures; `currency` is the ISO code orders are charged
    /// in.
    #[must_use]
    pub fn new(
        store: Arc<dyn TicketStore>,
        gateway: Arc<dyn PaymentGateway>,
        key_secret: String,
        currency: String,
    ) -> Self {
        Self {
            store,
            gateway,
            key_secret,
            currency,
        }
    }

    /// Create a gateway order and the pending ticket bound to it.
    ///
    /// The ticket id is generated before the gateway call and doubles as
    /// the order receipt. If persistence hits a ticket-id collision the id
    /// is regenerated and the insert retried, capped at
    /// [`MAX_CREATE_ATTEMPTS`].
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`] for bad input.
    /// - [`CheckoutError::Gateway`] when the external order cannot be
    ///   created.
    /// - Store errors when the pending ticket cannot be persisted; at that
    ///   point the gateway order already exists, which is logged as an
    ///   orphan alert (the reconciliation sweep has no record to expire, so
    ///   this must page a human).
    pub async fn create_order(&self, request: &OrderRequest) -> Result<OrderCreated> {
        let order = request.validate()?;
        let mut ticket_id = gatepass_core::generate_ticket_id();

        let notes = OrderNotes {
            name: order.name.clone(),
            email: order.email.clone(),
            quantity: order.quantity.to_string(),
            ticket_id: ticket_id.clone(),
        };
        let gateway_order = self
            .gateway
            .create_order(order.amount_minor_units(), &self.currency, &ticket_id, notes)
            .await?;

        let mut attempt = 1;
        let ticket = loop {
            let new_ticket = NewTicket {
                name: order.name.clone(),
                email: order.email.clone(),
                quantity: order.quantity,
                ticket_id: ticket_id.clone(),
                total_amount: order.amount,
                order_id: gateway_order.order_id.clone(),
            };

            match self.store.create_pending(new_ticket).await {
                Ok(ticket) => break ticket,
                Err(CheckoutError::DuplicateTicketId { .. }) if attempt < MAX_CREATE_ATTEMPTS => {
                    attempt += 1;
                    ticket_id = gatepass_core::generate_ticket_id();
                    // The gateway order keeps the original id as receipt;
                    // the divergence is logged and accepted.
                    tracing::warn!(
                        order_id = %gateway_order.order_id,
                        new_ticket_id = %ticket_id,
                        attempt,
                        "Ticket id collision, regenerating"
                    );
                }
                Err(err) => {
                    // The external order exists but no local record does.
                    tracing::error!(
                        ticket_id = %ticket_id,
                        order_id = %gateway_order.order_id,
                        error = %err,
                        "Orphaned gateway order: ticket persistence failed after order creation"
                    );
                    return Err(err);
                }
            }
        };

        tracing::info!(
            ticket_id = %ticket.ticket_id,
            order_id = %ticket.order_id,
            quantity = ticket.quantity,
            "Pending ticket created"
        );

        Ok(OrderCreated {
            order_id: gateway_order.order_id,
            amount: gateway_order.amount_minor,
            currency: gateway_order.currency,
            ticket_id: ticket.ticket_id,
        })
    }

    /// Verify a gateway payment callback and finalize the ticket.
    ///
    /// A valid signature moves the ticket to `completed` with the payment
    /// id recorded; an invalid one moves it to `failed` (best effort) and
    /// surfaces [`CheckoutError::SignatureMismatch`]. Duplicate callbacks
    /// with the same valid signature re-apply the same terminal state and
    /// succeed.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SignatureMismatch`] when the signature is wrong.
    /// - [`CheckoutError::TicketNotFound`] when the signature is valid but
    ///   no ticket matches the order id.
    pub async fn verify_payment(&self, callback: &PaymentCallback) -> Result<TicketView> {
        let valid = signature::verify(
            &callback.order_id,
            &callback.payment_id,
            &callback.signature,
            &self.key_secret,
        );

        if valid {
            let ticket = self
                .store
                .update_by_order_id(
                    &callback.order_id,
                    TicketUpdate::completed(callback.payment_id.clone()),
                )
                .await?;

            tracing::info!(
                ticket_id = %ticket.ticket_id,
                order_id = %ticket.order_id,
                payment_id = %callback.payment_id,
                "Payment verified"
            );
            return Ok(ticket.into());
        }

        // The buyer-facing outcome is "verification failed" whether or not
        // a ticket exists for this order id, so a missing ticket is a
        // silent no-op here.
        match self
            .store
            .update_by_order_id(&callback.order_id, TicketUpdate::failed())
            .await
        {
            Ok(ticket) => {
                tracing::warn!(
                    ticket_id = %ticket.ticket_id,
                    order_id = %callback.order_id,
                    "Payment signature mismatch, ticket marked failed"
                );
            }
            Err(CheckoutError::TicketNotFound) => {}
            Err(err) => {
                tracing::warn!(
                    order_id = %callback.order_id,
                    error = %err,
                    "Failed to mark ticket failed after signature mismatch"
                );
            }
        }

        Err(CheckoutError::SignatureMismatch)
    }

    /// Fetch a ticket by its ticket id.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::TicketNotFound`] when no ticket matches.
    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket> {
        self.store.find_by_ticket_id(ticket_id).await
    }

    /// All tickets, newest first. Administrative; callers must gate access.
    ///
    /// # Errors
    ///
    /// Store errors on storage failure.
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        self.store.list_all().await
    }
}
