//! In-memory ticket store for tests.
//!
//! Mirrors the `PostgreSQL` implementation's observable behavior: ticket-id
//! and order-id uniqueness, atomic update-by-order-id, newest-first
//! listing, and pending-ticket expiry.

use crate::TicketStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatepass_core::ticket::{DEFAULT_EVENT_DATE, DEFAULT_EVENT_TIME};
use gatepass_core::{CheckoutError, NewTicket, PaymentStatus, Result, Ticket, TicketUpdate};
use std::sync::Mutex;

/// Mutex-guarded vector of tickets, in insertion (= creation) order.
#[derive(Default)]
pub struct InMemoryTicketStore {
    tickets: Mutex<Vec<Ticket>>,
}

impl InMemoryTicketStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, Vec<Ticket>>> {
        self.tickets
            .lock()
            .map_err(|_| CheckoutError::Store("ticket store lock poisoned".into()))
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn create_pending(&self, ticket: NewTicket) -> Result<Ticket> {
        ticket.validate()?;

        let mut tickets = self.locked()?;
        if tickets.iter().any(|t| t.ticket_id == ticket.ticket_id) {
            return Err(CheckoutError::DuplicateTicketId {
                ticket_id: ticket.ticket_id,
            });
        }
        if tickets.iter().any(|t| t.order_id == ticket.order_id) {
            return Err(CheckoutError::Store(format!(
                "order {} already has a ticket",
                ticket.order_id
            )));
        }

        let now = Utc::now();
        let record = Ticket {
            name: ticket.name,
            email: ticket.email,
            quantity: ticket.quantity,
            ticket_id: ticket.ticket_id,
            total_amount: ticket.total_amount,
            payment_id: None,
            payment_status: PaymentStatus::Pending,
            order_id: ticket.order_id,
            event_date: DEFAULT_EVENT_DATE.into(),
            event_time: DEFAULT_EVENT_TIME.into(),
            created_at: now,
            updated_at: now,
        };
        tickets.push(record.clone());
        Ok(record)
    }

    async fn find_by_ticket_id(&self, ticket_id: &str) -> Result<Ticket> {
        self.locked()?
            .iter()
            .find(|t| t.ticket_id == ticket_id)
            .cloned()
            .ok_or(CheckoutError::TicketNotFound)
    }

    async fn update_by_order_id(&self, order_id: &str, update: TicketUpdate) -> Result<Ticket> {
        let mut tickets = self.locked()?;
        let ticket = tickets
            .iter_mut()
            .find(|t| t.order_id == order_id)
            .ok_or(CheckoutError::TicketNotFound)?;

        ticket.payment_status = update.payment_status;
        ticket.payment_id = update.payment_id;
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    async fn list_all(&self) -> Result<Vec<Ticket>> {
        // Insertion order is creation order, so newest-first is a reverse.
        Ok(self.locked()?.iter().rev().cloned().collect())
    }

    async fn expire_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut expired = 0;
        let now = Utc::now();
        for ticket in self.locked()?.iter_mut() {
            if ticket.payment_status == PaymentStatus::Pending && ticket.created_at < cutoff {
                ticket.payment_status = PaymentStatus::Failed;
                ticket.updated_at = now;
                expired += 1;
            }
        }
        Ok(expired)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_ticket(n: u32) -> NewTicket {
        NewTicket {
            name: format!("Buyer {n}"),
            email: format!("buyer{n}@example.com"),
            quantity: 2,
            ticket_id: format!("TKT-{n}-AAAAAAAAAA"),
            total_amount: 200.0,
            order_id: format!("order_{n}"),
        }
    }

    #[tokio::test]
    async fn create_starts_pending_with_defaults() {
        let store = InMemoryTicketStore::new();
        let ticket = store.create_pending(new_ticket(1)).await.unwrap();
        assert_eq!(ticket.payment_status, PaymentStatus::Pending);
        assert!(ticket.payment_id.is_none());
        assert_eq!(ticket.event_date, DEFAULT_EVENT_DATE);
        assert_eq!(ticket.event_time, DEFAULT_EVENT_TIME);
    }

    #[tokio::test]
    async fn duplicate_ticket_id_is_rejected() {
        let store = InMemoryTicketStore::new();
        store.create_pending(new_ticket(1)).await.unwrap();

        let mut dup = new_ticket(2);
        dup.ticket_id = new_ticket(1).ticket_id;
        let err = store.create_pending(dup).await.unwrap_err();
        assert!(matches!(err, CheckoutError::DuplicateTicketId { .. }));
    }

    #[tokio::test]
    async fn invalid_quantity_is_rejected() {
        let store = InMemoryTicketStore::new();
        let mut ticket = new_ticket(1);
        ticket.quantity = 0;
        assert!(matches!(
            store.create_pending(ticket).await.unwrap_err(),
            CheckoutError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn find_by_ticket_id_round_trips() {
        let store = InMemoryTicketStore::new();
        let created = store.create_pending(new_ticket(1)).await.unwrap();
        let found = store.find_by_ticket_id(&created.ticket_id).await.unwrap();
        assert_eq!(found, created);

        assert!(matches!(
            store.find_by_ticket_id("TKT-missing").await.unwrap_err(),
            CheckoutError::TicketNotFound
        ));
    }

    #[tokio::test]
    async fn update_by_order_id_completes_ticket() {
        let store = InMemoryTicketStore::new();
        let created = store.create_pending(new_ticket(1)).await.unwrap();

        let updated = store
            .update_by_order_id(&created.order_id, TicketUpdate::completed("pay_1".into()))
            .await
            .unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Completed);
        assert_eq!(updated.payment_id.as_deref(), Some("pay_1"));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_is_idempotent_for_repeated_completion() {
        let store = InMemoryTicketStore::new();
        let created = store.create_pending(new_ticket(1)).await.unwrap();
        let update = TicketUpdate::completed("pay_1".into());

        let first = store
            .update_by_order_id(&created.order_id, update.clone())
            .await
            .unwrap();
        let second = store
            .update_by_order_id(&created.order_id, update)
            .await
            .unwrap();
        assert_eq!(second.payment_status, first.payment_status);
        assert_eq!(second.payment_id, first.payment_id);
    }

    #[tokio::test]
    async fn update_unknown_order_is_not_found() {
        let store = InMemoryTicketStore::new();
        assert!(matches!(
            store
                .update_by_order_id("order_missing", TicketUpdate::failed())
                .await
                .unwrap_err(),
            CheckoutError::TicketNotFound
        ));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryTicketStore::new();
        for n in 1..=3 {
            store.create_pending(new_ticket(n)).await.unwrap();
        }
        let tickets = store.list_all().await.unwrap();
        let ids: Vec<&str> = tickets.iter().map(|t| t.order_id.as_str()).collect();
        assert_eq!(ids, ["order_3", "order_2", "order_1"]);
    }

    #[tokio::test]
    async fn expiry_only_touches_old_pending_tickets() {
        let store = InMemoryTicketStore::new();
        let pending = store.create_pending(new_ticket(1)).await.unwrap();
        let completed = store.create_pending(new_ticket(2)).await.unwrap();
        store
            .update_by_order_id(&completed.order_id, TicketUpdate::completed("pay_2".into()))
            .await
            .unwrap();

        // Cutoff in the future: the pending ticket is stale, the completed
        // one must be left alone.
        let cutoff = Utc::now() + Duration::seconds(60);
        assert_eq!(store.expire_stale_pending(cutoff).await.unwrap(), 1);

        let expired = store.find_by_ticket_id(&pending.ticket_id).await.unwrap();
        assert_eq!(expired.payment_status, PaymentStatus::Failed);
        let untouched = store.find_by_ticket_id(&completed.ticket_id).await.unwrap();
        assert_eq!(untouched.payment_status, PaymentStatus::Completed);

        // Nothing stale on the second sweep.
        assert_eq!(store.expire_stale_pending(cutoff).await.unwrap(), 0);
    }
}
