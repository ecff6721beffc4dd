//! Durable ticket record storage.
//!
//! Exposes the [`TicketStore`] trait consumed by the checkout service, a
//! `PostgreSQL` implementation backed by sqlx, and an in-memory
//! implementation (behind the `test-utils` feature) for tests.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod postgres;

#[cfg(feature = "test-utils")]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatepass_core::{NewTicket, Result, Ticket, TicketUpdate};

pub use postgres::PostgresTicketStore;

#[cfg(feature = "test-utils")]
pub use memory::InMemoryTicketStore;

/// Keyed, durable storage for [`Ticket`] records.
///
/// Implementations must enforce the uniqueness of `ticket_id` and
/// `order_id`, and must apply [`TicketStore::update_by_order_id`] as a
/// single atomic find-and-update so that concurrent verification callbacks
/// for the same order cannot interleave into an inconsistent status.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Insert a new ticket with `pending` payment status.
    ///
    /// # Errors
    ///
    /// - [`gatepass_core::CheckoutError::Validation`] when a required field
    ///   is missing or the quantity is outside 1–10.
    /// - [`gatepass_core::CheckoutError::DuplicateTicketId`] when the
    ///   ticket id already exists.
    /// - [`gatepass_core::CheckoutError::Store`] on storage failure.
    async fn create_pending(&self, ticket: NewTicket) -> Result<Ticket>;

    /// Fetch the ticket with the given ticket id.
    ///
    /// # Errors
    ///
    /// [`gatepass_core::CheckoutError::TicketNotFound`] when no ticket
    /// matches.
    async fn find_by_ticket_id(&self, ticket_id: &str) -> Result<Ticket>;

    /// Atomically apply a partial update to the unique ticket bound to
    /// `order_id` and return the post-update record.
    ///
    /// # Errors
    ///
    /// [`gatepass_core::CheckoutError::TicketNotFound`] when no ticket
    /// matches the order id.
    async fn update_by_order_id(&self, order_id: &str, update: TicketUpdate) -> Result<Ticket>;

    /// All tickets, newest first.
    ///
    /// # Errors
    ///
    /// [`gatepass_core::CheckoutError::Store`] on storage failure.
    async fn list_all(&self) -> Result<Vec<Ticket>>;

    /// Mark every `pending` ticket created before `cutoff` as `failed`,
    /// returning how many rows changed.
    ///
    /// Used by the reconciliation sweep to expire orders whose payment was
    /// never verified.
    ///
    /// # Errors
    ///
    /// [`gatepass_core::CheckoutError::Store`] on storage failure.
    async fn expire_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
