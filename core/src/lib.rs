//! Core domain types for the Gatepass checkout flow.
//!
//! This crate holds everything that is pure: the [`Ticket`] entity and its
//! payment lifecycle, order-input validation, ticket-id generation, the
//! HMAC-SHA256 signature verifier that gates the pending → completed
//! transition, and the error taxonomy shared by the store, gateway, and web
//! crates. No I/O happens here.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod order;
pub mod signature;
pub mod ticket;

pub use error::{CheckoutError, Result};
pub use order::{generate_ticket_id, OrderRequest, ValidatedOrder};
pub use ticket::{NewTicket, PaymentStatus, Ticket, TicketUpdate, TicketView};
