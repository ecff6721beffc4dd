//! HTTP handlers.
//!
//! Thin adapters between the wire contract and [`crate::CheckoutService`].

pub mod health;
pub mod orders;
pub mod tickets;
