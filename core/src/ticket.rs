//! The `Ticket` entity and its payment lifecycle.
//!
//! A ticket is created `pending` alongside the external gateway order and is
//! mutated exactly once more by payment verification, which moves it to
//! `completed` (signature valid) or `failed` (signature invalid). Both are
//! terminal; nothing ever transitions back to `pending` and tickets are
//! never deleted.

use crate::error::{CheckoutError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default event date shown on every ticket.
pub const DEFAULT_EVENT_DATE: &str = "July 25, 2025";

/// Default event time shown on every ticket.
pub const DEFAULT_EVENT_TIME: &str = "6:00 PM IST";

/// Payment lifecycle state of a [`Ticket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Order created at the gateway, buyer has not completed payment.
    Pending,
    /// Gateway callback carried a valid signature.
    Completed,
    /// Gateway callback carried an invalid signature, or the pending
    /// window expired with no verified payment.
    Failed,
}

impl PaymentStatus {
    /// Canonical lowercase form, as persisted and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` once the status can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a transition from `self` to `next` is legal.
    ///
    /// `pending` may become either terminal state; a terminal state may
    /// only be re-applied (duplicate gateway callbacks re-assert the same
    /// outcome), never crossed.
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        self == Self::Pending || self == next
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(CheckoutError::Store(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// A persisted ticket record: one buyer's purchase of N tickets.
///
/// Serialized in camelCase to match the public wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Buyer name, trimmed.
    pub name: String,
    /// Buyer email, trimmed and lowercased.
    pub email: String,
    /// Number of tickets purchased, 1–10.
    pub quantity: i32,
    /// Globally unique ticket identifier, generated before any gateway call.
    pub ticket_id: String,
    /// Total charged amount in major currency units.
    pub total_amount: f64,
    /// Gateway payment id; set if and only if `payment_status` is completed.
    pub payment_id: Option<String>,
    /// Payment lifecycle state.
    pub payment_status: PaymentStatus,
    /// Gateway-assigned order id; at most one ticket per order.
    pub order_id: String,
    /// Event date display text.
    pub event_date: String,
    /// Event time display text.
    pub event_time: String,
    /// Creation timestamp, set by the store.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp, maintained by the store.
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a pending ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    /// Buyer name, already trimmed.
    pub name: String,
    /// Buyer email, already trimmed and lowercased.
    pub email: String,
    /// Number of tickets, 1–10.
    pub quantity: i32,
    /// Pre-generated unique ticket id.
    pub ticket_id: String,
    /// Total amount in major currency units.
    pub total_amount: f64,
    /// Gateway order id the ticket is bound to.
    pub order_id: String,
}

impl NewTicket {
    /// Check the store-level invariants before insertion.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] if any required field is empty
    /// or the quantity is outside 1–10.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty()
            || self.email.is_empty()
            || self.ticket_id.is_empty()
            || self.order_id.is_empty()
        {
            return Err(CheckoutError::Validation(
                "missing required ticket fields".into(),
            ));
        }
        if !(crate::order::MIN_QUANTITY..=crate::order::MAX_QUANTITY).contains(&self.quantity) {
            return Err(CheckoutError::Validation(format!(
                "quantity must be between {} and {}",
                crate::order::MIN_QUANTITY,
                crate::order::MAX_QUANTITY
            )));
        }
        Ok(())
    }
}

/// Partial update applied by payment verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketUpdate {
    /// New payment status.
    pub payment_status: PaymentStatus,
    /// Gateway payment id; `Some` only when completing.
    pub payment_id: Option<String>,
}

impl TicketUpdate {
    /// Update marking a ticket completed with the verified payment id.
    #[must_use]
    pub const fn completed(payment_id: String) -> Self {
        Self {
            payment_status: PaymentStatus::Completed,
            payment_id: Some(payment_id),
        }
    }

    /// Update marking a ticket failed. Never carries a payment id.
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            payment_status: PaymentStatus::Failed,
            payment_id: None,
        }
    }
}

/// Sanitized ticket view returned to the buyer after verification.
///
/// Exposes no internal identifiers beyond the ticket id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    /// Unique ticket identifier.
    pub ticket_id: String,
    /// Buyer name.
    pub name: String,
    /// Buyer email.
    pub email: String,
    /// Number of tickets.
    pub quantity: i32,
    /// Total amount in major currency units.
    pub total_amount: f64,
    /// Event date display text.
    pub event_date: String,
    /// Event time display text.
    pub event_time: String,
}

impl From<Ticket> for TicketView {
    fn from(ticket: Ticket) -> Self {
        Self {
            ticket_id: ticket.ticket_id,
            name: ticket.name,
            email: ticket.email,
            quantity: ticket.quantity,
            total_amount: ticket.total_amount,
            event_date: ticket.event_date,
            event_time: ticket.event_time,
        }
    }
}
