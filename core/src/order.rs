//! Order-input validation and ticket-id generation.

use crate::error::{CheckoutError, Result};
use chrono::Utc;
use rand::Rng;
use serde::Deserialize;

/// Minimum tickets per order.
pub const MIN_QUANTITY: i32 = 1;

/// Maximum tickets per order.
pub const MAX_QUANTITY: i32 = 10;

/// Random suffix length of generated ticket ids.
///
/// Wider than strictly needed so that ids generated within the same
/// millisecond stay collision-free even at unrealistic creation rates.
const SUFFIX_LEN: usize = 10;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Raw order-creation input as received from the client.
///
/// Fields default when absent so that a missing field surfaces as a
/// validation failure (HTTP 400) rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderRequest {
    /// Total amount in major currency units.
    pub amount: f64,
    /// Buyer name.
    pub name: String,
    /// Buyer email.
    pub email: String,
    /// Number of tickets.
    pub quantity: i32,
}

/// Order input that passed validation: fields trimmed and normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    /// Total amount in major currency units, strictly positive.
    pub amount: f64,
    /// Trimmed buyer name, non-empty.
    pub name: String,
    /// Trimmed, lowercased buyer email, non-empty.
    pub email: String,
    /// Number of tickets, within 1–10.
    pub quantity: i32,
}

impl ValidatedOrder {
    /// The amount expressed in the gateway's minor currency unit.
    ///
    /// Gatepass charges in a 2-decimal currency, so major units are
    /// multiplied by 100 and rounded.
    #[must_use]
    pub fn amount_minor_units(&self) -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        {
            (self.amount * 100.0).round() as i64
        }
    }
}

impl OrderRequest {
    /// Validate and normalize the request.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] when the name or email is empty
    /// after trimming, the amount is not strictly positive and finite, or
    /// the quantity is outside 1–10.
    pub fn validate(&self) -> Result<ValidatedOrder> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_lowercase();

        if name.is_empty() {
            return Err(CheckoutError::Validation("name is required".into()));
        }
        if email.is_empty() {
            return Err(CheckoutError::Validation("email is required".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CheckoutError::Validation(
                "amount must be a positive number".into(),
            ));
        }
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&self.quantity) {
            return Err(CheckoutError::Validation(format!(
                "quantity must be between {MIN_QUANTITY} and {MAX_QUANTITY}"
            )));
        }

        Ok(ValidatedOrder {
            amount: self.amount,
            name,
            email,
            quantity: self.quantity,
        })
    }
}

/// Generate a collision-resistant ticket id.
///
/// Shape: `TKT-{unix_millis}-{10 uppercase alphanumerics}`. The id is
/// generated before any gateway call, doubles as the gateway receipt, and
/// is safe to echo back to the client.
#[must_use]
pub fn generate_ticket_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("TKT-{millis}-{suffix}")
}
