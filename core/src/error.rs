//! Error taxonomy for checkout operations.

use thiserror::Error;

/// Result type alias for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Error taxonomy for the order-creation / payment-verification flow.
///
/// Variants are organized by where the failure originates so the web layer
/// can map them to HTTP statuses without inspecting message text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    // ═══════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════
    /// Request input is missing or out of range.
    #[error("Invalid input: {0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // Business Outcomes
    // ═══════════════════════════════════════════════════════════
    /// Gateway callback signature did not match the expected HMAC.
    ///
    /// Not a system fault: the ticket is marked failed and the buyer is
    /// told verification failed.
    #[error("Payment verification failed")]
    SignatureMismatch,

    // ═══════════════════════════════════════════════════════════
    // Store Errors
    // ═══════════════════════════════════════════════════════════
    /// No ticket matches the given identifier.
    #[error("Ticket not found")]
    TicketNotFound,

    /// A ticket with this ticket id already exists.
    ///
    /// Callers should regenerate the id and retry, capped at a small
    /// attempt count.
    #[error("Duplicate ticket id: {ticket_id}")]
    DuplicateTicketId {
        /// The colliding ticket id.
        ticket_id: String,
    },

    /// Underlying storage failure.
    #[error("Store error: {0}")]
    Store(String),

    // ═══════════════════════════════════════════════════════════
    // External Service Errors
    // ═══════════════════════════════════════════════════════════
    /// The payment gateway rejected or failed the request.
    #[error("Payment gateway error: {0}")]
    Gateway(String),
}

impl CheckoutError {
    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gatepass_core::CheckoutError;
    /// assert!(CheckoutError::Validation("quantity".into()).is_user_error());
    /// assert!(!CheckoutError::Store("down".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::SignatureMismatch)
    }

    /// Returns `true` if retrying the same operation could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DuplicateTicketId { .. })
    }
}
