//! Checkout service and HTTP surface for Gatepass.
//!
//! # Request Flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extract data** from the JSON body or path
//! 3. **Call the checkout service**, which orchestrates the ticket store
//!    and the payment gateway
//! 4. **Map the result** to an HTTP response via [`AppError`]
//!
//! The service layer owns the order-creation / payment-verification
//! protocol; handlers stay thin adapters over it.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod state;
pub mod sweep;

pub use config::Config;
pub use error::AppError;
pub use routes::build_router;
pub use service::CheckoutService;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
