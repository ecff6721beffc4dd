//! Application state shared across HTTP handlers.

use crate::service::CheckoutService;
use std::sync::Arc;

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Checkout orchestration service.
    pub service: Arc<CheckoutService>,
    /// Public gateway key id, returned to clients so they can open the
    /// payment widget. The only credential allowed in responses.
    pub gateway_key_id: String,
    /// Shared admin token gating the ticket listing; `None` keeps the
    /// listing locked.
    pub admin_token: Option<String>,
}

impl AppState {
    /// Create application state.
    #[must_use]
    pub const fn new(
        service: Arc<CheckoutService>,
        gateway_key_id: String,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            service,
            gateway_key_id,
            admin_token,
        }
    }
}
