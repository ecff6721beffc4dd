//! Router configuration.

use crate::handlers::{health, orders, tickets};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all endpoints.
///
/// The original client is a browser app served from a different origin, so
/// CORS is permissive; request/response pairs are traced.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/create-order", post(orders::create_order))
        .route("/verify-payment", post(orders::verify_payment))
        .route("/ticket/:ticket_id", get(tickets::get_ticket))
        .route("/tickets", get(tickets::list_tickets))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
