//! Ticket lookup and admin listing endpoints.

use crate::error::AppError;
use crate::state::AppState;
use crate::WebResult;
use axum::{
    extract::{Path, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    Json,
};
use constant_time_eq::constant_time_eq;
use gatepass_core::Ticket;

/// Fetch one ticket by its ticket id.
///
/// # Endpoint
///
/// ```text
/// GET /ticket/:ticket_id
/// ```
///
/// # Errors
///
/// `404` when no ticket matches.
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> WebResult<Json<Ticket>> {
    let ticket = state.service.get_ticket(&ticket_id).await?;
    Ok(Json(ticket))
}

/// List all tickets, newest first. Administrative.
///
/// Gated by a shared bearer token; when no token is configured the
/// endpoint stays locked rather than open.
///
/// # Endpoint
///
/// ```text
/// GET /tickets
/// Authorization: Bearer <admin token>
/// ```
///
/// # Errors
///
/// `401` when the token is missing, wrong, or not configured.
pub async fn list_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> WebResult<Json<Vec<Ticket>>> {
    authorize_admin(&state, &headers)?;
    let tickets = state.service.list_tickets().await?;
    Ok(Json(tickets))
}

fn authorize_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(AppError::unauthorized("Admin access is not configured"));
    };

    let supplied = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("Missing admin token"))?;

    if constant_time_eq(supplied.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(AppError::unauthorized("Invalid admin token"))
    }
}
