//! `PostgreSQL` ticket store implementation.
//!
//! Uses the sqlx runtime query API (not the compile-time macros) so the
//! workspace builds without a live database. All status mutations are
//! single `UPDATE … RETURNING` statements, which gives the per-record
//! atomicity the verification path relies on.

use crate::TicketStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatepass_core::ticket::{DEFAULT_EVENT_DATE, DEFAULT_EVENT_TIME};
use gatepass_core::{CheckoutError, NewTicket, Result, Ticket, TicketUpdate};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

const TICKET_COLUMNS: &str = "name, email, quantity, ticket_id, total_amount, payment_id, \
     payment_status, order_id, event_date, event_time, created_at, updated_at";

/// `PostgreSQL`-backed [`TicketStore`].
#[derive(Clone)]
pub struct PostgresTicketStore {
    /// Connection pool, shared across handlers.
    pool: PgPool,
}

/// Raw row shape; status is parsed into the domain enum on the way out.
#[derive(sqlx::FromRow)]
struct TicketRow {
    name: String,
    email: String,
    quantity: i32,
    ticket_id: String,
    total_amount: f64,
    payment_id: Option<String>,
    payment_status: String,
    order_id: String,
    event_date: String,
    event_time: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = CheckoutError;

    fn try_from(row: TicketRow) -> Result<Self> {
        Ok(Self {
            name: row.name,
            email: row.email,
            quantity: row.quantity,
            ticket_id: row.ticket_id,
            total_amount: row.total_amount,
            payment_id: row.payment_id,
            payment_status: row.payment_status.parse()?,
            order_id: row.order_id,
            event_date: row.event_date,
            event_time: row.event_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PostgresTicketStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `PostgreSQL` with bounded pool and acquire timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Store`] if the connection cannot be
    /// established.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| CheckoutError::Store(format!("failed to connect: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Store`] if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CheckoutError::Store(format!("migration failed: {e}")))?;
        Ok(())
    }

    /// Close the pool during graceful shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Access the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_store_err(context: &str, err: &sqlx::Error) -> CheckoutError {
    CheckoutError::Store(format!("{context}: {err}"))
}

/// Map a unique-constraint violation on insert to the domain error the
/// retry loop in the service understands.
fn map_insert_err(err: &sqlx::Error, ticket_id: &str) -> CheckoutError {
    if let sqlx::Error::Database(db) = err {
        if db.code().as_deref() == Some("23505") {
            // The order id is gateway-assigned and unique by contract, so
            // a 23505 that is not the order-id index is an id collision.
            if db.constraint() != Some("tickets_order_id_key") {
                return CheckoutError::DuplicateTicketId {
                    ticket_id: ticket_id.to_string(),
                };
            }
        }
    }
    map_store_err("failed to insert ticket", err)
}

#[async_trait]
impl TicketStore for PostgresTicketStore {
    async fn create_pending(&self, ticket: NewTicket) -> Result<Ticket> {
        ticket.validate()?;

        let sql = format!(
            "INSERT INTO tickets \
               (name, email, quantity, ticket_id, total_amount, payment_status, \
                order_id, event_date, event_time) \
             VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8) \
             RETURNING {TICKET_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(&ticket.name)
            .bind(&ticket.email)
            .bind(ticket.quantity)
            .bind(&ticket.ticket_id)
            .bind(ticket.total_amount)
            .bind(&ticket.order_id)
            .bind(DEFAULT_EVENT_DATE)
            .bind(DEFAULT_EVENT_TIME)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_err(&e, &ticket.ticket_id))?;

        row.try_into()
    }

    async fn find_by_ticket_id(&self, ticket_id: &str) -> Result<Ticket> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = $1");
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_store_err("failed to fetch ticket", &e))?
            .ok_or(CheckoutError::TicketNotFound)?;

        row.try_into()
    }

    async fn update_by_order_id(&self, order_id: &str, update: TicketUpdate) -> Result<Ticket> {
        let sql = format!(
            "UPDATE tickets \
             SET payment_status = $2, payment_id = $3, updated_at = now() \
             WHERE order_id = $1 \
             RETURNING {TICKET_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(order_id)
            .bind(update.payment_status.as_str())
            .bind(&update.payment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_store_err("failed to update ticket", &e))?
            .ok_or(CheckoutError::TicketNotFound)?;

        row.try_into()
    }

    async fn list_all(&self) -> Result<Vec<Ticket>> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, TicketRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_store_err("failed to list tickets", &e))?;

        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn expire_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE tickets \
             SET payment_status = 'failed', updated_at = now() \
             WHERE payment_status = 'pending' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| map_store_err("failed to expire pending tickets", &e))?;

        Ok(result.rows_affected())
    }
}
