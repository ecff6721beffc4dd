//! Reconciliation sweep for stale pending tickets.
//!
//! A gateway order whose buyer never completed payment, or whose local
//! verification never arrived, leaves a ticket stuck in `pending`. The
//! sweep expires such tickets to `failed` once they outlive the configured
//! TTL, so the store converges on terminal states without manual cleanup.

use chrono::Duration as ChronoDuration;
use gatepass_store::TicketStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Spawn the background sweep task.
///
/// Runs every `interval`, expiring pending tickets older than `ttl`.
/// Flipping the `shutdown` watch channel to `true` stops the task after
/// the current iteration.
pub fn spawn(
    store: Arc<dyn TicketStore>,
    interval: Duration,
    ttl: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        // The immediate first tick would race server startup; skip it.
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    run_once(store.as_ref(), ttl).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Reconciliation sweep stopping");
                        break;
                    }
                }
            }
        }
    })
}

/// One sweep pass. Failures are logged, never fatal: the next pass retries.
async fn run_once(store: &dyn TicketStore, ttl: Duration) {
    let Ok(ttl) = ChronoDuration::from_std(ttl) else {
        tracing::warn!("Pending-ticket TTL out of range, skipping sweep");
        return;
    };
    let cutoff = chrono::Utc::now() - ttl;

    match store.expire_stale_pending(cutoff).await {
        Ok(0) => {}
        Ok(expired) => {
            tracing::info!(expired, %cutoff, "Expired stale pending tickets");
        }
        Err(err) => {
            tracing::warn!(error = %err, "Reconciliation sweep failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gatepass_core::{NewTicket, PaymentStatus};
    use gatepass_store::InMemoryTicketStore;

    fn pending_ticket(n: u32) -> NewTicket {
        NewTicket {
            name: format!("Buyer {n}"),
            email: format!("buyer{n}@example.com"),
            quantity: 1,
            ticket_id: format!("TKT-{n}-SWEEPTEST0"),
            total_amount: 100.0,
            order_id: format!("order_{n}"),
        }
    }

    #[tokio::test]
    async fn run_once_expires_stale_pending_tickets() {
        let store = InMemoryTicketStore::new();
        store.create_pending(pending_ticket(1)).await.unwrap();

        // Zero TTL: everything pending is already stale.
        run_once(&store, Duration::ZERO).await;

        let tickets = store.list_all().await.unwrap();
        assert_eq!(tickets[0].payment_status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn run_once_leaves_fresh_tickets_alone() {
        let store = InMemoryTicketStore::new();
        store.create_pending(pending_ticket(1)).await.unwrap();

        run_once(&store, Duration::from_secs(3600)).await;

        let tickets = store.list_all().await.unwrap();
        assert_eq!(tickets[0].payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_task() {
        let store: Arc<dyn TicketStore> = Arc::new(InMemoryTicketStore::new());
        let (tx, rx) = watch::channel(false);

        let handle = spawn(store, Duration::from_secs(3600), Duration::ZERO, rx);
        tx.send(true).unwrap();

        // The task observes the signal and exits without being aborted.
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
