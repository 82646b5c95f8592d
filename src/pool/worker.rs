//! The Worker Loop
//!
//! Each worker runs this loop for the life of the pool: park on the
//! queue, service the connection it receives, close it, park again. The
//! loop carries no state between iterations, so one failed connection
//! can never affect the next.

use crate::connection::{handle_connection, Conn, ServerStats};
use crate::dict::Dictionary;
use crate::queue::BoundedQueue;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Runs one worker until the pool signals shutdown.
///
/// The shutdown signal is observed only while parked on the queue - a
/// connection already in hand is always serviced to completion before
/// the worker exits.
pub async fn worker_loop(
    worker_id: usize,
    queue: Arc<BoundedQueue<Conn>>,
    dict: Arc<Dictionary>,
    stats: Arc<ServerStats>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    trace!(worker = worker_id, "Worker started");

    loop {
        let conn = tokio::select! {
            conn = queue.remove() => conn,
            _ = shutdown_rx.changed() => {
                debug!(worker = worker_id, "Worker received shutdown signal");
                break;
            }
        };

        trace!(worker = worker_id, client = %conn.addr, "Picked up connection");

        // handle_connection closes the stream on every exit path and
        // keeps per-connection errors to itself.
        handle_connection(conn, Arc::clone(&dict), Arc::clone(&stats)).await;
    }

    trace!(worker = worker_id, "Worker stopped");
}
