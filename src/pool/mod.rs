//! Worker Pool Module
//!
//! A fixed set of symmetric, long-lived worker tasks that drain the
//! bounded queue forever. Workers have no identity beyond a numeric id
//! for logging and no state beyond the connection currently in hand;
//! any idle worker may pick up the next connection.
//!
//! ```text
//!                 ┌──────────────┐
//!  BoundedQueue ──│  remove()    │──> service connection ──> close ──┐
//!                 └──────────────┘                                   │
//!                        ▲                                           │
//!                        └───────────────────────────────────────────┘
//! ```
//!
//! The pool's default lifetime matches the server's: started once, runs
//! until the process exits. A shutdown signal exists so the Ctrl+C path
//! and tests can tear the pool down deterministically; workers observe it
//! while parked on the queue, and a worker mid-connection finishes that
//! connection first.

pub mod worker;

use crate::connection::{Conn, ServerStats};
use crate::dict::Dictionary;
use crate::queue::BoundedQueue;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Errors that can occur when starting a pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The requested pool size was zero
    #[error("worker pool needs at least 1 worker")]
    NoWorkers,
}

/// A handle to a running set of workers.
///
/// Dropping the handle signals shutdown; [`WorkerPool::shutdown`] does
/// the same but also waits for every worker to finish its in-flight
/// connection and exit.
#[derive(Debug)]
pub struct WorkerPool {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
    /// Join handles for the spawned workers
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers, all sharing one queue and one dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NoWorkers`] if `size` is zero.
    pub fn start(
        size: usize,
        queue: Arc<BoundedQueue<Conn>>,
        dict: Arc<Dictionary>,
        stats: Arc<ServerStats>,
    ) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::NoWorkers);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handles = (0..size)
            .map(|worker_id| {
                tokio::spawn(worker::worker_loop(
                    worker_id,
                    Arc::clone(&queue),
                    Arc::clone(&dict),
                    Arc::clone(&stats),
                    shutdown_rx.clone(),
                ))
            })
            .collect();

        info!(workers = size, "Worker pool started");

        Ok(Self {
            shutdown_tx,
            handles,
        })
    }

    /// Returns the number of workers in the pool.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Signals shutdown and waits for every worker to exit.
    ///
    /// A worker parked on the queue wakes immediately; a worker servicing
    /// a connection finishes it first. Connections still buffered in the
    /// queue at this point are dropped (closed) with the queue.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles.drain(..) {
            // A worker panic has already been logged by the runtime;
            // shutdown proceeds with the remaining workers.
            let _ = handle.await;
        }
        info!("Worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
