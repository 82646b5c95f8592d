//! # spellserv - A Concurrent TCP Spell-Checking Server
//!
//! spellserv accepts TCP connections and distributes them to a fixed pool
//! of worker tasks through a bounded, synchronized hand-off queue. Each
//! connection speaks a line-oriented protocol: the client sends lines of
//! whitespace-separated words, and the server answers one verdict line
//! per word based on a dictionary loaded once at startup.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           spellserv                              │
//! │                                                                  │
//! │  ┌────────────┐  insert   ┌──────────────┐  remove  ┌─────────┐  │
//! │  │ Dispatcher │──────────>│ BoundedQueue │─────────>│ Worker 0│  │
//! │  │(accept loop)│ parks on │  (ring + 2   │ parks on ├─────────┤  │
//! │  └────────────┘   full    │  semaphores) │  empty   │ Worker 1│  │
//! │                           └──────────────┘          ├─────────┤  │
//! │                                                     │ Worker 2│  │
//! │                                                     └────┬────┘  │
//! │                                                          │       │
//! │  ┌──────────────────────┐        lookups (no locks)      │       │
//! │  │ Dictionary (HashSet, │<─────────────────────────────--┘       │
//! │  │ immutable after load)│                                        │
//! │  └──────────────────────┘                                        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The dispatcher is the sole producer and never touches application
//! data; the workers are symmetric consumers with no coordination beyond
//! the shared queue. Connections flow through in strict accept order,
//! and at most the queue's capacity ever wait unserviced - a full queue
//! parks the dispatcher rather than dropping anything, which is the
//! server's entire admission-control mechanism.
//!
//! ## Module Overview
//!
//! - [`queue`]: the bounded FIFO hand-off queue (the concurrent core)
//! - [`pool`]: worker loop and pool lifecycle
//! - [`dispatch`]: the accept loop
//! - [`connection`]: per-connection service loop and server stats
//! - [`protocol`]: line framing and verdict formatting
//! - [`dict`]: the word set
//!
//! ## Quick Start
//!
//! ```ignore
//! use spellserv::connection::ServerStats;
//! use spellserv::dict::Dictionary;
//! use spellserv::dispatch::Dispatcher;
//! use spellserv::pool::WorkerPool;
//! use spellserv::queue::BoundedQueue;
//! use std::sync::Arc;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dict = Arc::new(Dictionary::load("words")?);
//!     let queue = Arc::new(BoundedQueue::new(10)?);
//!     let stats = Arc::new(ServerStats::new());
//!     let (shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let pool = WorkerPool::start(3, Arc::clone(&queue), dict, Arc::clone(&stats))?;
//!     let dispatcher = Dispatcher::bind("127.0.0.1:12345").await?;
//!     dispatcher.run(queue, stats, shutdown_rx).await;
//!
//!     pool.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod dict;
pub mod dispatch;
pub mod pool;
pub mod protocol;
pub mod queue;

// Re-export commonly used types for convenience
pub use connection::{handle_connection, Conn, ConnectionError, ServerStats};
pub use dict::{Dictionary, DictionaryError};
pub use dispatch::Dispatcher;
pub use pool::{PoolError, WorkerPool};
pub use queue::{BoundedQueue, QueueError};

/// The default port spellserv listens on
pub const DEFAULT_PORT: u16 = 12345;

/// The default host spellserv binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default dictionary file path
pub const DEFAULT_DICTIONARY: &str = "words";

/// The default number of workers in the pool
pub const DEFAULT_WORKERS: usize = 3;

/// The default capacity of the hand-off queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Version of spellserv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
