//! Bounded Hand-Off Queue Module
//!
//! This module implements the synchronized hand-off point between the
//! dispatcher (the single producer) and the worker pool (the consumers).
//! It is the only piece of spellserv with real concurrency hazards, so it
//! gets its own module and the bulk of the test coverage.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   insert()    ┌──────────────────────┐   remove()   ┌──────────┐
//! │  Dispatcher  │──────────────>│     BoundedQueue     │─────────────>│ Worker 0 │
//! │ (accept loop)│  parks when   │                      │  parks when  ├──────────┤
//! └──────────────┘  queue full   │  ring: [ C ][ D ][ ]│  queue empty │ Worker 1 │
//!                                │         ▲front  ▲rear│              ├──────────┤
//!                                │  slots / items perms │              │ Worker N │
//!                                └──────────────────────┘              └──────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Strict FIFO**: connections are handed out in accept order.
//! - **Bounded**: at most `capacity` connections wait at any moment; the
//!   dispatcher parks on `insert` instead of dropping or erroring. This is
//!   the server's sole admission-control mechanism.
//! - **No double delivery**: each queued item is returned by exactly one
//!   `remove` call.
//!
//! There is no "queue full" or "queue empty" error surface at all - both
//! conditions resolve by awaiting, never by a reported failure.

pub mod bounded;

// Re-export commonly used types
pub use bounded::{BoundedQueue, QueueError};
