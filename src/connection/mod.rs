//! Connection Handling Module
//!
//! A connection's life in spellserv has two distinct owners. The
//! dispatcher accepts it and wraps it into a [`Conn`] handle, then hands
//! it through the bounded queue; whichever worker removes it owns it
//! exclusively until the service loop ends and the handle is dropped
//! (closing the socket). No connection is ever shared or re-queued.
//!
//! ## Service Loop
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  Read bytes into BytesMut    │<────────────┐
//! └──────────────┬───────────────┘             │
//!                ▼                             │
//! ┌──────────────────────────────┐             │
//! │  Carve complete lines        │             │
//! └──────────────┬───────────────┘             │
//!                ▼                             │
//! ┌──────────────────────────────┐             │
//! │  Check each word, write      │─────────────┘
//! │  verdict lines back          │
//! └──────────────────────────────┘
//!
//! EOF / error ──> drop handle (socket closed)
//! ```
//!
//! A per-connection failure is strictly local: the worker logs it, closes
//! the handle, and goes straight back to the queue for the next one.

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, Conn, ConnectionError, ConnectionHandler, ServerStats};
