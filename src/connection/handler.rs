//! Per-Connection Spell-Check Service Loop
//!
//! Each accepted connection is serviced by exactly one worker at a time.
//! The handler owns the stream for the duration: it accumulates incoming
//! bytes in a `BytesMut` buffer, carves out newline-terminated lines, and
//! answers one verdict line per word.
//!
//! ## Buffer Management
//!
//! TCP is a stream protocol - a single read may deliver a partial line or
//! several lines at once. The buffer absorbs that mismatch. A hard cap
//! bounds the memory one client can pin with an endless unterminated line.

use crate::dict::Dictionary;
use crate::protocol::{check_line, extract_line, verdict_line};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Maximum size for the read buffer (64 KB)
const MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// An accepted connection awaiting or undergoing service.
///
/// This is the unit that travels through the bounded queue: the
/// dispatcher creates it, a worker consumes it, and dropping it closes
/// the socket.
#[derive(Debug)]
pub struct Conn {
    /// The TCP stream for this connection
    pub stream: TcpStream,
    /// Client's address (for logging)
    pub addr: SocketAddr,
}

/// Server-wide counters, shared across the dispatcher and all workers.
#[derive(Debug, Default)]
pub struct ServerStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections (queued or being serviced)
    pub active_connections: AtomicU64,
    /// Connections serviced to completion (cleanly or not)
    pub connections_serviced: AtomicU64,
    /// Total lines processed
    pub lines_processed: AtomicU64,
    /// Total words checked
    pub words_checked: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_accepted(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_serviced(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
        self.connections_serviced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn line_processed(&self) {
        self.lines_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn word_checked(&self) {
        self.words_checked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Errors that can end a connection's service loop.
///
/// All of these are local to the one connection; none of them reach the
/// worker pool or the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A client sent an unterminated line past the buffer cap
    #[error("line exceeds {MAX_BUFFER_SIZE} byte limit")]
    LineTooLong,
}

/// Services a single client connection.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The word set to check against (shared, read-only)
    dict: Arc<Dictionary>,

    /// Server statistics (shared)
    stats: Arc<ServerStats>,
}

impl ConnectionHandler {
    /// Creates a handler for one accepted connection.
    pub fn new(conn: Conn, dict: Arc<Dictionary>, stats: Arc<ServerStats>) -> Self {
        Self {
            stream: BufWriter::new(conn.stream),
            addr: conn.addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            dict,
            stats,
        }
    }

    /// Runs the service loop to completion.
    ///
    /// Returns when the peer closes the connection or an error ends the
    /// loop. Either way the stream is dropped (and so closed) on return;
    /// the `connections_serviced` counter ticks exactly once per run.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Servicing connection");

        let result = self.service_loop().await;

        match &result {
            Ok(()) => debug!(client = %self.addr, "Client disconnected"),
            Err(e) => match e {
                ConnectionError::Io(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        self.stats.connection_serviced();
        result
    }

    /// The main read-check-respond loop.
    async fn service_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = extract_line(&mut self.buffer) {
                self.answer_line(&line).await?;
            }

            if !self.read_more_data().await? {
                // Clean peer shutdown. The original protocol treats bytes
                // before EOF as a final line even without a newline.
                if !self.buffer.is_empty() {
                    let line = self.buffer.split().freeze();
                    self.answer_line(&line).await?;
                }
                return Ok(());
            }
        }
    }

    /// Checks every word of one line and writes the verdicts back.
    async fn answer_line(&mut self, line: &[u8]) -> Result<(), ConnectionError> {
        // Non-UTF-8 input can't match any dictionary word; check it
        // lossily rather than dropping the connection over encoding.
        let line = String::from_utf8_lossy(line);
        self.stats.line_processed();

        for (word, correct) in check_line(&line, &self.dict) {
            let verdict = verdict_line(word, correct);
            self.stream.write_all(verdict.as_bytes()).await?;
            self.stats.word_checked();
            self.stats.bytes_written(verdict.len());
            trace!(client = %self.addr, word, correct, "Verdict sent");
        }
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads more data from the socket into the buffer.
    ///
    /// Returns `false` on clean peer shutdown (zero-byte read).
    async fn read_more_data(&mut self) -> Result<bool, ConnectionError> {
        if self.buffer.len() >= MAX_BUFFER_SIZE {
            warn!(
                client = %self.addr,
                size = self.buffer.len(),
                "Buffer size limit exceeded"
            );
            return Err(ConnectionError::LineTooLong);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;
        if n == 0 {
            return Ok(false);
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");
        Ok(true)
    }
}

/// Services a connection to completion, swallowing per-connection errors.
///
/// This is what a worker calls: whatever happens inside, the connection
/// is closed on return and the error never travels further than a log
/// line.
pub async fn handle_connection(conn: Conn, dict: Arc<Dictionary>, stats: Arc<ServerStats>) {
    let addr = conn.addr;
    let handler = ConnectionHandler::new(conn, dict, stats);
    if let Err(e) = handler.run().await {
        debug!(client = %addr, error = %e, "Connection ended with error");
    }
}
