//! spellserv - A Concurrent TCP Spell-Checking Server
//!
//! This is the main entry point for the spellserv binary.
//! It loads the dictionary, builds the bounded queue and worker pool,
//! and runs the dispatcher's accept loop until Ctrl+C.

use anyhow::Context;
use spellserv::connection::ServerStats;
use spellserv::dict::Dictionary;
use spellserv::dispatch::Dispatcher;
use spellserv::pool::WorkerPool;
use spellserv::queue::BoundedQueue;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Path to the dictionary word file
    dictionary: String,
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Number of workers in the pool
    workers: usize,
    /// Capacity of the hand-off queue
    queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: spellserv::DEFAULT_DICTIONARY.to_string(),
            host: spellserv::DEFAULT_HOST.to_string(),
            port: spellserv::DEFAULT_PORT,
            workers: spellserv::DEFAULT_WORKERS,
            queue_capacity: spellserv::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// Positional arguments are `[DICTIONARY] [PORT]`, in that order;
    /// either may be omitted to use the built-in default.
    fn from_args() -> Self {
        let mut config = Config::default();
        let mut positional = 0;

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("spellserv version {}", spellserv::VERSION);
                    std::process::exit(0);
                }
                _ if arg.starts_with('-') => {
                    eprintln!("Unknown argument: {arg}");
                    print_help();
                    std::process::exit(1);
                }
                _ => {
                    match positional {
                        0 => config.dictionary = arg,
                        1 => {
                            config.port = arg.parse().unwrap_or_else(|_| {
                                eprintln!("Error: invalid port number: {arg}");
                                std::process::exit(1);
                            })
                        }
                        _ => {
                            eprintln!("Unexpected argument: {arg}");
                            print_help();
                            std::process::exit(1);
                        }
                    }
                    positional += 1;
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
spellserv - A Concurrent TCP Spell-Checking Server

USAGE:
    spellserv [DICTIONARY] [PORT]

ARGS:
    DICTIONARY    Path to the word file, one word per line (default: words)
    PORT          Port to listen on (default: 12345)

OPTIONS:
    -v, --version    Print version information
        --help       Print this help message

EXAMPLES:
    spellserv                          # words file, port 12345
    spellserv /usr/share/dict/words    # system word list
    spellserv words 2200               # custom port

CONNECTING:
    $ nc localhost 12345
    cat dog bird
    cat is correct
    dog is correct
    bird is not correct
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!(
        "spellserv v{} on {} ({} workers, queue capacity {})",
        spellserv::VERSION,
        config.bind_address(),
        config.workers,
        config.queue_capacity,
    );

    // Load the dictionary (shared read-only across all workers)
    let dict = Arc::new(
        Dictionary::load(&config.dictionary)
            .with_context(|| format!("loading dictionary {}", config.dictionary))?,
    );

    // Build the hand-off queue and server stats
    let queue = Arc::new(
        BoundedQueue::new(config.queue_capacity).context("creating hand-off queue")?,
    );
    let stats = Arc::new(ServerStats::new());

    // Start the worker pool
    let pool = WorkerPool::start(
        config.workers,
        Arc::clone(&queue),
        Arc::clone(&dict),
        Arc::clone(&stats),
    )
    .context("starting worker pool")?;

    // Bind the listener (fatal on failure)
    let dispatcher = Dispatcher::bind(&config.bind_address())
        .await
        .with_context(|| format!("binding {}", config.bind_address()))?;

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Run the accept loop until Ctrl+C
    tokio::select! {
        _ = dispatcher.run(Arc::clone(&queue), Arc::clone(&stats), shutdown_rx) => {}
        _ = shutdown => {}
    }

    // Stop accepting, then let workers finish their in-flight connections
    let _ = shutdown_tx.send(true);
    pool.shutdown().await;

    info!(
        accepted = stats
            .connections_accepted
            .load(std::sync::atomic::Ordering::Relaxed),
        serviced = stats
            .connections_serviced
            .load(std::sync::atomic::Ordering::Relaxed),
        words = stats.words_checked.load(std::sync::atomic::Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}
