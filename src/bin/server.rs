//! custdb Server Binary
//!
//! Starts the TCP server for custdb.

use std::sync::Arc;

use clap::Parser;
use custdb::network::Server;
use custdb::{Config, Dispatcher, RecordStore};
use tracing_subscriber::{fmt, EnvFilter};

/// custdb Server
#[derive(Parser, Debug)]
#[command(name = "custdb-server")]
#[command(about = "Customer record server backed by a flat file")]
#[command(version)]
struct Args {
    /// Data file (created if missing)
    #[arg(short, long, default_value = "data.txt")]
    data_file: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9999")]
    listen: String,

    /// Read timeout per connection in milliseconds (0 disables)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Write timeout per connection in milliseconds (0 disables)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,custdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("custdb Server v{}", custdb::VERSION);
    tracing::info!("Database file: {}", args.data_file);
    tracing::info!("Server address: {}", args.listen);
    tracing::info!("Server PID: {}", std::process::id());

    let config = Config::builder()
        .data_file(&args.data_file)
        .listen_addr(&args.listen)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(2);
    }

    let store = match RecordStore::open(&config.data_file) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    let dispatcher = Arc::new(Dispatcher::new(store));

    let server = match Server::bind(config, dispatcher) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server started");
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
