//! Network Module
//!
//! TCP server, per-connection handling and the client.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per accepted connection, joined on shutdown
//! - One request and one response per connection
//! - Commands routed through the Dispatcher

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::{Connection, ConnectionState};
pub use client::Client;
