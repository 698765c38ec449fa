//! # custdb
//!
//! A small client-server customer record store with:
//! - An in-memory store keyed by customer name
//! - Full rewrite of a flat `name|age|address|phone` file after every change
//! - Single-writer/multi-reader concurrency model
//! - A line-oriented TCP protocol, one request per connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │          (acceptor + thread per conn, 1 req/conn)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  protocol::read_command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Dispatcher                               │
//! │          (Command -> store call -> Response)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐        ┌──────────────┐
//!               │  RecordStore  │ ─────▶ │  data file   │
//!               │   (RwLock)    │rewrite │ (flat text)  │
//!               └───────────────┘        └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod protocol;
pub mod dispatch;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DbError, Result};
pub use config::Config;
pub use store::{Customer, RecordStore};
pub use dispatch::Dispatcher;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of custdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
