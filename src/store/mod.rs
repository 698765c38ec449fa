//! Store Module
//!
//! The authoritative in-memory collection of customers, backed by a flat file.
//!
//! ## Responsibilities
//! - Load customers from the backing file at startup (corrupt lines skipped)
//! - Enforce name uniqueness (no overwrite on add)
//! - Rewrite the whole file after every successful mutation
//! - Render the sorted report
//!
//! ## File Format
//! ```text
//! name|age|address|phone\n
//! name|age|address|phone\n
//! ...
//! ```
//!
//! One customer per line, sorted by name, no header. Fields are joined by
//! [`FIELD_DELIMITER`] with no escaping: a field containing the delimiter (or
//! a newline) cannot round-trip through the file and will be dropped or split
//! on the next load. Callers that accept free text are expected to reject
//! both characters up front (see [`Customer::validate_field`]).
//!
//! ## Data Structure Choice
//! BTreeMap behind a RwLock:
//! - Ordered names give the sorted report for free
//! - Concurrent readers, a single writer that persists while holding the lock

mod record;
mod table;

pub use record::{Customer, FIELD_DELIMITER};
pub use table::{LoadStats, RecordStore};
