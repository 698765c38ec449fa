//! Record store implementation
//!
//! BTreeMap-based store with RwLock for concurrency and full-file rewrites
//! for persistence.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::error::{DbError, Result};

use super::Customer;

/// Counters gathered while loading the backing file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Customers accepted into the store
    pub loaded: usize,

    /// Lines discarded for having the wrong field count or an empty name
    pub skipped: usize,

    /// Lines discarded because an earlier line had the same name
    pub duplicates: usize,

    /// True if the file was missing or unreadable and a fresh one was created
    pub created: bool,
}

/// In-memory customer store backed by a flat file
///
/// ## Concurrency: Single-Writer / Multiple-Reader
///
/// - **Reads** (`has`, `get`, `report`): shared read lock, so a report is
///   always a coherent snapshot
/// - **Writes** (`add`, `delete`, `update_*`): exclusive write lock held
///   across the mutation and the file rewrite, so the file on disk always
///   matches some committed in-memory state
/// - File writes are additionally serialized by `file_lock` because an
///   explicit `persist()` only holds the read lock
pub struct RecordStore {
    /// Backing file path
    path: PathBuf,

    /// Customers keyed by name, ordered for reporting
    records: RwLock<BTreeMap<String, Customer>>,

    /// Serializes rewrites of the backing file
    file_lock: Mutex<()>,

    /// What happened during the initial load
    load_stats: LoadStats,
}

impl RecordStore {
    /// Open a store backed by `path`
    ///
    /// Each line is parsed with [`Customer::parse_line`]; invalid lines are
    /// skipped and duplicate names keep their first occurrence. If the file
    /// cannot be read it is (re)created empty. After loading, the file is
    /// rewritten once so that skipped lines do not linger on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut stats = LoadStats::default();
        let mut records = BTreeMap::new();

        match fs::read(&path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                for line in text.lines() {
                    let customer = match Customer::parse_line(line) {
                        Some(customer) => customer,
                        None => {
                            // Blank lines are not worth counting
                            if !line.trim().is_empty() {
                                tracing::debug!("Skipping invalid line in {}: {:?}", path.display(), line);
                                stats.skipped += 1;
                            }
                            continue;
                        }
                    };

                    if records.contains_key(&customer.name) {
                        tracing::debug!("Skipping duplicate customer {:?}", customer.name);
                        stats.duplicates += 1;
                        continue;
                    }

                    records.insert(customer.name.clone(), customer);
                    stats.loaded += 1;
                }
            }
            Err(e) => {
                if e.kind() == ErrorKind::NotFound {
                    tracing::warn!("Database file {} not found, creating new file", path.display());
                } else {
                    tracing::warn!("Invalid database file {} ({}), creating new file", path.display(), e);
                }
                File::create(&path)?;
                stats.created = true;
            }
        }

        let store = Self {
            path,
            records: RwLock::new(records),
            file_lock: Mutex::new(()),
            load_stats: stats,
        };

        if !stats.created {
            store.persist()?;
        }

        tracing::info!(
            "Loaded {} customers from {} ({} invalid lines, {} duplicates skipped)",
            stats.loaded,
            store.path.display(),
            stats.skipped,
            stats.duplicates
        );

        Ok(store)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Check whether a customer with this name exists
    pub fn has(&self, name: &str) -> bool {
        self.records.read().contains_key(name)
    }

    /// Get a copy of a customer by name
    pub fn get(&self, name: &str) -> Option<Customer> {
        self.records.read().get(name).cloned()
    }

    /// Render every customer as one line, sorted by name, each ending in `\n`
    pub fn report(&self) -> String {
        render(&self.records.read())
    }

    /// Number of customers
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// All customer names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.records.read().keys().cloned().collect()
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Statistics from the initial load
    pub fn load_stats(&self) -> LoadStats {
        self.load_stats
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Add a new customer
    ///
    /// Returns `Ok(false)` without touching anything if the name is taken.
    pub fn add(&self, customer: Customer) -> Result<bool> {
        if customer.name.trim().is_empty() {
            return Err(DbError::InvalidRecord("customer name is empty".to_string()));
        }

        let mut records = self.records.write();
        if records.contains_key(&customer.name) {
            return Ok(false);
        }

        records.insert(customer.name.clone(), customer);
        self.write_file(&records)?;
        Ok(true)
    }

    /// Delete a customer by name
    ///
    /// Returns `Ok(false)` if no such customer exists.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let mut records = self.records.write();
        if records.remove(name).is_none() {
            return Ok(false);
        }

        self.write_file(&records)?;
        Ok(true)
    }

    /// Set a customer's age. Returns `Ok(false)` if no such customer exists.
    pub fn update_age(&self, name: &str, age: u32) -> Result<bool> {
        self.update_with(name, |customer| customer.age = age)
    }

    /// Set a customer's address. Returns `Ok(false)` if no such customer exists.
    pub fn update_address(&self, name: &str, address: &str) -> Result<bool> {
        self.update_with(name, |customer| customer.address = address.to_string())
    }

    /// Set a customer's phone. Returns `Ok(false)` if no such customer exists.
    pub fn update_phone(&self, name: &str, phone: &str) -> Result<bool> {
        self.update_with(name, |customer| customer.phone = phone.to_string())
    }

    /// Overwrite the backing file with the current report
    pub fn persist(&self) -> Result<()> {
        let records = self.records.read();
        self.write_file(&records)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Apply `mutate` to an existing customer and persist (write lock held)
    fn update_with<F>(&self, name: &str, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut Customer),
    {
        let mut records = self.records.write();
        match records.get_mut(name) {
            Some(customer) => mutate(customer),
            None => return Ok(false),
        }

        self.write_file(&records)?;
        Ok(true)
    }

    /// Truncate and rewrite the backing file from `records`
    ///
    /// Not atomic: a crash mid-write can leave a partial file.
    fn write_file(&self, records: &BTreeMap<String, Customer>) -> Result<()> {
        let _file_guard = self.file_lock.lock();

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(render(records).as_bytes())?;
        writer.flush()?;

        tracing::trace!("Persisted {} customers to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Render customers as sorted, newline-terminated lines
fn render(records: &BTreeMap<String, Customer>) -> String {
    let mut report = String::new();
    for customer in records.values() {
        report.push_str(&customer.to_line());
        report.push('\n');
    }
    report
}
