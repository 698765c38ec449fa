//! Dispatch Module
//!
//! Maps decoded commands onto the record store and turns every outcome into
//! a [`Response`].
//!
//! ## Responsibilities
//! - Validate arguments the store cannot validate itself (customer line, age)
//! - Route each command to exactly one store operation
//! - Never fail: store errors become `Response::StorageError`

use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{Command, Response};
use crate::store::{Customer, RecordStore};

/// Routes commands to the record store
///
/// Cheap to share: the store lives behind an `Arc` and does its own locking,
/// so one dispatcher serves every connection.
pub struct Dispatcher {
    /// The store every command operates on
    store: Arc<RecordStore>,

    /// Process id reported by `get_pid`
    pid: u32,
}

impl Dispatcher {
    /// Create a dispatcher reporting the current process id
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self::with_pid(store, std::process::id())
    }

    /// Create a dispatcher reporting an explicit process id
    pub fn with_pid(store: Arc<RecordStore>, pid: u32) -> Self {
        Self { store, pid }
    }

    /// Execute a command
    ///
    /// Total over every command; each failure path has its own response.
    pub fn execute(&self, command: Command) -> Response {
        let command_type = command.command_type();
        let response = self.route(command);

        if response.is_mutation() {
            tracing::debug!("{}: {}", command_type.name(), response);
        }
        response
    }

    fn route(&self, command: Command) -> Response {
        match command {
            Command::FindCustomer { name } => self.find_customer(&name),
            Command::AddCustomer { line } => self.add_customer(&line),
            Command::DeleteCustomer { name } => {
                mutation(self.store.delete(&name), Response::CustomerDeleted)
            }
            Command::UpdateAge { name, age } => self.update_age(&name, &age),
            Command::UpdateAddress { name, address } => mutation(
                self.store.update_address(&name, &address),
                Response::AddressUpdated,
            ),
            Command::UpdatePhone { name, phone } => {
                mutation(self.store.update_phone(&name, &phone), Response::PhoneUpdated)
            }
            Command::PrintReport => Response::Report(self.store.report()),
            Command::GetPid => Response::Pid(self.pid),
        }
    }

    fn find_customer(&self, name: &str) -> Response {
        match self.store.get(name) {
            Some(customer) => Response::Customer(customer),
            None => Response::CustomerNotFound,
        }
    }

    /// Validate the submitted line before the store sees it
    fn add_customer(&self, line: &str) -> Response {
        let customer = match Customer::parse_strict(line) {
            Ok(customer) => customer,
            Err(e) => {
                tracing::debug!("Rejecting customer line {:?}: {}", line, e);
                return Response::InvalidCustomer;
            }
        };

        match self.store.add(customer) {
            Ok(true) => Response::CustomerAdded,
            Ok(false) => Response::CustomerExists,
            Err(e) => storage_error(e),
        }
    }

    /// The age is checked before the name, so a bad age wins over a missing customer
    fn update_age(&self, name: &str, age: &str) -> Response {
        let age = match age.trim().parse::<u32>() {
            Ok(age) => age,
            Err(_) => return Response::InvalidAge,
        };

        mutation(self.store.update_age(name, age), Response::AgeUpdated)
    }

    /// Get the underlying store
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Process id reported by `get_pid`
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

/// Map a found / not-found store outcome to a response
fn mutation(outcome: Result<bool>, success: Response) -> Response {
    match outcome {
        Ok(true) => success,
        Ok(false) => Response::CustomerNotFound,
        Err(e) => storage_error(e),
    }
}

fn storage_error(e: crate::DbError) -> Response {
    tracing::error!("Failed to persist store: {}", e);
    Response::StorageError
}
