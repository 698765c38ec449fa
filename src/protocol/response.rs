//! Response definitions
//!
//! Represents responses to clients. Every variant renders to the exact text
//! sent on the wire.

use std::fmt;

use crate::store::Customer;

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// find_customer hit: the customer's `name|age|address|phone` line
    Customer(Customer),
    CustomerNotFound,
    CustomerAdded,
    CustomerExists,
    InvalidCustomer,
    CustomerDeleted,
    AgeUpdated,
    InvalidAge,
    AddressUpdated,
    PhoneUpdated,

    /// print_report: one line per customer, sorted by name
    Report(String),

    /// get_pid: the server's process id
    Pid(u32),

    /// Unknown operation or unreadable request
    InvalidRequest,

    /// The mutation was applied in memory but the file rewrite failed
    StorageError,
}

impl Response {
    /// True for responses that report a change to the store
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Response::CustomerAdded
                | Response::CustomerDeleted
                | Response::AgeUpdated
                | Response::AddressUpdated
                | Response::PhoneUpdated
        )
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Customer(customer) => write!(f, "{}", customer),
            Response::CustomerNotFound => f.write_str("Customer not found"),
            Response::CustomerAdded => f.write_str("Customer added"),
            Response::CustomerExists => f.write_str("Customer already exists"),
            Response::InvalidCustomer => f.write_str("Invalid customer"),
            Response::CustomerDeleted => f.write_str("Customer deleted"),
            Response::AgeUpdated => f.write_str("Age updated"),
            Response::InvalidAge => f.write_str("Invalid age"),
            Response::AddressUpdated => f.write_str("Address updated"),
            Response::PhoneUpdated => f.write_str("Phone number updated"),
            Response::Report(report) => f.write_str(report),
            Response::Pid(pid) => write!(f, "{}", pid),
            Response::InvalidRequest => f.write_str("Invalid request"),
            Response::StorageError => f.write_str("Storage error"),
        }
    }
}
