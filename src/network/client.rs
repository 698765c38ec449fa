//! Client
//!
//! Opens one connection per request, like the server expects.

use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::error::{DbError, Result};
use crate::protocol::{encode_command, read_response, Command};
use crate::store::Customer;

/// Client for a custdb server
#[derive(Debug, Clone)]
pub struct Client {
    /// Server address (host:port)
    addr: String,

    /// Read/write timeout applied to each connection
    timeout: Option<Duration>,
}

impl Client {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: None,
        }
    }

    /// Apply a read/write timeout to every connection
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send one command on a fresh connection and return the response text
    ///
    /// The command is encoded before connecting, so invalid input never
    /// reaches the server. Failing to connect is a `DbError::Network`.
    pub fn request(&self, command: &Command) -> Result<String> {
        let bytes = encode_command(command)?;

        let mut stream = TcpStream::connect(&self.addr).map_err(|e| {
            DbError::Network(format!("Connection to {} failed: {}", self.addr, e))
        })?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;

        stream.write_all(&bytes)?;
        stream.flush()?;
        stream.shutdown(Shutdown::Write)?;

        read_response(&mut stream)
    }

    pub fn find_customer(&self, name: &str) -> Result<String> {
        self.request(&Command::FindCustomer {
            name: name.to_string(),
        })
    }

    /// Add a customer; fields containing `|` or line breaks are refused
    pub fn add_customer(&self, customer: &Customer) -> Result<String> {
        Customer::validate_field(&customer.name)?;
        Customer::validate_field(&customer.address)?;
        Customer::validate_field(&customer.phone)?;

        self.request(&Command::AddCustomer {
            line: customer.to_line(),
        })
    }

    pub fn delete_customer(&self, name: &str) -> Result<String> {
        self.request(&Command::DeleteCustomer {
            name: name.to_string(),
        })
    }

    pub fn update_age(&self, name: &str, age: u32) -> Result<String> {
        self.request(&Command::UpdateAge {
            name: name.to_string(),
            age: age.to_string(),
        })
    }

    pub fn update_address(&self, name: &str, address: &str) -> Result<String> {
        Customer::validate_field(address)?;
        self.request(&Command::UpdateAddress {
            name: name.to_string(),
            address: address.to_string(),
        })
    }

    pub fn update_phone(&self, name: &str, phone: &str) -> Result<String> {
        Customer::validate_field(phone)?;
        self.request(&Command::UpdatePhone {
            name: name.to_string(),
            phone: phone.to_string(),
        })
    }

    /// Fetch the full report (one line per customer, sorted by name)
    pub fn print_report(&self) -> Result<String> {
        self.request(&Command::PrintReport)
    }

    /// Fetch the server's process id
    pub fn get_pid(&self) -> Result<u32> {
        let response = self.request(&Command::GetPid)?;
        response
            .trim()
            .parse()
            .map_err(|_| DbError::Protocol(format!("Invalid pid response: {:?}", response)))
    }
}
