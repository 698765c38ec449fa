//! Customer record definitions
//!
//! Parsing and formatting of the `name|age|address|phone` line shared by the
//! backing file and the `add_customer` request.

use std::fmt;

use crate::error::{DbError, Result};

/// Separator between the four fields of a customer line
pub const FIELD_DELIMITER: char = '|';

/// Number of fields in a customer line
const FIELD_COUNT: usize = 4;

/// A single customer record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Unique key, never empty
    pub name: String,

    pub age: u32,

    pub address: String,

    pub phone: String,
}

impl Customer {
    /// Create a customer from its four fields
    pub fn new(
        name: impl Into<String>,
        age: u32,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            address: address.into(),
            phone: phone.into(),
        }
    }

    /// Parse a line read from the backing file
    ///
    /// Returns `None` if the line does not split into exactly four fields or
    /// the name is empty. An unparsable age becomes 0 instead of rejecting
    /// the line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let [name, age, address, phone] = split_fields(line)?;

        Some(Self::new(name, age.parse().unwrap_or(0), address, phone))
    }

    /// Parse a line submitted by a client
    ///
    /// Same splitting and trimming as [`Customer::parse_line`], but an age
    /// that is not a non-negative integer is an error rather than 0.
    pub fn parse_strict(line: &str) -> Result<Self> {
        let [name, age, address, phone] = split_fields(line).ok_or_else(|| {
            DbError::InvalidRecord(format!(
                "expected {} non-empty-name fields separated by '{}'",
                FIELD_COUNT, FIELD_DELIMITER
            ))
        })?;

        let age = age
            .parse()
            .map_err(|_| DbError::InvalidRecord(format!("invalid age: {:?}", age)))?;

        Ok(Self::new(name, age, address, phone))
    }

    /// Format as a single `name|age|address|phone` line (no newline)
    pub fn to_line(&self) -> String {
        self.to_string()
    }

    /// Reject text that cannot be stored verbatim in the line format
    pub fn validate_field(field: &str) -> Result<()> {
        if field.contains(FIELD_DELIMITER) {
            return Err(DbError::InvalidRecord(format!(
                "field {:?} contains the delimiter '{}'",
                field, FIELD_DELIMITER
            )));
        }
        if field.contains('\n') || field.contains('\r') {
            return Err(DbError::InvalidRecord(format!(
                "field {:?} contains a line break",
                field
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.name,
            self.age,
            self.address,
            self.phone,
            d = FIELD_DELIMITER
        )
    }
}

/// Split a line into its four trimmed fields, requiring a non-empty name
fn split_fields(line: &str) -> Option<[&str; FIELD_COUNT]> {
    let fields: Vec<&str> = line.trim().split(FIELD_DELIMITER).map(str::trim).collect();

    match fields.as_slice() {
        &[name, age, address, phone] if !name.is_empty() => Some([name, age, address, phone]),
        _ => None,
    }
}
