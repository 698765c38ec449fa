//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Line Oriented)
//!
//! UTF-8 text, one field per line. A connection carries exactly one request
//! and one response, then closes.
//!
//! ### Operations
//! | Operation         | Argument lines       | Responses                                               |
//! |-------------------|----------------------|---------------------------------------------------------|
//! | `find_customer`   | name                 | customer line / `Customer not found`                    |
//! | `add_customer`    | `name\|age\|addr\|phone` | `Customer added` / `Customer already exists` / `Invalid customer` |
//! | `delete_customer` | name                 | `Customer deleted` / `Customer not found`               |
//! | `update_age`      | name, age            | `Age updated` / `Customer not found` / `Invalid age`    |
//! | `update_address`  | name, address        | `Address updated` / `Customer not found`                |
//! | `update_phone`    | name, phone          | `Phone number updated` / `Customer not found`           |
//! | `print_report`    | -                    | report text                                             |
//! | `get_pid`         | -                    | server process id                                       |
//!
//! Anything else is answered with `Invalid request`.

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::Response;
pub use codec::{
    encode_command, decode_command, encode_response, decode_response,
    read_command, write_command, read_response, write_response,
    MAX_LINE_LENGTH, MAX_RESPONSE_SIZE,
};
