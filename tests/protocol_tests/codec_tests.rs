//! Codec Tests
//!
//! Tests for command and response encoding/decoding.

use std::io::Cursor;

use custdb::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, Command, CommandType, Response,
    MAX_LINE_LENGTH,
};
use custdb::{Customer, DbError};

// =============================================================================
// Command Type Tests
// =============================================================================

#[test]
fn test_command_type_names_round_trip() {
    for ty in CommandType::ALL {
        assert_eq!(CommandType::from_name(ty.name()), Some(ty));
    }
}

#[test]
fn test_command_type_unknown_name() {
    assert_eq!(CommandType::from_name("frobnicate"), None);
    assert_eq!(CommandType::from_name("FIND_CUSTOMER"), None);
    assert_eq!(CommandType::from_name(""), None);
}

#[test]
fn test_command_type_arg_counts() {
    assert_eq!(CommandType::FindCustomer.arg_count(), 1);
    assert_eq!(CommandType::AddCustomer.arg_count(), 1);
    assert_eq!(CommandType::UpdateAge.arg_count(), 2);
    assert_eq!(CommandType::PrintReport.arg_count(), 0);
    assert_eq!(CommandType::GetPid.arg_count(), 0);
}

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_find() {
    let cmd = Command::FindCustomer {
        name: "Alice".to_string(),
    };
    let decoded = decode_command(&encode_command(&cmd).unwrap()).unwrap();

    assert_eq!(decoded, cmd);
}

#[test]
fn test_encode_decode_update_age_keeps_raw_age() {
    let cmd = Command::UpdateAge {
        name: "Alice".to_string(),
        age: "abc".to_string(),
    };
    let decoded = decode_command(&encode_command(&cmd).unwrap()).unwrap();

    assert_eq!(decoded, cmd);
}

#[test]
fn test_encode_decode_no_args() {
    assert_eq!(
        decode_command(&encode_command(&Command::PrintReport).unwrap()).unwrap(),
        Command::PrintReport
    );
    assert_eq!(
        decode_command(&encode_command(&Command::GetPid).unwrap()).unwrap(),
        Command::GetPid
    );
}

#[test]
fn test_encode_rejects_newline_in_argument() {
    let cmd = Command::UpdateAddress {
        name: "Alice".to_string(),
        address: "1 Main St\nApt 2".to_string(),
    };

    assert!(matches!(encode_command(&cmd), Err(DbError::Protocol(_))));
}

#[test]
fn test_decode_trims_whitespace_and_crlf() {
    let decoded = decode_command(b"  update_phone \r\n Alice \r\n555-0000\r\n").unwrap();

    assert_eq!(
        decoded,
        Command::UpdatePhone {
            name: "Alice".to_string(),
            phone: "555-0000".to_string(),
        }
    );
}

#[test]
fn test_decode_missing_args_are_empty() {
    let decoded = decode_command(b"update_address\nAlice\n").unwrap();

    assert_eq!(
        decoded,
        Command::UpdateAddress {
            name: "Alice".to_string(),
            address: String::new(),
        }
    );

    let decoded = decode_command(b"find_customer").unwrap();
    assert_eq!(decoded, Command::FindCustomer { name: String::new() });
}

#[test]
fn test_decode_unknown_operation() {
    let result = decode_command(b"frobnicate\nAlice\n");
    assert!(matches!(result, Err(DbError::Protocol(_))));
}

#[test]
fn test_decode_empty_input() {
    let result = decode_command(b"");
    assert!(matches!(result, Err(DbError::Protocol(_))));
}

#[test]
fn test_decode_invalid_utf8() {
    let result = decode_command(b"find_\xFF\xFEcustomer\n");
    assert!(matches!(result, Err(DbError::Protocol(_))));
}

#[test]
fn test_decode_line_too_long() {
    let mut bytes = b"find_customer\n".to_vec();
    bytes.extend(std::iter::repeat(b'a').take(MAX_LINE_LENGTH + 10));
    bytes.push(b'\n');

    assert!(matches!(decode_command(&bytes), Err(DbError::Protocol(_))));
}

#[test]
fn test_decode_ignores_trailing_lines() {
    let decoded = decode_command(b"delete_customer\nBob\nextra\nlines\n").unwrap();

    assert_eq!(
        decoded,
        Command::DeleteCustomer {
            name: "Bob".to_string()
        }
    );
}

#[test]
fn test_wire_format_add_customer() {
    let cmd = Command::AddCustomer {
        line: "Alice|30|1 Main St|555-1111".to_string(),
    };

    assert_eq!(
        encode_command(&cmd).unwrap(),
        b"add_customer\nAlice|30|1 Main St|555-1111\n".to_vec()
    );
}

#[test]
fn test_wire_format_update_age() {
    let cmd = Command::UpdateAge {
        name: "Alice".to_string(),
        age: "31".to_string(),
    };

    assert_eq!(encode_command(&cmd).unwrap(), b"update_age\nAlice\n31\n".to_vec());
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_response_texts() {
    let cases = [
        (Response::CustomerNotFound, "Customer not found"),
        (Response::CustomerAdded, "Customer added"),
        (Response::CustomerExists, "Customer already exists"),
        (Response::InvalidCustomer, "Invalid customer"),
        (Response::CustomerDeleted, "Customer deleted"),
        (Response::AgeUpdated, "Age updated"),
        (Response::InvalidAge, "Invalid age"),
        (Response::AddressUpdated, "Address updated"),
        (Response::PhoneUpdated, "Phone number updated"),
        (Response::InvalidRequest, "Invalid request"),
        (Response::Pid(4242), "4242"),
    ];

    for (response, text) in cases {
        assert_eq!(response.to_string(), text);
        assert_eq!(encode_response(&response), format!("{}\n", text).into_bytes());
    }
}

#[test]
fn test_response_customer_line() {
    let response = Response::Customer(Customer::new("Alice", 30, "1 Main St", "555-1111"));

    assert_eq!(encode_response(&response), b"Alice|30|1 Main St|555-1111\n".to_vec());
}

#[test]
fn test_response_report_not_double_terminated() {
    let report = "Alice|30|1 Main St|555-1111\nBob|45|2 Elm Rd|555-2222\n".to_string();
    let encoded = encode_response(&Response::Report(report.clone()));

    assert_eq!(encoded, report.as_bytes());
    assert_eq!(
        decode_response(&encoded).unwrap(),
        "Alice|30|1 Main St|555-1111\nBob|45|2 Elm Rd|555-2222"
    );
}

#[test]
fn test_response_empty_report() {
    let encoded = encode_response(&Response::Report(String::new()));

    assert_eq!(encoded, b"\n".to_vec());
    assert_eq!(decode_response(&encoded).unwrap(), "");
}

#[test]
fn test_response_is_mutation() {
    assert!(Response::CustomerAdded.is_mutation());
    assert!(Response::PhoneUpdated.is_mutation());
    assert!(!Response::CustomerNotFound.is_mutation());
    assert!(!Response::InvalidAge.is_mutation());
}

// =============================================================================
// Stream-based I/O Tests
// =============================================================================

#[test]
fn test_stream_write_read_command() {
    let cmd = Command::AddCustomer {
        line: "Bob|45|2 Elm Rd|555-2222".to_string(),
    };

    let mut buffer = Vec::new();
    write_command(&mut buffer, &cmd).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(read_command(&mut cursor).unwrap(), cmd);
}

#[test]
fn test_stream_write_read_response() {
    let mut buffer = Vec::new();
    write_response(&mut buffer, &Response::AgeUpdated).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(read_response(&mut cursor).unwrap(), "Age updated");
}
