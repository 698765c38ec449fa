//! Tests for Dispatcher
//!
//! These tests verify:
//! - Every command maps to the right store call and response
//! - add_customer validation happens before the store is touched
//! - update_age rejects non-integer ages without mutating
//! - Request scenarios end to end at the dispatch level

use std::fs;
use std::sync::Arc;

use custdb::protocol::{Command, Response};
use custdb::{Customer, Dispatcher, RecordStore};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_dispatcher() -> (TempDir, Dispatcher) {
    let temp_dir = TempDir::new().unwrap();
    let store = RecordStore::open(temp_dir.path().join("data.txt")).unwrap();
    let dispatcher = Dispatcher::with_pid(Arc::new(store), 4242);
    (temp_dir, dispatcher)
}

fn add(dispatcher: &Dispatcher, line: &str) -> Response {
    dispatcher.execute(Command::AddCustomer {
        line: line.to_string(),
    })
}

fn find(dispatcher: &Dispatcher, name: &str) -> Response {
    dispatcher.execute(Command::FindCustomer {
        name: name.to_string(),
    })
}

fn alice() -> Customer {
    Customer::new("Alice", 30, "1 Main St", "555-1111")
}

// =============================================================================
// find_customer / add_customer
// =============================================================================

#[test]
fn test_add_then_find() {
    let (_temp, dispatcher) = setup_dispatcher();

    assert_eq!(add(&dispatcher, "Alice|30|1 Main St|555-1111"), Response::CustomerAdded);

    let response = find(&dispatcher, "Alice");
    assert_eq!(response, Response::Customer(alice()));
    assert_eq!(response.to_string(), "Alice|30|1 Main St|555-1111");
}

#[test]
fn test_find_on_empty_store() {
    let (_temp, dispatcher) = setup_dispatcher();

    let response = find(&dispatcher, "Bob");
    assert_eq!(response, Response::CustomerNotFound);
    assert_eq!(response.to_string(), "Customer not found");
}

#[test]
fn test_add_duplicate() {
    let (_temp, dispatcher) = setup_dispatcher();
    add(&dispatcher, "Alice|30|1 Main St|555-1111");

    assert_eq!(add(&dispatcher, "Alice|99|Elsewhere|555-9999"), Response::CustomerExists);
    assert_eq!(find(&dispatcher, "Alice"), Response::Customer(alice()));
}

#[test]
fn test_add_invalid_lines() {
    let (_temp, dispatcher) = setup_dispatcher();

    assert_eq!(add(&dispatcher, "Alice|30|1 Main St"), Response::InvalidCustomer);
    assert_eq!(add(&dispatcher, "|30|1 Main St|555"), Response::InvalidCustomer);
    assert_eq!(add(&dispatcher, ""), Response::InvalidCustomer);
    assert_eq!(add(&dispatcher, "Alice|old|1 Main St|555"), Response::InvalidCustomer);

    assert!(dispatcher.store().is_empty());
}

#[test]
fn test_add_invalid_does_not_touch_file() {
    let (_temp, dispatcher) = setup_dispatcher();
    let path = dispatcher.store().path().to_path_buf();
    fs::write(&path, "sentinel\n").unwrap();

    add(&dispatcher, "not|a|customer");

    assert_eq!(fs::read_to_string(&path).unwrap(), "sentinel\n");
}

// =============================================================================
// delete_customer
// =============================================================================

#[test]
fn test_delete() {
    let (_temp, dispatcher) = setup_dispatcher();
    add(&dispatcher, "Alice|30|1 Main St|555-1111");

    let delete = || {
        dispatcher.execute(Command::DeleteCustomer {
            name: "Alice".to_string(),
        })
    };

    assert_eq!(delete(), Response::CustomerDeleted);
    assert_eq!(delete(), Response::CustomerNotFound);
    assert_eq!(find(&dispatcher, "Alice"), Response::CustomerNotFound);
}

// =============================================================================
// update_*
// =============================================================================

#[test]
fn test_update_age() {
    let (_temp, dispatcher) = setup_dispatcher();
    add(&dispatcher, "Alice|30|1 Main St|555-1111");

    let response = dispatcher.execute(Command::UpdateAge {
        name: "Alice".to_string(),
        age: "31".to_string(),
    });

    assert_eq!(response, Response::AgeUpdated);
    assert_eq!(dispatcher.store().get("Alice").unwrap().age, 31);
}

#[test]
fn test_update_age_invalid_keeps_old_age() {
    let (_temp, dispatcher) = setup_dispatcher();
    add(&dispatcher, "Alice|30|1 Main St|555-1111");

    for bad in ["abc", "", "-3", "3.5"] {
        let response = dispatcher.execute(Command::UpdateAge {
            name: "Alice".to_string(),
            age: bad.to_string(),
        });
        assert_eq!(response, Response::InvalidAge);
        assert_eq!(response.to_string(), "Invalid age");
    }

    assert_eq!(dispatcher.store().get("Alice").unwrap().age, 30);
}

#[test]
fn test_update_age_invalid_checked_before_name() {
    let (_temp, dispatcher) = setup_dispatcher();

    let response = dispatcher.execute(Command::UpdateAge {
        name: "Nobody".to_string(),
        age: "abc".to_string(),
    });

    assert_eq!(response, Response::InvalidAge);
}

#[test]
fn test_update_age_missing_customer() {
    let (_temp, dispatcher) = setup_dispatcher();

    let response = dispatcher.execute(Command::UpdateAge {
        name: "Nobody".to_string(),
        age: "40".to_string(),
    });

    assert_eq!(response, Response::CustomerNotFound);
}

#[test]
fn test_update_address_and_phone() {
    let (_temp, dispatcher) = setup_dispatcher();
    add(&dispatcher, "Alice|30|1 Main St|555-1111");

    let response = dispatcher.execute(Command::UpdateAddress {
        name: "Alice".to_string(),
        address: "9 New Rd".to_string(),
    });
    assert_eq!(response, Response::AddressUpdated);

    let response = dispatcher.execute(Command::UpdatePhone {
        name: "Alice".to_string(),
        phone: "555-0000".to_string(),
    });
    assert_eq!(response, Response::PhoneUpdated);
    assert_eq!(response.to_string(), "Phone number updated");

    assert_eq!(
        dispatcher.store().get("Alice"),
        Some(Customer::new("Alice", 30, "9 New Rd", "555-0000"))
    );
}

#[test]
fn test_update_address_and_phone_missing_customer() {
    let (_temp, dispatcher) = setup_dispatcher();

    let response = dispatcher.execute(Command::UpdateAddress {
        name: "Nobody".to_string(),
        address: "x".to_string(),
    });
    assert_eq!(response, Response::CustomerNotFound);

    let response = dispatcher.execute(Command::UpdatePhone {
        name: "Nobody".to_string(),
        phone: "x".to_string(),
    });
    assert_eq!(response, Response::CustomerNotFound);
    assert!(dispatcher.store().is_empty());
}

// =============================================================================
// print_report / get_pid
// =============================================================================

#[test]
fn test_print_report_sorted() {
    let (_temp, dispatcher) = setup_dispatcher();
    add(&dispatcher, "Carol|22|3 Oak Ave|555-3333");
    add(&dispatcher, "Alice|30|1 Main St|555-1111");

    assert_eq!(
        dispatcher.execute(Command::PrintReport),
        Response::Report(
            "Alice|30|1 Main St|555-1111\nCarol|22|3 Oak Ave|555-3333\n".to_string()
        )
    );
}

#[test]
fn test_get_pid() {
    let (_temp, dispatcher) = setup_dispatcher();

    assert_eq!(dispatcher.pid(), 4242);
    assert_eq!(dispatcher.execute(Command::GetPid), Response::Pid(4242));
}

#[test]
fn test_default_pid_is_current_process() {
    let temp_dir = TempDir::new().unwrap();
    let store = RecordStore::open(temp_dir.path().join("data.txt")).unwrap();
    let dispatcher = Dispatcher::new(Arc::new(store));

    assert_eq!(
        dispatcher.execute(Command::GetPid),
        Response::Pid(std::process::id())
    );
}

// =============================================================================
// Persistence failure
// =============================================================================

#[cfg(unix)]
#[test]
fn test_persist_failure_maps_to_storage_error() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("sub");
    fs::create_dir(&data_dir).unwrap();
    let path = data_dir.join("data.txt");

    let store = RecordStore::open(&path).unwrap();
    let dispatcher = Dispatcher::with_pid(Arc::new(store), 1);

    // Replace the data file with a directory so the rewrite fails
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    assert_eq!(
        add(&dispatcher, "Alice|30|1 Main St|555-1111"),
        Response::StorageError
    );
}
