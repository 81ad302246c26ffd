use std::io::Write;
use tempfile::NamedTempFile;

pub const TRIP_FIXTURE: &str = "tests/fixtures/trip.json";

pub fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file.flush().unwrap();
    file
}

/// A four-member group whose balances are A +150, B +50, C -100, D -100.
pub fn uneven_snapshot() -> NamedTempFile {
    write_temp(
        r#"{
            "groups": [ { "id": "g", "currency": "USD", "members": ["a", "b", "c", "d"] } ],
            "expenses": [
                {
                    "id": "e1", "groupId": "g", "amount": 200, "paidBy": "a",
                    "splits": [ { "member": "a", "amount": 50 }, { "member": "c", "amount": 100 }, { "member": "d", "amount": 50 } ]
                },
                {
                    "id": "e2", "groupId": "g", "amount": 50, "paidBy": "b",
                    "splits": [ { "member": "d", "amount": 50 } ]
                }
            ]
        }"#,
    )
}
