//! Integration tests for reading, parsing and writing import files.

use std::io::Write;

use importmap_ingest::{CodecError, analyze_table, parse, read_import_file, serialize};
use importmap_model::{ColumnType, Delimiter, ImportOptions, InputFormatError};
use proptest::prelude::*;

fn write_temp(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(bytes).expect("write temp file");
    file
}

#[test]
fn read_import_file_builds_table() {
    let file = write_temp(
        ".csv",
        b"Employee ID,First Name,Email Address\r\n1,Ann,ann@x.io\r\n2,Bob,bob@x.io\r\n",
    );
    let table = read_import_file(file.path(), &ImportOptions::default()).unwrap();
    assert_eq!(table.data_len(), 2);

    let columns = analyze_table(&table);
    assert_eq!(columns[0].column_type, ColumnType::Number);
    assert_eq!(columns[2].column_type, ColumnType::Email);
    assert_eq!(columns[1].first_sample(), Some("Ann"));
}

#[test]
fn read_import_file_accepts_uppercase_extension() {
    let file = write_temp(".TSV", b"Name\tEmail\nAnn\tann@x.io\n");
    let options = ImportOptions {
        delimiter: Delimiter::Tab,
        ..ImportOptions::default()
    };
    let table = read_import_file(file.path(), &options).unwrap();
    assert_eq!(table.header().unwrap(), ["Name", "Email"]);
}

#[test]
fn read_import_file_rejects_blank_file() {
    let file = write_temp(".csv", b"\n \n");
    let err = read_import_file(file.path(), &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::Input(InputFormatError::EmptyInput)));
}

#[test]
fn read_import_file_rejects_invalid_utf8() {
    let file = write_temp(".csv", &[b'a', 0xC3, 0x28, b'\n']);
    let err = read_import_file(file.path(), &ImportOptions::default()).unwrap_err();
    assert!(err.is_input_format());
}

#[test]
fn read_import_file_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_import_file(&dir.path().join("absent.csv"), &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::FileNotFound { .. }));
}

fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9@., \t-]{0,10}".prop_map(|s| s.trim().to_string())
}

fn table() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(field(), 1..5), 1..6).prop_filter(
        "rows must not be blank",
        |rows| rows.iter().all(|row| row.iter().any(|f| !f.is_empty())),
    )
}

proptest! {
    #[test]
    fn serialize_then_parse_preserves_rows(rows in table(), tab in any::<bool>()) {
        let delimiter = if tab { Delimiter::Tab } else { Delimiter::Comma };
        let text = serialize(&rows[1..], &rows[0], delimiter).unwrap();
        let parsed = parse(&text, delimiter).unwrap();
        prop_assert_eq!(parsed, rows);
    }

    #[test]
    fn parse_then_serialize_is_stable(rows in table()) {
        let first = serialize(&rows[1..], &rows[0], Delimiter::Comma).unwrap();
        let parsed = parse(&first, Delimiter::Comma).unwrap();
        let second = serialize(&parsed[1..], &parsed[0], Delimiter::Comma).unwrap();
        prop_assert_eq!(first, second);
    }
}
