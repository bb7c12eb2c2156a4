// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use aw_storage::{DurableLog, LogOptions};
use tempfile::tempdir;
use yare::parameterized;

fn write_records(folder: &Path, count: u64) {
    let log = DurableLog::open(folder, LogOptions::new(10), RawCodec).unwrap();
    for i in 1..=count {
        log.append(&format!("payload-{}", i)).unwrap();
    }
}

fn run(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
    let mut out = Vec::new();
    f(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn list_shows_each_segment() {
    let temp = tempdir().unwrap();
    write_records(temp.path(), 12);

    let output = run(|out| list(temp.path(), out));
    similar_asserts::assert_eq!(
        output,
        "SEGMENT                        BASE     LAST  RECORDS\n\
         audit.00000000000000000000        0       10       10\n\
         audit.00000000000000000010       10       12        2\n"
    );
}

#[test]
fn list_marks_an_empty_segment() {
    let temp = tempdir().unwrap();
    write_records(temp.path(), 10);

    let output = run(|out| list(temp.path(), out));
    assert!(output.ends_with("audit.00000000000000000010       10        -        0\n"));
}

#[test]
fn list_of_empty_folder() {
    let temp = tempdir().unwrap();
    assert_eq!(run(|out| list(temp.path(), out)), "No segments\n");
}

#[parameterized(
    everything = { 0, 1, 12 },
    mid_segment = { 7, 8, 12 },
    segment_boundary = { 10, 11, 12 },
    past_the_end = { 12, 13, 12 },
)]
fn dump_starts_after(after: u64, first: u64, last: u64) {
    let temp = tempdir().unwrap();
    write_records(temp.path(), 12);

    let output = run(|out| dump(temp.path(), after, out));
    let expected: String = (first..=last)
        .map(|i| format!("{}\tpayload-{}\n", i, i))
        .collect();
    similar_asserts::assert_eq!(output, expected);
}

#[test]
fn missing_folder_is_reported() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("nope");

    let err = dump(&missing, 0, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().starts_with("WAL folder not found"));
}
