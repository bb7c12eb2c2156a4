// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Offline WAL inspection

use crate::prelude::*;

fn two_segments(temp: &Project) {
    temp.segment(0, &[(1, "\"a\""), (2, "\"b\"")]);
    temp.segment(2, &[(3, "\"c\"")]);
}

#[test]
fn list_shows_segments_in_order() {
    let temp = Project::empty();
    two_segments(&temp);

    let wal = temp.wal();
    temp.aw()
        .args(&["wal", "list", wal.to_str().unwrap()])
        .passes()
        .stdout_eq(
            "SEGMENT                        BASE     LAST  RECORDS\n\
             audit.00000000000000000000        0        2        2\n\
             audit.00000000000000000002        2        3        1\n",
        );
}

#[test]
fn list_ignores_foreign_files() {
    let temp = Project::empty();
    two_segments(&temp);
    temp.file("wal/notes.txt", "hello\n");
    temp.file("wal/audit.12", "1,x\n");

    let wal = temp.wal();
    temp.aw()
        .args(&["wal", "list", wal.to_str().unwrap()])
        .passes()
        .stdout_lacks("notes.txt")
        .stdout_lacks("audit.12 ");
}

#[test]
fn list_empty_folder() {
    let temp = Project::empty();
    let wal = temp.wal();
    temp.aw()
        .args(&["wal", "list", wal.to_str().unwrap()])
        .passes()
        .stdout_eq("No segments\n");
}

#[test]
fn dump_prints_sequence_and_payload() {
    let temp = Project::empty();
    two_segments(&temp);

    let wal = temp.wal();
    temp.aw()
        .args(&["wal", "dump", wal.to_str().unwrap()])
        .passes()
        .stdout_eq("1\t\"a\"\n2\t\"b\"\n3\t\"c\"\n");
}

#[test]
fn dump_after_skips_earlier_records() {
    let temp = Project::empty();
    two_segments(&temp);

    let wal = temp.wal();
    temp.aw()
        .args(&["wal", "dump", wal.to_str().unwrap(), "--after", "1"])
        .passes()
        .stdout_eq("2\t\"b\"\n3\t\"c\"\n");
}

#[test]
fn dump_stops_at_torn_tail() {
    let temp = Project::empty();
    temp.file("wal/audit.00000000000000000000", "1,\"a\"\n2,\"b\"\n3,\"c");

    let wal = temp.wal();
    temp.aw()
        .args(&["wal", "dump", wal.to_str().unwrap()])
        .passes()
        .stdout_eq("1\t\"a\"\n2\t\"b\"\n");
}

#[test]
fn dump_reports_corrupt_line() {
    let temp = Project::empty();
    temp.file("wal/audit.00000000000000000000", "1,\"a\"\nnot-a-record\n");

    let wal = temp.wal();
    temp.aw()
        .args(&["wal", "dump", wal.to_str().unwrap()])
        .fails()
        .stdout_has("1\t\"a\"");
}

#[test]
fn dump_missing_folder_fails() {
    let temp = Project::empty();
    temp.aw()
        .args(&["wal", "dump", "does-not-exist"])
        .fails()
        .stderr_has("WAL folder not found");
}
