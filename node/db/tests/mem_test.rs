// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod subtests;

use db::MemoryDB;

#[test]
fn mem_db_write() {
    let db = MemoryDB::default();
    subtests::write(&db);
}

#[test]
fn mem_db_read() {
    let db = MemoryDB::default();
    subtests::read(&db);
}

#[test]
fn mem_db_exists() {
    let db = MemoryDB::default();
    subtests::exists(&db);
}

#[test]
fn mem_db_does_not_exist() {
    let db = MemoryDB::default();
    subtests::does_not_exist(&db);
}

#[test]
fn mem_db_delete() {
    let db = MemoryDB::default();
    subtests::delete(&db);
}

#[test]
fn mem_db_bulk_write() {
    let db = MemoryDB::default();
    subtests::bulk_write(&db);
}

#[test]
fn mem_db_bulk_write_length_mismatch() {
    let db = MemoryDB::default();
    subtests::bulk_write_length_mismatch(&db);
}

#[test]
fn mem_db_bulk_read() {
    let db = MemoryDB::default();
    subtests::bulk_read(&db);
}

#[test]
fn mem_db_bulk_delete() {
    let db = MemoryDB::default();
    subtests::bulk_delete(&db);
}

#[test]
fn mem_db_clone_shares_state() {
    let db = MemoryDB::default();
    let other = db.clone();
    db::Store::write(&db, [7], [7]).unwrap();
    assert!(db::Store::exists(&other, [7]).unwrap());
}
