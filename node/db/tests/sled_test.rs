// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod subtests;

use db::SledDb;

#[test]
fn sled_db_write() {
    let db = SledDb::temporary().unwrap();
    subtests::write(&db);
}

#[test]
fn sled_db_read() {
    let db = SledDb::temporary().unwrap();
    subtests::read(&db);
}

#[test]
fn sled_db_exists() {
    let db = SledDb::temporary().unwrap();
    subtests::exists(&db);
}

#[test]
fn sled_db_does_not_exist() {
    let db = SledDb::temporary().unwrap();
    subtests::does_not_exist(&db);
}

#[test]
fn sled_db_delete() {
    let db = SledDb::temporary().unwrap();
    subtests::delete(&db);
}

#[test]
fn sled_db_bulk_write() {
    let db = SledDb::temporary().unwrap();
    subtests::bulk_write(&db);
}

#[test]
fn sled_db_bulk_write_length_mismatch() {
    let db = SledDb::temporary().unwrap();
    subtests::bulk_write_length_mismatch(&db);
}

#[test]
fn sled_db_bulk_read() {
    let db = SledDb::temporary().unwrap();
    subtests::bulk_read(&db);
}

#[test]
fn sled_db_bulk_delete() {
    let db = SledDb::temporary().unwrap();
    subtests::bulk_delete(&db);
}

#[test]
fn sled_db_reopen_preserves_data() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = SledDb::open(dir.path()).unwrap();
        db::Store::write(&db, b"tip", b"5").unwrap();
        db::Store::flush(&db).unwrap();
    }
    let db = SledDb::open(dir.path()).unwrap();
    assert_eq!(db::Store::read(&db, b"tip").unwrap().unwrap(), b"5");
}
