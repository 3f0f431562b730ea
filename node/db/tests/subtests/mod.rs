// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use db::Store;

pub fn write<DB>(db: &DB)
where
    DB: Store,
{
    let key = [1];
    let value = [1];
    db.write(key, value).unwrap();
}

pub fn read<DB>(db: &DB)
where
    DB: Store,
{
    let key = [0];
    let value = [1];
    db.write(key, value).unwrap();
    let res = db.read(key).unwrap().unwrap();
    assert_eq!(value.as_ref(), res.as_slice());
}

pub fn exists<DB>(db: &DB)
where
    DB: Store,
{
    let key = [0];
    let value = [1];
    db.write(key, value).unwrap();
    assert!(db.exists(key).unwrap());
}

pub fn does_not_exist<DB>(db: &DB)
where
    DB: Store,
{
    let key = [0];
    assert!(!db.exists(key).unwrap());
    assert!(db.read(key).unwrap().is_none());
}

pub fn delete<DB>(db: &DB)
where
    DB: Store,
{
    let key = [0];
    let value = [1];
    db.write(key, value).unwrap();
    assert!(db.exists(key).unwrap());
    db.delete(key).unwrap();
    assert!(!db.exists(key).unwrap());
}

pub fn bulk_write<DB>(db: &DB)
where
    DB: Store,
{
    let keys = [[0], [1], [2]];
    let values = [[0], [1], [2]];
    db.bulk_write(&keys, &values).unwrap();
    for key in keys.iter() {
        assert!(db.exists(*key).unwrap());
    }
}

pub fn bulk_write_length_mismatch<DB>(db: &DB)
where
    DB: Store,
{
    let keys = [[0], [1]];
    let values = [[0]];
    assert!(db.bulk_write(&keys, &values).is_err());
    assert!(!db.exists([0]).unwrap());
}

pub fn bulk_read<DB>(db: &DB)
where
    DB: Store,
{
    let keys = [[0], [1], [2]];
    let values = [[0], [1], [2]];
    db.bulk_write(&keys, &values).unwrap();
    let results = db.bulk_read(&keys).unwrap();
    for (result, value) in results.iter().zip(values.iter()) {
        assert_eq!(result.as_ref().unwrap().as_slice(), value.as_ref());
    }
}

pub fn bulk_delete<DB>(db: &DB)
where
    DB: Store,
{
    let keys = [[0], [1], [2]];
    let values = [[0], [1], [2]];
    db.bulk_write(&keys, &values).unwrap();
    db.bulk_delete(&keys).unwrap();
    for key in keys.iter() {
        assert!(!db.exists(*key).unwrap());
    }
}
