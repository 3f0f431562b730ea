// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Error, Store};
pub use sled::{Batch, Config, Db};
use std::path::Path;

/// Sled instance satisfying the [Store] interface. The default persistent
/// backend of the simulator.
#[derive(Debug, Clone)]
pub struct SledDb {
    db: Db,
}

impl SledDb {
    /// Opens (or creates) a database at the given path.
    pub fn open<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let config = Config::default().path(path);
        Ok(Self {
            db: config.open()?,
        })
    }

    /// Opens a db with custom configuration.
    pub fn open_with_config(config: Config) -> Result<Self, Error> {
        Ok(Self { db: config.open()? })
    }

    /// Initializes a sled in-memory database. This will not persist data.
    pub fn temporary() -> Result<Self, Error> {
        let config = Config::default().temporary(true);
        Ok(Self {
            db: config.open()?,
        })
    }
}

impl Store for SledDb {
    fn read<K>(&self, key: K) -> Result<Option<Vec<u8>>, Error>
    where
        K: AsRef<[u8]>,
    {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    fn write<K, V>(&self, key: K, value: V) -> Result<(), Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        self.db.insert(key.as_ref(), value.as_ref())?;
        Ok(())
    }

    fn delete<K>(&self, key: K) -> Result<(), Error>
    where
        K: AsRef<[u8]>,
    {
        self.db.remove(key.as_ref())?;
        Ok(())
    }

    fn exists<K>(&self, key: K) -> Result<bool, Error>
    where
        K: AsRef<[u8]>,
    {
        Ok(self.db.contains_key(key)?)
    }

    fn bulk_write<K, V>(&self, keys: &[K], values: &[V]) -> Result<(), Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        if keys.len() != values.len() {
            return Err(Error::InvalidBulkLen);
        }
        let mut batch = Batch::default();
        for (key, value) in keys.iter().zip(values.iter()) {
            batch.insert(key.as_ref(), value.as_ref());
        }
        Ok(self.db.apply_batch(batch)?)
    }

    fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }
}
