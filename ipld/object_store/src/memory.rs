// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Error, ObjectStat, ObjectStore};
use async_trait::async_trait;
use cid::{Cid, Code::Blake2b256};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory object store. Default backend of the simulator and of tests;
/// clones share contents.
#[derive(Debug, Default, Clone)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<Cid, Vec<u8>>>>,
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn stat(&self, cid: &Cid) -> Result<ObjectStat, Error> {
        self.objects
            .read()
            .get(cid)
            .map(|data| ObjectStat {
                size: data.len() as u64,
            })
            .ok_or(Error::NotFound(*cid))
    }

    async fn read(&self, cid: &Cid) -> Result<Vec<u8>, Error> {
        self.objects
            .read()
            .get(cid)
            .cloned()
            .ok_or(Error::NotFound(*cid))
    }

    async fn put(&self, data: Vec<u8>) -> Result<Cid, Error> {
        let cid = cid::new_from_raw(&data, Blake2b256);
        self.objects.write().insert(cid, data);
        Ok(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[async_std::test]
    async fn put_then_stat_and_read() {
        let store = MemoryObjectStore::default();
        let cid = store.put(b"piece data".to_vec()).await.unwrap();

        assert_eq!(store.stat(&cid).await.unwrap(), ObjectStat { size: 10 });
        assert_eq!(store.read(&cid).await.unwrap(), b"piece data");
    }

    #[async_std::test]
    async fn missing_object_reports_not_found() {
        let store = MemoryObjectStore::default();
        let cid = cid::new_from_raw(b"nothing here", Blake2b256);
        assert_eq!(store.stat(&cid).await.unwrap_err(), Error::NotFound(cid));
    }
}
