// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod errors;
mod memory;

pub use self::errors::Error;
pub use self::memory::MemoryObjectStore;

use async_trait::async_trait;
use cid::Cid;

/// Metadata about a stored object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectStat {
    /// Total size of the object in bytes.
    pub size: u64,
}

/// The slice of an IPFS-like content-addressed store the simulator consumes.
/// Deal data and retrievals resolve against this interface; the chain itself
/// persists through the KV [`db::Store`] instead.
///
/// Callers are expected to bound `stat` and `read` with their own timeout,
/// since a real backend may be a remote daemon.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Starts the backing service, if any.
    async fn start(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Stops the backing service, if any.
    async fn stop(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Returns metadata for the object, or [`Error::NotFound`].
    async fn stat(&self, cid: &Cid) -> Result<ObjectStat, Error>;

    /// Returns the full object bytes, or [`Error::NotFound`].
    async fn read(&self, cid: &Cid) -> Result<Vec<u8>, Error>;

    /// Stores the bytes and returns their content identifier.
    async fn put(&self, data: Vec<u8>) -> Result<Cid, Error>;
}
