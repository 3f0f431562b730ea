// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::Error;
use crypto::SignatureType;
use db::Store;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

const KEYSTORE_PREFIX: &str = "privateKeys/";
const KEYSTORE_INDEX_KEY: &str = "privateKeys";

/// The type of key (BLS or SECP256K1) together with its private key bytes.
/// Simulator keys are throwaway; they are stored unencrypted.
#[derive(Clone, PartialEq, Debug, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    key_type: SignatureType,
    private_key: Vec<u8>,
}

impl KeyInfo {
    /// Return a new KeyInfo given the key_type and private_key.
    pub fn new(key_type: SignatureType, private_key: Vec<u8>) -> Self {
        KeyInfo {
            key_type,
            private_key,
        }
    }

    /// Return the key type.
    pub fn key_type(&self) -> SignatureType {
        self.key_type
    }

    /// Return a reference to the private key bytes.
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

/// Backing mode of the [KeyStore].
pub enum KeyStoreConfig<DB> {
    /// Keys live only for the process lifetime.
    Memory,
    /// Keys are written through to the `privateKeys/` partition of the store.
    Persistent(Arc<DB>),
}

/// The private-key manager: an in-memory map of address string to [KeyInfo],
/// optionally written through to the KV store. A small index record under a
/// fixed key makes the partition enumerable on restart.
pub struct KeyStore<DB> {
    key_info: HashMap<String, KeyInfo>,
    persistence: Option<Arc<DB>>,
}

impl<DB: Store> KeyStore<DB> {
    /// Constructs a keystore, warming the cache from the store when
    /// persistent.
    pub fn new(config: KeyStoreConfig<DB>) -> Result<Self, Error> {
        match config {
            KeyStoreConfig::Memory => Ok(Self {
                key_info: HashMap::new(),
                persistence: None,
            }),
            KeyStoreConfig::Persistent(db) => {
                let mut key_info = HashMap::new();
                if let Some(bz) = db.read(KEYSTORE_INDEX_KEY)? {
                    let index: Vec<String> = encoding::from_slice(&bz)
                        .map_err(|e| Error::Other(e.to_string()))?;
                    for addr in index {
                        let bz = db
                            .read(partition_key(&addr))?
                            .ok_or(Error::KeyInfo)?;
                        let info: KeyInfo = encoding::from_slice(&bz)
                            .map_err(|e| Error::Other(e.to_string()))?;
                        key_info.insert(addr, info);
                    }
                }
                Ok(Self {
                    key_info,
                    persistence: Some(db),
                })
            }
        }
    }

    /// Return all addresses that have keys in the keystore.
    pub fn list(&self) -> Vec<String> {
        self.key_info.keys().cloned().collect()
    }

    /// Return the key info stored under the given address string.
    pub fn get(&self, k: &str) -> Result<KeyInfo, Error> {
        self.key_info.get(k).cloned().ok_or(Error::KeyInfo)
    }

    /// Save a key to the keystore, writing through when persistent.
    pub fn put(&mut self, key: String, key_info: KeyInfo) -> Result<(), Error> {
        if self.key_info.contains_key(&key) {
            return Err(Error::KeyExists);
        }
        if let Some(db) = &self.persistence {
            let bz = encoding::to_vec(&key_info).map_err(|e| Error::Other(e.to_string()))?;
            db.write(partition_key(&key), bz)?;
            self.key_info.insert(key, key_info);
            self.flush_index(db.clone())?;
        } else {
            self.key_info.insert(key, key_info);
        }
        Ok(())
    }

    /// Remove the key and corresponding key info from the keystore.
    pub fn remove(&mut self, key: &str) -> Result<KeyInfo, Error> {
        let info = self.key_info.remove(key).ok_or(Error::KeyNotExists)?;
        if let Some(db) = &self.persistence {
            db.delete(partition_key(key))?;
            self.flush_index(db.clone())?;
        }
        Ok(info)
    }

    fn flush_index(&self, db: Arc<DB>) -> Result<(), Error> {
        let index: Vec<&String> = self.key_info.keys().collect();
        let bz = encoding::to_vec(&index).map_err(|e| Error::Other(e.to_string()))?;
        db.write(KEYSTORE_INDEX_KEY, bz)?;
        Ok(())
    }
}

fn partition_key(addr: &str) -> String {
    format!("{}{}", KEYSTORE_PREFIX, addr)
}
