// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::Error;
use super::keystore::{KeyInfo, KeyStore};
use super::wallet_helpers::{generate_with_rng, new_address, sign, to_public};
use address::Address;
use crypto::{Signature, SignatureType, Signer};
use db::Store;
use rand::{CryptoRng, Rng};
use std::collections::HashMap;
use std::convert::TryFrom;

/// A key, derived from the stored [KeyInfo].
#[derive(Clone, PartialEq, Debug, Eq)]
pub struct Key {
    pub key_info: KeyInfo,
    pub public_key: Vec<u8>,
    pub address: Address,
}

impl TryFrom<KeyInfo> for Key {
    type Error = Error;

    fn try_from(key_info: KeyInfo) -> Result<Self, Error> {
        let public_key = to_public(key_info.key_type(), key_info.private_key())?;
        let address = new_address(key_info.key_type(), &public_key)?;
        Ok(Key {
            key_info,
            public_key,
            address,
        })
    }
}

/// A wallet of keys the engine can sign with, hydrated from a [KeyStore].
pub struct Wallet<DB> {
    keys: HashMap<Address, Key>,
    keystore: KeyStore<DB>,
}

impl<DB: Store> Wallet<DB> {
    /// Constructs a wallet over the keystore, deriving a [Key] for every
    /// stored [KeyInfo].
    pub fn new(keystore: KeyStore<DB>) -> Result<Self, Error> {
        let mut keys = HashMap::new();
        for addr in keystore.list() {
            let key = Key::try_from(keystore.get(&addr)?)?;
            keys.insert(key.address.clone(), key);
        }
        Ok(Wallet { keys, keystore })
    }

    /// Returns whether the wallet manages a key for the address.
    pub fn has_key(&self, addr: &Address) -> bool {
        self.keys.contains_key(addr)
    }

    /// Returns the key for the address, if managed.
    pub fn find_key(&self, addr: &Address) -> Option<&Key> {
        self.keys.get(addr)
    }

    /// Returns all managed addresses.
    pub fn list_addrs(&self) -> Vec<Address> {
        let mut addrs: Vec<Address> = self.keys.keys().cloned().collect();
        addrs.sort_by_key(|a| a.to_string());
        addrs
    }

    /// Signs arbitrary bytes with the key of the given address.
    pub fn sign(&self, addr: &Address, msg: &[u8]) -> Result<Signature, Error> {
        let key = self.keys.get(addr).ok_or(Error::KeyNotExists)?;
        Ok(sign(
            key.key_info.key_type(),
            key.key_info.private_key(),
            msg,
        )?)
    }

    /// Generates a new key from the supplied randomness source and registers
    /// it, returning the derived address.
    pub fn generate_addr_with_rng<R>(
        &mut self,
        sig_type: SignatureType,
        rng: &mut R,
    ) -> Result<Address, Error>
    where
        R: Rng + CryptoRng,
    {
        let private_key = generate_with_rng(sig_type, rng)?;
        self.import(KeyInfo::new(sig_type, private_key))
    }

    /// Registers an externally produced key, returning its address.
    pub fn import(&mut self, key_info: KeyInfo) -> Result<Address, Error> {
        let key = Key::try_from(key_info)?;
        let addr = key.address.clone();
        self.keystore
            .put(addr.to_string(), key.key_info.clone())?;
        self.keys.insert(addr.clone(), key);
        Ok(addr)
    }

    /// Returns the stored [KeyInfo] for an address.
    pub fn export(&self, addr: &Address) -> Result<KeyInfo, Error> {
        self.keystore.get(&addr.to_string())
    }
}

impl<DB: Store> Signer for Wallet<DB> {
    fn sign_bytes(&self, data: &[u8], address: &Address) -> Result<Signature, crypto::Error> {
        self.sign(address, data)
            .map_err(|e| crypto::Error::SigningError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::KeyStoreConfig;
    use db::MemoryDB;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn wallet(db: Arc<MemoryDB>) -> Wallet<MemoryDB> {
        Wallet::new(KeyStore::new(KeyStoreConfig::Persistent(db)).unwrap()).unwrap()
    }

    #[test]
    fn generated_key_signs_verifiably() {
        let mut w = wallet(Arc::new(MemoryDB::default()));
        let rng = &mut ChaCha8Rng::seed_from_u64(1);
        let addr = w.generate_addr_with_rng(SignatureType::BLS, rng).unwrap();
        let sig = w.sign(&addr, b"bytes").unwrap();
        assert!(sig.verify(b"bytes", &addr).is_ok());
    }

    #[test]
    fn keys_survive_rehydration() {
        let db = Arc::new(MemoryDB::default());
        let addr = {
            let mut w = wallet(db.clone());
            let rng = &mut ChaCha8Rng::seed_from_u64(2);
            w.generate_addr_with_rng(SignatureType::Secp256k1, rng)
                .unwrap()
        };
        let w = wallet(db);
        assert!(w.has_key(&addr));
        assert!(w.sign(&addr, b"still here").is_ok());
    }

    #[test]
    fn signing_with_unknown_key_fails() {
        let w = wallet(Arc::new(MemoryDB::default()));
        let addr = Address::new_id(17);
        assert_eq!(w.sign(&addr, b"no").unwrap_err(), Error::KeyNotExists);
    }
}
