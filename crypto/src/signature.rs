// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use address::{Address, Protocol};
use bls_signatures::{
    verify_messages, PublicKey as BlsPubKey, Serialize as BlsSerialize,
    Signature as BlsSignature,
};
use encoding::blake2b_256;
use secp256k1::{recover, Message as SecpMessage, RecoveryId, Signature as EcdsaSignature};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;

/// BLS signature length in bytes.
pub const BLS_SIG_LEN: usize = 96;

/// Secp256k1 signature length in bytes: 64 bytes plus the recovery byte.
pub const SECP_SIG_LEN: usize = 65;

/// Signature variants for block and message signing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignatureType {
    Secp256k1 = 1,
    BLS = 2,
}

impl SignatureType {
    /// Returns the signature type for a tag byte, if recognised.
    pub fn from_byte(b: u8) -> Option<SignatureType> {
        match b {
            1 => Some(SignatureType::Secp256k1),
            2 => Some(SignatureType::BLS),
            _ => None,
        }
    }
}

/// Signature types serialize as their tag byte.
impl Serialize for SignatureType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for SignatureType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let b: u8 = Deserialize::deserialize(deserializer)?;
        SignatureType::from_byte(b)
            .ok_or_else(|| de::Error::custom(format!("Invalid signature type byte: {}", b)))
    }
}

/// A cryptographic signature, tagged with the scheme that produced it. The
/// byte form is the tag byte followed by the raw signature bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    sig_type: SignatureType,
    bytes: Vec<u8>,
}

impl Signature {
    /// Creates a BLS Signature given the raw bytes.
    pub fn new_bls(bytes: Vec<u8>) -> Self {
        Self {
            sig_type: SignatureType::BLS,
            bytes,
        }
    }

    /// Creates a SECP Signature given the raw bytes.
    pub fn new_secp256k1(bytes: Vec<u8>) -> Self {
        Self {
            sig_type: SignatureType::Secp256k1,
            bytes,
        }
    }

    /// Returns reference to the raw signature bytes (without the tag byte).
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the signature type.
    pub fn signature_type(&self) -> SignatureType {
        self.sig_type
    }

    /// Checks if the signature is a valid signature of `data` by the key the
    /// address was derived from.
    pub fn verify(&self, data: &[u8], addr: &Address) -> Result<(), String> {
        match self.sig_type {
            SignatureType::BLS => verify_bls_sig(&self.bytes, data, addr),
            SignatureType::Secp256k1 => verify_secp256k1_sig(&self.bytes, data, addr),
        }
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut bz = Vec::with_capacity(self.bytes.len() + 1);
        bz.push(self.sig_type as u8);
        bz.extend_from_slice(&self.bytes);
        encoding::serde_bytes::Serialize::serialize(&bz, serializer)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bz: Cow<'de, [u8]> = encoding::serde_bytes::Deserialize::deserialize(deserializer)?;
        let (tag, bytes) = bz
            .split_first()
            .ok_or_else(|| de::Error::custom("Empty signature bytes"))?;
        let sig_type = SignatureType::from_byte(*tag)
            .ok_or_else(|| de::Error::custom(format!("Invalid signature type byte: {}", tag)))?;
        Ok(Signature {
            sig_type,
            bytes: bytes.to_vec(),
        })
    }
}

/// Returns `String` error if a BLS signature is invalid.
pub(crate) fn verify_bls_sig(signature: &[u8], data: &[u8], addr: &Address) -> Result<(), String> {
    if addr.protocol() != Protocol::BLS {
        return Err(format!(
            "cannot validate a BLS signature against a {} address",
            addr.protocol()
        ));
    }
    let pub_k = addr.payload_bytes();

    // generate public key object from bytes
    let pk = BlsPubKey::from_bytes(&pub_k).map_err(|e| e.to_string())?;

    // generate signature struct from bytes
    let sig = BlsSignature::from_bytes(signature).map_err(|e| e.to_string())?;

    // BLS verify hash against key
    if verify_messages(&sig, &[data], &[pk]) {
        Ok(())
    } else {
        Err(format!(
            "bls signature verification failed for addr: {}",
            addr
        ))
    }
}

/// Returns `String` error if a secp256k1 signature is invalid. The public key
/// is recovered from the signature and compared against the address payload.
fn verify_secp256k1_sig(signature: &[u8], data: &[u8], addr: &Address) -> Result<(), String> {
    if addr.protocol() != Protocol::Secp256k1 {
        return Err(format!(
            "cannot validate a secp256k1 signature against a {} address",
            addr.protocol()
        ));
    }
    if signature.len() != SECP_SIG_LEN {
        return Err(format!(
            "Invalid Secp256k1 signature length. Was {}, must be 65",
            signature.len()
        ));
    }

    // blake2b 256 hash
    let hash = blake2b_256(data);

    // recover public key from the signature
    let recovery_id = RecoveryId::parse(signature[64]).map_err(|e| e.to_string())?;
    let sig = EcdsaSignature::parse_standard_slice(&signature[..64]).map_err(|e| e.to_string())?;
    let message = SecpMessage::parse(&hash);
    let pubkey = recover(&message, &sig, &recovery_id).map_err(|e| e.to_string())?;

    let rec_addr =
        Address::new_secp256k1(&pubkey.serialize()).map_err(|e| e.to_string())?;

    // check address against recovered address
    if &rec_addr == addr {
        Ok(())
    } else {
        Err("Secp signature verification failed".to_owned())
    }
}
