// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod errors;
mod network;
mod protocol;

pub use self::errors::Error;
pub use self::network::{Network, MAINNET_PREFIX, TESTNET_PREFIX};
pub use self::protocol::Protocol;

use data_encoding::Encoding;
#[allow(unused_imports)]
use data_encoding_macro::{internal_new_encoding, new_encoding};
use encoding::blake2b_variable;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Hash length of payload for Secp and Actor addresses.
pub const PAYLOAD_HASH_LEN: usize = 20;

/// Uncompressed secp public key used for validation of Secp addresses.
pub const SECP_PUB_LEN: usize = 65;

/// BLS public key length used for validation of BLS addresses.
pub const BLS_PUB_LEN: usize = 48;

/// Length of the checksum hash for string encodings.
pub const CHECKSUM_HASH_LEN: usize = 4;

const MAX_ADDRESS_LEN: usize = 84 + 2;

/// Zero-padding-free lowercase base32, as used by the reference string form.
const ADDRESS_ENCODER: Encoding = new_encoding! {
    symbols: "abcdefghijklmnopqrstuvwxyz234567",
    padding: None,
};

/// A protocol-tagged account identifier. The canonical byte form is the
/// protocol tag followed by the payload; the string form additionally carries
/// the network prefix and, for non-ID protocols, a blake2b checksum.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address {
    network: Network,
    protocol: Protocol,
    payload: Vec<u8>,
}

impl Address {
    fn new(network: Network, protocol: Protocol, payload: Vec<u8>) -> Result<Self, Error> {
        match protocol {
            Protocol::ID => {
                from_leb_bytes(&payload)?;
            }
            Protocol::Secp256k1 | Protocol::Actor => {
                if payload.len() != PAYLOAD_HASH_LEN {
                    return Err(Error::InvalidPayload);
                }
            }
            Protocol::BLS => {
                if payload.len() != BLS_PUB_LEN {
                    return Err(Error::InvalidPayload);
                }
            }
            Protocol::Unknown => return Err(Error::UnknownProtocol),
        }
        Ok(Self {
            network,
            protocol,
            payload,
        })
    }

    /// Generates an ID-protocol address (`t0…`).
    pub fn new_id(id: u64) -> Self {
        Self {
            network: Network::default(),
            protocol: Protocol::ID,
            payload: to_leb_bytes(id),
        }
    }

    /// Generates an address from an uncompressed secp256k1 public key.
    pub fn new_secp256k1(pubkey: &[u8]) -> Result<Self, Error> {
        if pubkey.len() != SECP_PUB_LEN {
            return Err(Error::InvalidPayload);
        }
        Self::new(
            Network::default(),
            Protocol::Secp256k1,
            address_hash(pubkey),
        )
    }

    /// Generates an address from a BLS public key.
    pub fn new_bls(pubkey: &[u8]) -> Result<Self, Error> {
        Self::new(Network::default(), Protocol::BLS, pubkey.to_vec())
    }

    /// Generates an actor-protocol address from arbitrary seed data.
    pub fn new_actor(data: &[u8]) -> Result<Self, Error> {
        Self::new(Network::default(), Protocol::Actor, address_hash(data))
    }

    /// Decodes an address from its canonical byte form.
    pub fn from_bytes(bz: &[u8]) -> Result<Self, Error> {
        if bz.len() < 2 {
            return Err(Error::InvalidLength);
        }
        let protocol = Protocol::from_byte(bz[0]).ok_or(Error::UnknownProtocol)?;
        Self::new(Network::default(), protocol, bz[1..].to_vec())
    }

    /// Returns the canonical byte form: protocol tag followed by payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bz = Vec::with_capacity(self.payload.len() + 1);
        bz.push(self.protocol as u8);
        bz.extend_from_slice(&self.payload);
        bz
    }

    /// Returns the addressing protocol.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the network the address belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns a copy of the payload. For BLS addresses this is the public
    /// key itself, which signature verification relies on.
    pub fn payload_bytes(&self) -> Vec<u8> {
        self.payload.clone()
    }

    /// Returns the actor ID for ID-protocol addresses.
    pub fn id(&self) -> Result<u64, Error> {
        if self.protocol != Protocol::ID {
            return Err(Error::InvalidPayload);
        }
        from_leb_bytes(&self.payload)
    }
}

/// Calculates the intermediate hash used as the payload of Secp and Actor
/// addresses.
pub fn address_hash(ingest: &[u8]) -> Vec<u8> {
    blake2b_variable(ingest, PAYLOAD_HASH_LEN)
}

/// Calculates the 4 byte checksum hash over protocol tag and payload.
pub fn checksum(ingest: &[u8]) -> Vec<u8> {
    blake2b_variable(ingest, CHECKSUM_HASH_LEN)
}

/// Validates the checksum against the ingest data.
pub fn validate_checksum(ingest: &[u8], expect: &[u8]) -> bool {
    checksum(ingest) == expect
}

fn to_leb_bytes(mut id: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    loop {
        let mut byte = (id & 0x7f) as u8;
        id >>= 7;
        if id != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if id == 0 {
            return buf;
        }
    }
}

fn from_leb_bytes(bz: &[u8]) -> Result<u64, Error> {
    let mut reader = bz;
    let id = leb128::read::unsigned(&mut reader).map_err(|_| Error::InvalidPayload)?;
    // trailing bytes mean the encoding was not minimal
    if !reader.is_empty() {
        return Err(Error::InvalidPayload);
    }
    Ok(id)
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.network.to_prefix();
        match self.protocol {
            Protocol::ID => {
                let id = from_leb_bytes(&self.payload).map_err(|_| fmt::Error)?;
                write!(f, "{}{}{}", prefix, self.protocol, id)
            }
            Protocol::Unknown => write!(f, "{}{}", prefix, self.protocol),
            _ => {
                let mut ingest = self.to_bytes();
                let cksm = checksum(&ingest);
                ingest.extend_from_slice(&cksm);
                write!(
                    f,
                    "{}{}{}",
                    prefix,
                    self.protocol,
                    ADDRESS_ENCODER.encode(&ingest[1..])
                )
            }
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(addr: &str) -> Result<Self, Error> {
        if addr.len() < 3 || addr.len() > MAX_ADDRESS_LEN {
            return Err(Error::InvalidLength);
        }
        let network = match &addr[0..1] {
            TESTNET_PREFIX => Network::Testnet,
            MAINNET_PREFIX => Network::Mainnet,
            _ => return Err(Error::UnknownNetwork),
        };
        let protocol = match &addr[1..2] {
            "0" => Protocol::ID,
            "1" => Protocol::Secp256k1,
            "2" => Protocol::Actor,
            "3" => Protocol::BLS,
            _ => return Err(Error::UnknownProtocol),
        };
        let raw = &addr[2..];

        if protocol == Protocol::ID {
            if raw.len() > 20 {
                return Err(Error::InvalidLength);
            }
            let id: u64 = raw.parse().map_err(|_| Error::InvalidPayload)?;
            let mut address = Address::new_id(id);
            address.network = network;
            return Ok(address);
        }

        let decoded = ADDRESS_ENCODER.decode(raw.as_bytes())?;
        if decoded.len() < CHECKSUM_HASH_LEN {
            return Err(Error::InvalidLength);
        }
        let (payload, cksm) = decoded.split_at(decoded.len() - CHECKSUM_HASH_LEN);

        let mut ingest = Vec::with_capacity(payload.len() + 1);
        ingest.push(protocol as u8);
        ingest.extend_from_slice(payload);
        if !validate_checksum(&ingest, cksm) {
            return Err(Error::InvalidChecksum);
        }

        Self::new(network, protocol, payload.to_vec())
    }
}

/// Addresses serialize as their canonical byte form.
impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bz = self.to_bytes();
        encoding::serde_bytes::Serialize::serialize(&bz, serializer)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bz: Cow<'de, [u8]> = encoding::serde_bytes::Deserialize::deserialize(deserializer)?;
        Address::from_bytes(&bz).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_address_string_form() {
        let addr = Address::new_id(1000);
        assert_eq!(addr.to_string(), "t01000");
        assert_eq!(addr.id().unwrap(), 1000);
        assert_eq!(Address::from_str("t01000").unwrap(), addr);
    }

    #[test]
    fn burnt_funds_address_parses() {
        let addr = Address::from_str("t099").unwrap();
        assert_eq!(addr.protocol(), Protocol::ID);
        assert_eq!(addr.id().unwrap(), 99);
    }

    #[test]
    fn bls_round_trip() {
        let addr = Address::new_bls(&[7u8; BLS_PUB_LEN]).unwrap();
        assert_eq!(addr.protocol(), Protocol::BLS);
        let parsed = Address::from_str(&addr.to_string()).unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn secp_round_trip() {
        let addr = Address::new_secp256k1(&[9u8; SECP_PUB_LEN]).unwrap();
        assert_eq!(addr.payload().len(), PAYLOAD_HASH_LEN);
        let parsed = Address::from_str(&addr.to_string()).unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn checksum_tamper_detected() {
        let addr = Address::new_bls(&[7u8; BLS_PUB_LEN]).unwrap();
        let mut s = addr.to_string();
        // flip the final checksum character
        let last = if s.ends_with('a') { 'b' } else { 'a' };
        s.pop();
        s.push(last);
        assert!(matches!(
            Address::from_str(&s),
            Err(Error::InvalidChecksum) | Err(Error::Base32Decoding(_))
        ));
    }

    #[test]
    fn unknown_protocol_digit_rejected() {
        assert_eq!(
            Address::from_str("t9aaaaaaa").unwrap_err(),
            Error::UnknownProtocol
        );
    }

    #[test]
    fn mainnet_prefix_accepted() {
        let addr = Address::from_str("f01000").unwrap();
        assert_eq!(addr.network(), Network::Mainnet);
        assert_eq!(addr.id().unwrap(), 1000);
    }

    #[test]
    fn cbor_symmetric() {
        let addr = Address::new_bls(&[5u8; BLS_PUB_LEN]).unwrap();
        let bz = serde_cbor::to_vec(&addr).unwrap();
        let back: Address = serde_cbor::from_slice(&bz).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn wrong_key_lengths_rejected() {
        assert_eq!(
            Address::new_bls(&[0u8; 47]).unwrap_err(),
            Error::InvalidPayload
        );
        assert_eq!(
            Address::new_secp256k1(&[0u8; 64]).unwrap_err(),
            Error::InvalidPayload
        );
    }
}
