// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{ElectionProof, Ticket, TipsetKeys};
use address::Address;
use cid::{Cid, Code::Blake2b256};
use clock::ChainEpoch;
use derive_builder::Builder;
use encoding::Cbor;
use num_bigint::{
    bigint_ser::{BigIntDe, BigIntSer},
    BigInt,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Header of a block.
///
/// Usage:
/// ```
/// use address::Address;
/// use blocks::{BlockHeader, Ticket, TipsetKeys};
/// use num_bigint::BigInt;
///
/// BlockHeader::builder()
///     .miner_address(Address::new_id(1000)) // required
///     .parents(TipsetKeys::default()) // optional
///     .weight(BigInt::from(0u8)) // optional
///     .epoch(0) // optional
///     .ticket(Ticket::default()) // optional
///     .timestamp(0) // optional
///     .build_and_validate()
///     .unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
#[builder(name = "BlockHeaderBuilder")]
pub struct BlockHeader {
    // CHAIN LINKING
    /// The set of parents this block was based on. Always a single CID in
    /// the simulator, the first block of the previous tipset.
    #[builder(default)]
    parents: TipsetKeys,

    /// Aggregate chain weight of the parent set.
    #[builder(default)]
    weight: BigInt,

    /// Height at which the block was mined.
    #[builder(default)]
    epoch: ChainEpoch,

    // MINER INFO
    /// Address of the miner actor that mined this block.
    miner_address: Address,

    // CONSENSUS
    /// The ticket submitted with the block.
    #[builder(default)]
    ticket: Ticket,

    /// The leader-election win backing the block.
    #[builder(default)]
    election_proof: ElectionProof,

    /// Seconds since the Unix epoch at which the block was created.
    #[builder(default)]
    timestamp: u64,

    // CACHE
    /// Stores the CID for the block after the first build. The genesis
    /// header presets this to its fixed, non-content-derived CID.
    #[builder(default)]
    cached_cid: Cid,

    /// Stores the marshalled bytes of the block.
    #[builder(default)]
    cached_bytes: Vec<u8>,
}

impl Serialize for BlockHeader {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (
            &self.miner_address,
            &self.ticket,
            &self.election_proof,
            &self.parents,
            BigIntSer(&self.weight),
            &self.epoch,
            &self.timestamp,
        )
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BlockHeader {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as Deserializer<'de>>::Error>
    where
        D: Deserializer<'de>,
    {
        let (miner_address, ticket, election_proof, parents, BigIntDe(weight), epoch, timestamp) =
            Deserialize::deserialize(deserializer)?;

        BlockHeader::builder()
            .miner_address(miner_address)
            .ticket(ticket)
            .election_proof(election_proof)
            .parents(parents)
            .weight(weight)
            .epoch(epoch)
            .timestamp(timestamp)
            .build_and_validate()
            .map_err(serde::de::Error::custom)
    }
}

impl BlockHeader {
    /// Generates a BlockHeader builder as a constructor.
    pub fn builder() -> BlockHeaderBuilder {
        BlockHeaderBuilder::default()
    }
    /// Getter for BlockHeader parents.
    pub fn parents(&self) -> &TipsetKeys {
        &self.parents
    }
    /// Getter for BlockHeader weight.
    pub fn weight(&self) -> &BigInt {
        &self.weight
    }
    /// Getter for BlockHeader epoch.
    pub fn epoch(&self) -> ChainEpoch {
        self.epoch
    }
    /// Getter for BlockHeader miner_address.
    pub fn miner_address(&self) -> &Address {
        &self.miner_address
    }
    /// Getter for BlockHeader ticket.
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }
    /// Getter for BlockHeader election_proof.
    pub fn election_proof(&self) -> &ElectionProof {
        &self.election_proof
    }
    /// Getter for BlockHeader timestamp.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
    /// Getter for BlockHeader cid. The cache is filled at build time, so this
    /// never recomputes.
    pub fn cid(&self) -> &Cid {
        &self.cached_cid
    }
    /// Key used for canonically ordering headers within a tipset.
    pub fn to_sort_key(&self) -> (Vec<u8>, Vec<u8>) {
        (
            self.ticket.vrfproof.as_bytes().to_vec(),
            self.cid().to_bytes(),
        )
    }

    /// Fills the byte and CID caches from the current field values.
    fn update_cache(&mut self) -> Result<(), String> {
        self.cached_bytes = self.marshal_cbor().map_err(|e| e.to_string())?;
        self.cached_cid = cid::new_from_cbor(&self.cached_bytes, Blake2b256);
        Ok(())
    }
}

impl Cbor for BlockHeader {
    fn cid(&self) -> Result<Cid, encoding::Error> {
        Ok(*self.cid())
    }
}

/// Human-readable string representation of a block CID.
impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHeader: {:?}", self.cid())
    }
}

impl BlockHeaderBuilder {
    pub fn build_and_validate(&self) -> Result<BlockHeader, String> {
        // Convert header builder into header struct
        let mut header = self.build().map_err(|e| e.to_string())?;

        // A preset CID (the genesis header) is kept as-is.
        if header.cached_cid == Cid::default() {
            header.update_cache()?;
        }

        Ok(header)
    }
}
