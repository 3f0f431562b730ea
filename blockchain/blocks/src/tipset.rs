// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{BlockHeader, Error, Ticket};
use cid::Cid;
use clock::ChainEpoch;
use encoding::{
    de::{self, Deserializer},
    ser::{self, Serializer},
    Cbor,
};
use num_bigint::BigInt;
use serde::Deserialize;

/// A set of CIDs forming a unique key for a Tipset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Ord, PartialOrd)]
pub struct TipsetKeys {
    pub cids: Vec<Cid>,
}

impl TipsetKeys {
    pub fn new(cids: Vec<Cid>) -> Self {
        Self { cids }
    }

    /// Returns tipset header cids.
    pub fn cids(&self) -> &[Cid] {
        &self.cids
    }
}

impl ser::Serialize for TipsetKeys {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.cids.serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for TipsetKeys {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let cids: Vec<Cid> = Deserialize::deserialize(deserializer)?;
        Ok(TipsetKeys { cids })
    }
}

impl Cbor for TipsetKeys {}

/// An immutable set of blocks at the same height with the same parent set.
/// Blocks in a tipset are canonically ordered by ticket, ties broken by
/// header CID; all of the simulator's per-tipset bookkeeping (message
/// attribution included) keys off the first block of that ordering.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tipset {
    blocks: Vec<BlockHeader>,
    key: TipsetKeys,
}

#[allow(clippy::len_without_is_empty)]
impl Tipset {
    /// Builds a new Tipset from a collection of blocks. A valid tipset
    /// contains a non-empty collection of blocks with identical parents,
    /// weight and epoch.
    pub fn new(headers: Vec<BlockHeader>) -> Result<Self, Error> {
        if headers.is_empty() {
            return Err(Error::NoBlocks);
        }

        let mut sorted_headers = Vec::new();
        let mut cids = Vec::new();

        for (i, header) in headers.into_iter().enumerate() {
            if i > 0 {
                let first: &BlockHeader = &sorted_headers[0];
                if header.parents() != first.parents() {
                    return Err(Error::InvalidTipset(
                        "parent cids are not equal".to_string(),
                    ));
                }
                if header.weight() != first.weight() {
                    return Err(Error::InvalidTipset("weights are not equal".to_string()));
                }
                if header.epoch() != first.epoch() {
                    return Err(Error::InvalidTipset("epochs are not equal".to_string()));
                }
            }
            sorted_headers.push(header);
        }

        // canonical order: smallest ticket first, CIDs break ties
        sorted_headers.sort_by_key(|header| header.to_sort_key());

        for header in &sorted_headers {
            cids.push(*header.cid());
        }

        Ok(Self {
            blocks: sorted_headers,
            key: TipsetKeys { cids },
        })
    }

    /// Rebuilds a tipset from its persisted key and headers, trusting the
    /// stored canonical order. The genesis header's CID is fixed rather than
    /// content-derived, so re-deriving the key on load would corrupt it.
    pub fn from_parts(key: TipsetKeys, blocks: Vec<BlockHeader>) -> Result<Self, Error> {
        if blocks.is_empty() {
            return Err(Error::NoBlocks);
        }
        if key.cids().len() != blocks.len() {
            return Err(Error::InvalidTipset(
                "tipset key does not match block count".to_string(),
            ));
        }
        Ok(Self { blocks, key })
    }

    /// Returns epoch of the tipset.
    pub fn epoch(&self) -> ChainEpoch {
        self.blocks[0].epoch()
    }
    /// Returns all blocks in the tipset.
    pub fn blocks(&self) -> &[BlockHeader] {
        &self.blocks
    }
    /// Consumes the tipset, returning its blocks.
    pub fn into_blocks(self) -> Vec<BlockHeader> {
        self.blocks
    }
    /// Returns the smallest ticket of all blocks in the tipset.
    pub fn min_ticket(&self) -> &Ticket {
        self.blocks[0].ticket()
    }
    /// Returns the smallest timestamp of all blocks in the tipset.
    pub fn min_timestamp(&self) -> u64 {
        self.blocks
            .iter()
            .map(|block| block.timestamp())
            .min()
            .unwrap_or_default()
    }
    /// Returns the number of blocks in the tipset.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }
    /// Returns a key for the tipset.
    pub fn key(&self) -> &TipsetKeys {
        &self.key
    }
    /// Returns the CIDs of the blocks in canonical order.
    pub fn cids(&self) -> &[Cid] {
        self.key.cids()
    }
    /// Returns the CIDs of the parents of the blocks in the tipset.
    pub fn parents(&self) -> &TipsetKeys {
        self.blocks[0].parents()
    }
    /// Returns the tipset's calculated weight.
    pub fn weight(&self) -> &BigInt {
        self.blocks[0].weight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use address::Address;
    use crypto::VRFProof;

    fn header(epoch: ChainEpoch, ticket_bytes: Vec<u8>, parents: TipsetKeys) -> BlockHeader {
        BlockHeader::builder()
            .miner_address(Address::new_id(1000))
            .epoch(epoch)
            .ticket(Ticket::new(VRFProof::new(ticket_bytes)))
            .parents(parents)
            .build_and_validate()
            .unwrap()
    }

    #[test]
    fn empty_tipset_rejected() {
        assert_eq!(Tipset::new(vec![]).unwrap_err(), Error::NoBlocks);
    }

    #[test]
    fn sibling_blocks_accepted_and_sorted() {
        let parents = TipsetKeys::default();
        let a = header(1, vec![9, 9], parents.clone());
        let b = header(1, vec![1, 1], parents);
        let ts = Tipset::new(vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(ts.len(), 2);
        // the smaller ticket leads
        assert_eq!(ts.blocks()[0], b);
        assert_eq!(ts.min_ticket(), b.ticket());
        assert_eq!(ts.cids()[0], *b.cid());
        assert_eq!(ts.blocks()[1], a);
    }

    #[test]
    fn mismatched_epochs_rejected() {
        let parents = TipsetKeys::default();
        let a = header(1, vec![1], parents.clone());
        let b = header(2, vec![2], parents);
        assert!(matches!(
            Tipset::new(vec![a, b]),
            Err(Error::InvalidTipset(_))
        ));
    }

    #[test]
    fn mismatched_parents_rejected() {
        let a = header(1, vec![1], TipsetKeys::default());
        let other_parent = TipsetKeys::new(vec![*a.cid()]);
        let b = header(1, vec![2], other_parent);
        assert!(matches!(
            Tipset::new(vec![a, b]),
            Err(Error::InvalidTipset(_))
        ));
    }

    #[test]
    fn tipset_keys_cbor_symmetric() {
        let a = header(1, vec![1], TipsetKeys::default());
        let keys = TipsetKeys::new(vec![*a.cid()]);
        let bz = keys.marshal_cbor().unwrap();
        assert_eq!(TipsetKeys::unmarshal_cbor(&bz).unwrap(), keys);
    }
}
