// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::errors::Error;
use address::Address;
use blocks::{BlockHeader, Ticket, Tipset};
use cid::Cid;
use crypto::VRFProof;
use rand::RngCore;
use std::str::FromStr;

/// CID of the genesis block. Fixed rather than content-derived, so every
/// simulator instance shares the same chain root.
pub const GENESIS_CID: &str = "bafyreiaqpwbbyjo4a42saasj36kkrpv4tsherf2e7bvezkert2a7dhonoi";

/// Builds the height-0 tipset around the fixed-CID genesis header. The
/// ticket proof is drawn from the seeded chain RNG.
pub(crate) fn genesis_tipset<R: RngCore>(miner: &Address, rng: &mut R) -> Result<Tipset, Error> {
    let genesis_cid = Cid::from_str(GENESIS_CID).map_err(|e| Error::Other(e.to_string()))?;

    let mut vrfproof = [0u8; 32];
    rng.fill_bytes(&mut vrfproof);

    let header = BlockHeader::builder()
        .miner_address(miner.clone())
        .epoch(0)
        .ticket(Ticket::new(VRFProof::new(vrfproof.to_vec())))
        .cached_cid(genesis_cid)
        .build_and_validate()?;

    Ok(Tipset::new(vec![header])?)
}
