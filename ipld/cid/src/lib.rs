// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use cid::{Cid, Error, Version};
pub use multihash;
pub use multihash_codetable::Code;
use multihash_codetable::MultihashDigest;

/// Multicodec identifier for CBOR-encoded IPLD data.
pub const DAG_CBOR: u64 = 0x71;

/// Multicodec identifier for raw bytes.
pub const RAW: u64 = 0x55;

/// Constructs a v1 `Cid` addressing the given CBOR bytes.
pub fn new_from_cbor(bz: &[u8], code: Code) -> Cid {
    let hash = code.digest(bz);
    Cid::new_v1(DAG_CBOR, hash)
}

/// Constructs a v1 `Cid` addressing raw (non-IPLD) bytes.
pub fn new_from_raw(bz: &[u8], code: Code) -> Cid {
    let hash = code.digest(bz);
    Cid::new_v1(RAW, hash)
}
