// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crypto::VRFProof;
use encoding::tuple::*;

/// A Ticket is a marker of a tick of the blockchain's clock. In the simulator
/// the proof bytes come from the deterministic chain RNG, so sibling blocks
/// of one tipset still carry distinct tickets.
#[derive(Clone, Debug, PartialEq, Eq, Default, Hash, Serialize_tuple, Deserialize_tuple)]
pub struct Ticket {
    /// A proof output by running a VRF on the VDFResult of the parent ticket
    pub vrfproof: VRFProof,
}

impl Ticket {
    /// Ticket constructor
    pub fn new(vrfproof: VRFProof) -> Self {
        Self { vrfproof }
    }
}
