// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crypto::VRFProof;
use encoding::tuple::*;

/// Proof that a miner won the round's leader election. The simulator's single
/// miner always wins exactly once, hence the default win count of 1; the
/// value still feeds the parent-weight arithmetic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize_tuple, Deserialize_tuple)]
pub struct ElectionProof {
    /// Number of election wins in the round.
    pub win_count: i64,
    /// Proof of the win.
    pub vrfproof: VRFProof,
}

impl Default for ElectionProof {
    fn default() -> Self {
        Self {
            win_count: 1,
            vrfproof: VRFProof::default(),
        }
    }
}
