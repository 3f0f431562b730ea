// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use encoding::serde_bytes;
use serde::{Deserialize, Serialize};

/// The output from running a VRF proof. In the simulator the proof bytes are
/// drawn from the deterministic chain RNG rather than an actual VRF.
#[derive(Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Default, Hash, Serialize, Deserialize)]
pub struct VRFProof(#[serde(with = "serde_bytes")] pub Vec<u8>);

impl VRFProof {
    /// Creates a VRFProof from raw bytes.
    pub fn new(output: Vec<u8>) -> Self {
        Self(output)
    }

    /// Returns reference to underlying proof bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
