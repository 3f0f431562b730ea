// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::default_miner_address;
use address::Address;
use vm::{from_fil, TokenAmount};

/// Tunables of the simulator engine.
#[derive(Clone, Debug)]
pub struct BlockchainOptions {
    /// Seconds between sealed tipsets. Zero switches the engine to
    /// instamine: every accepted submission immediately triggers mining.
    pub block_time: u64,
    /// Address of the single simulated miner.
    pub miner: Address,
    /// Seed of the deterministic RNG behind account keys, tickets and the
    /// genesis proof. Equal seeds give byte-identical chains.
    pub seed: u64,
    /// Number of funded accounts created at genesis.
    pub num_accounts: usize,
    /// Starting balance of each seeded account, in attoFIL.
    pub initial_balance: TokenAmount,
}

impl Default for BlockchainOptions {
    fn default() -> Self {
        Self {
            block_time: 0,
            miner: default_miner_address(),
            seed: 0,
            num_accounts: 10,
            initial_balance: from_fil(100),
        }
    }
}
