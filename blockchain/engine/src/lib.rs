// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod blockchain;
mod config;
mod deal;
mod errors;
mod genesis;
mod market;
mod miner;

pub use self::blockchain::{Blockchain, MessageSendSpec};
pub use self::config::BlockchainOptions;
pub use self::deal::{DealInfo, StorageDealStatus};
pub use self::errors::Error;
pub use self::genesis::GENESIS_CID;
pub use self::market::{DataRef, FileRef, QueryOffer, RetrievalOrder, StartDealParams};

use address::Address;

/// Well-known sink address base fees are burned to.
pub fn burnt_funds_address() -> Address {
    Address::new_id(99)
}

/// The simulator's single miner actor.
pub fn default_miner_address() -> Address {
    Address::new_id(1000)
}
