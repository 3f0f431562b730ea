// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

/// Prefix the simulator uses when rendering addresses.
pub const TESTNET_PREFIX: &str = "t";
/// Prefix used on the production network. Accepted on parse, never emitted.
pub const MAINNET_PREFIX: &str = "f";

/// Network the address belongs to. The simulator runs everything on testnet
/// addresses; mainnet strings still parse so pasted fixtures keep working.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Default for Network {
    fn default() -> Self {
        Network::Testnet
    }
}

impl Network {
    /// String prefix rendered ahead of the protocol digit.
    pub fn to_prefix(self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_PREFIX,
            Network::Testnet => TESTNET_PREFIX,
        }
    }
}
