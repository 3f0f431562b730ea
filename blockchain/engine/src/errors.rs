// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use address::Address;
use cid::Cid;
use thiserror::Error;

/// Engine error, the full surface callers of the simulator observe.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation invoked before initialisation completed
    #[error("Engine is not ready")]
    NotReady,
    /// Message validation or admission failure
    #[error(transparent)]
    Pool(#[from] message_pool::Error),
    /// Settlement transfer could not be covered
    #[error("Not enough funds to settle the transfer")]
    InsufficientFunds,
    /// Deal proposal did not name a wallet
    #[error("Deal proposal has no wallet set")]
    MissingWallet,
    /// The engine holds no private key for the address
    #[error("No private key managed for address {0}")]
    UnknownPrivateKey(Address),
    /// Fee reservation of the message exceeds the submitted maximum
    #[error("Message fee exceeds the allowed maximum")]
    MaxFeeExceeded,
    /// Object store lookup failed or timed out
    #[error("Object not found: {0}")]
    ObjectNotFound(Cid),
    /// Chain or account ledger failure
    #[error(transparent)]
    Chain(#[from] chain::Error),
    /// Key-value store failure
    #[error(transparent)]
    Store(#[from] db::Error),
    /// Block or tipset construction failure
    #[error(transparent)]
    Blocks(#[from] blocks::Error),
    /// Wallet or keystore failure
    #[error(transparent)]
    KeyManagement(#[from] key_management::Error),
    /// Filesystem failure during retrieval
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("{0}")]
    Other(String),
}

impl From<encoding::Error> for Error {
    fn from(e: encoding::Error) -> Error {
        Error::Encoding(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Error {
        Error::Other(e)
    }
}
