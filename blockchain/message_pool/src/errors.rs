// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use address::Address;
use chain::Error as ChainError;
use encoding::Error as EncodingError;
use thiserror::Error;
use vm::MethodNum;

/// MessagePool error.
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// Anything but a plain transfer was requested
    #[error("Unsupported method {0}; only transfers are executed")]
    UnsupportedMethod(MethodNum),
    /// A nonce was submitted although the engine assigns them itself
    #[error("Invalid nonce {0}; submitted messages must carry nonce 0")]
    InvalidNonce(u64),
    /// Sender or receiver cannot take part in value transfers
    #[error("Invalid protocol for message party {0}")]
    InvalidProtocol(Address),
    /// Gas premium above the fee cap would make the miner tip negative
    #[error("Gas fee cap is lower than the gas premium")]
    GasFeeCapTooLow,
    /// Signature did not verify against the submitted encoding
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    /// Projected spend of the sender's pending messages exceeds its balance
    #[error("Not enough funds to execute transaction")]
    NotEnoughFunds,
    /// Account lookup failed
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
    /// Message failed to encode
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("{0}")]
    Other(String),
}

impl From<EncodingError> for Error {
    fn from(e: EncodingError) -> Error {
        Error::Encoding(e.to_string())
    }
}
