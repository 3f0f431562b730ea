// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Key management error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Info that corresponds to key does not exist
    #[error("Key info not found")]
    KeyInfo,
    /// Key already exists in the keystore
    #[error("Key already exists")]
    KeyExists,
    /// Key does not exist in the keystore
    #[error("Key does not exist")]
    KeyNotExists,
    #[error("{0}")]
    Other(String),
}

impl From<crypto::Error> for Error {
    fn from(e: crypto::Error) -> Error {
        Error::Other(e.to_string())
    }
}

impl From<address::Error> for Error {
    fn from(e: address::Error) -> Error {
        Error::Other(e.to_string())
    }
}

impl From<encoding::Error> for Error {
    fn from(e: encoding::Error) -> Error {
        Error::Other(e.to_string())
    }
}

impl From<db::Error> for Error {
    fn from(e: db::Error) -> Error {
        Error::Other(e.to_string())
    }
}
