// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Crypto error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Failed to produce a signature
    #[error("Could not sign data: {0}")]
    SigningError(String),
    /// Key material was malformed
    #[error("Invalid key material: {0}")]
    KeyError(String),
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::SigningError(err)
    }
}
