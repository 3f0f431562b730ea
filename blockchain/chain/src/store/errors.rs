// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use blocks::Error as BlkError;
use db::Error as DbError;
use encoding::Error as EncodingError;
use thiserror::Error;

/// Chain store error
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// Key was not found
    #[error("Invalid key: {0}")]
    UndefinedKey(String),
    /// Error originating from block data
    #[error("Blockchain error: {0}")]
    Blockchain(#[from] BlkError),
    /// Error originating from the underlying key-value store
    #[error("Key-value store error: {0}")]
    KeyValueStore(#[from] DbError),
    /// Error originating from encoding or decoding a record
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

impl From<String> for Error {
    fn from(e: String) -> Error {
        Error::Other(e)
    }
}
