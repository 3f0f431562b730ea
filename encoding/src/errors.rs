// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt;
use thiserror::Error;

/// Error type for encoding and decoding data through any supported protocol.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Could not decode: {formatted_data} in format: {protocol}")]
    Unmarshalling {
        formatted_data: String,
        protocol: CodecProtocol,
    },
    #[error("Could not encode: {formatted_data} in format: {protocol}")]
    Marshalling {
        formatted_data: String,
        protocol: CodecProtocol,
    },
}

/// Protocol in which the data failed to be encoded or decoded.
#[derive(Debug, PartialEq, Eq)]
pub enum CodecProtocol {
    Cbor,
    Json,
}

impl fmt::Display for CodecProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CodecProtocol::Cbor => write!(f, "Cbor"),
            CodecProtocol::Json => write!(f, "Json"),
        }
    }
}
