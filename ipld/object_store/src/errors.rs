// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use thiserror::Error;

/// Object store error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// No object with the given root is available locally.
    #[error("Object not found: {0}")]
    NotFound(Cid),
    /// Backend failure.
    #[error("Object store error: {0}")]
    Other(String),
}
