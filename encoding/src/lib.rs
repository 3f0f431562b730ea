// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod cbor;
mod errors;
mod hash;

pub use self::cbor::*;
pub use self::errors::*;
pub use self::hash::*;

pub use serde::{de, ser};
pub use serde_bytes;
pub use serde_cbor::{from_slice, to_vec};

pub mod tuple {
    pub use serde_tuple::{self, Deserialize_tuple, Serialize_tuple};
}
