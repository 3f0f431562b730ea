// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod bigint_ser;

pub use num_bigint::*;
pub use num_integer::{self, Integer};
pub use num_traits::{self, Signed, Zero};

/// MAX_ENCODED_SIZE is the max length of a byte slice representing a
/// CBOR serialized BigInt.
const MAX_ENCODED_SIZE: usize = 128;
