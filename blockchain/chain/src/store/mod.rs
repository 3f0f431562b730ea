// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod account_store;
mod chain_store;
mod errors;

pub use self::account_store::*;
pub use self::chain_store::*;
pub use self::errors::*;
