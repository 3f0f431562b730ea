// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod method;
mod token;

pub use self::method::*;
pub use self::token::*;
