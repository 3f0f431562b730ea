// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod check;
mod errors;
mod msg_pool;

pub use self::check::*;
pub use self::errors::Error;
pub use self::msg_pool::MessagePool;
