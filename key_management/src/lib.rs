// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod errors;
mod keystore;
mod wallet;
mod wallet_helpers;

pub use self::errors::Error;
pub use self::keystore::{KeyInfo, KeyStore, KeyStoreConfig};
pub use self::wallet::{Key, Wallet};
pub use self::wallet_helpers::*;
