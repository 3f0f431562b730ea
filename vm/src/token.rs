// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use num_bigint::BigInt;

/// Token amount in attoFIL. Balances never go negative; the sign exists only
/// because amounts share arithmetic with chain weights.
pub type TokenAmount = BigInt;

/// attoFIL per FIL.
pub const FILECOIN_PRECISION: u64 = 1_000_000_000_000_000_000;

/// Converts whole FIL into an attoFIL token amount.
pub fn from_fil(fil: u64) -> TokenAmount {
    TokenAmount::from(fil) * FILECOIN_PRECISION
}
