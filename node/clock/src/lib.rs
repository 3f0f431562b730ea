// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

/// Default wall-clock duration of a simulated epoch, in seconds.
pub const EPOCH_DURATION_SECONDS: u64 = 30;

/// Epoch number of a chain. Acts as a proxy for time in the simulator.
pub type ChainEpoch = i64;

/// Denotes an unset `ChainEpoch`.
pub const EPOCH_UNDEFINED: ChainEpoch = -1;
