// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

/// Method number indicator for calling actor functions.
pub type MethodNum = u64;

/// Base actor send method. The only method the simulator executes; anything
/// else is rejected at message validation.
pub const METHOD_SEND: MethodNum = 0;

/// Base actor constructor method.
pub const METHOD_CONSTRUCTOR: MethodNum = 1;
