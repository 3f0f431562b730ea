// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::Error;
use address::Protocol;
use message::{Message, SignedMessage, UnsignedMessage};
use vm::METHOD_SEND;

/// Validates a signed message at the submission boundary. The signature must
/// cover the encoding as submitted, i.e. before the pool assigns a nonce.
pub fn check_message(msg: &SignedMessage) -> Result<(), Error> {
    check_unsigned(msg.message())?;
    msg.verify().map_err(Error::InvalidSignature)?;
    Ok(())
}

/// Validates everything but the signature. The signing path runs this before
/// a signature exists.
pub fn check_unsigned(msg: &UnsignedMessage) -> Result<(), Error> {
    if msg.method_num() != METHOD_SEND {
        return Err(Error::UnsupportedMethod(msg.method_num()));
    }
    // the engine assigns nonces itself
    if msg.sequence() != 0 {
        return Err(Error::InvalidNonce(msg.sequence()));
    }
    for addr in [msg.from(), msg.to()] {
        if matches!(addr.protocol(), Protocol::ID | Protocol::Unknown) {
            return Err(Error::InvalidProtocol(addr.clone()));
        }
    }
    if msg.gas_premium() > msg.gas_fee_cap() {
        return Err(Error::GasFeeCapTooLow);
    }
    Ok(())
}
