// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod signed_message;
mod unsigned_message;

pub use self::signed_message::SignedMessage;
pub use self::unsigned_message::{MessageBuilder, UnsignedMessage};

use address::Address;
use vm::{MethodNum, TokenAmount};

/// Message interface to interact with signed and unsigned messages in a
/// generic context.
pub trait Message {
    /// Returns the from address of the message.
    fn from(&self) -> &Address;
    /// Returns the destination address of the message.
    fn to(&self) -> &Address;
    /// Returns the message sequence or nonce.
    fn sequence(&self) -> u64;
    /// Returns the amount sent in message.
    fn value(&self) -> &TokenAmount;
    /// Returns the method number to be called.
    fn method_num(&self) -> MethodNum;
    /// Returns the gas limit for the message.
    fn gas_limit(&self) -> u64;
    /// Returns the required gas fee cap.
    fn gas_fee_cap(&self) -> &TokenAmount;
    /// Returns the gas premium to be paid to the miner.
    fn gas_premium(&self) -> &TokenAmount;

    /// Total funds the sender must hold for the message to be admitted:
    /// the full fee reservation plus the transferred value.
    fn required_funds(&self) -> TokenAmount {
        self.gas_fee_cap() * self.gas_limit() + self.value()
    }

    /// Portion of the fee burned to the burnt-funds sink.
    fn base_fee_burn(&self) -> TokenAmount {
        self.gas_premium() * self.gas_limit()
    }

    /// Portion of the fee paid to the sealing miner. Non-negative as long as
    /// the premium never exceeds the fee cap, which validation enforces.
    fn miner_tip(&self) -> TokenAmount {
        (self.gas_fee_cap() - self.gas_premium()) * self.gas_limit()
    }
}
