// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::Message;
use address::Address;
use derive_builder::Builder;
use encoding::tuple::*;
use encoding::Cbor;
use num_bigint::bigint_ser;
use vm::{MethodNum, TokenAmount, METHOD_SEND};

/// Unsigned transfer message. All data needed to move value between two
/// accounts once a nonce has been assigned.
///
/// Usage:
/// ```
/// use address::Address;
/// use message::UnsignedMessage;
/// use vm::TokenAmount;
///
/// let message = UnsignedMessage::builder()
///     .to(Address::new_id(1))
///     .from(Address::new_id(2))
///     .value(TokenAmount::from(10u8)) // optional
///     .sequence(0) // optional
///     .method_num(0) // optional
///     .gas_limit(1) // optional
///     .gas_fee_cap(TokenAmount::from(1u8)) // optional
///     .gas_premium(TokenAmount::default()) // optional
///     .build()
///     .unwrap();
/// assert_eq!(message.sequence, 0);
/// ```
#[derive(PartialEq, Eq, Clone, Debug, Builder, Hash, Serialize_tuple, Deserialize_tuple)]
#[builder(name = "MessageBuilder")]
pub struct UnsignedMessage {
    pub from: Address,
    pub to: Address,
    #[builder(default)]
    pub sequence: u64,
    #[serde(with = "bigint_ser")]
    #[builder(default)]
    pub value: TokenAmount,
    #[builder(default = "METHOD_SEND")]
    pub method_num: MethodNum,
    #[builder(default)]
    pub gas_limit: u64,
    #[serde(with = "bigint_ser")]
    #[builder(default)]
    pub gas_fee_cap: TokenAmount,
    #[serde(with = "bigint_ser")]
    #[builder(default)]
    pub gas_premium: TokenAmount,
}

impl UnsignedMessage {
    /// Generates an UnsignedMessage builder as a constructor.
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// Assigns the pool-projected nonce. Only meaningful before the message
    /// is applied.
    pub fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }
}

impl Message for UnsignedMessage {
    fn from(&self) -> &Address {
        &self.from
    }
    fn to(&self) -> &Address {
        &self.to
    }
    fn sequence(&self) -> u64 {
        self.sequence
    }
    fn value(&self) -> &TokenAmount {
        &self.value
    }
    fn method_num(&self) -> MethodNum {
        self.method_num
    }
    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }
    fn gas_fee_cap(&self) -> &TokenAmount {
        &self.gas_fee_cap
    }
    fn gas_premium(&self) -> &TokenAmount {
        &self.gas_premium
    }
}

impl Cbor for UnsignedMessage {}
