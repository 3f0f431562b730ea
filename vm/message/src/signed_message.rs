// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Message, UnsignedMessage};
use address::Address;
use crypto::{Error as CryptoError, Signature, Signer};
use encoding::tuple::*;
use encoding::Cbor;
use vm::{MethodNum, TokenAmount};

/// Represents a wrapped message with signature bytes.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Serialize_tuple, Deserialize_tuple)]
pub struct SignedMessage {
    message: UnsignedMessage,
    signature: Signature,
}

impl SignedMessage {
    /// Generate a new signed message from an unsigned message and a signer.
    pub fn new<S: Signer>(message: UnsignedMessage, signer: &S) -> Result<Self, CryptoError> {
        let bz = message
            .marshal_cbor()
            .map_err(|e| CryptoError::SigningError(e.to_string()))?;

        let signature = signer.sign_bytes(&bz, message.from())?;

        Ok(SignedMessage { message, signature })
    }

    /// Generate a signed message from fields. Used when the signature was
    /// produced elsewhere (an external wallet submitting over RPC).
    pub fn new_from_parts(message: UnsignedMessage, signature: Signature) -> SignedMessage {
        SignedMessage { message, signature }
    }

    /// Returns reference to the unsigned message.
    pub fn message(&self) -> &UnsignedMessage {
        &self.message
    }

    /// Returns signature of the signed message.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Consumes self and returns it's unsigned message.
    pub fn into_message(self) -> UnsignedMessage {
        self.message
    }

    /// Verifies that the supplied signature covers the current encoding of
    /// the inner message.
    pub fn verify(&self) -> Result<(), String> {
        let bz = self.message.marshal_cbor().map_err(|e| e.to_string())?;
        self.signature.verify(&bz, self.message.from())
    }

    /// Assigns the pool-projected nonce to the inner message. The attached
    /// signature keeps covering the submitted encoding, not the amended one;
    /// see the simulator's submission contract.
    pub fn set_sequence(&mut self, sequence: u64) {
        self.message.set_sequence(sequence)
    }
}

impl Message for SignedMessage {
    fn from(&self) -> &Address {
        self.message.from()
    }
    fn to(&self) -> &Address {
        self.message.to()
    }
    fn sequence(&self) -> u64 {
        self.message.sequence()
    }
    fn value(&self) -> &TokenAmount {
        self.message.value()
    }
    fn method_num(&self) -> MethodNum {
        self.message.method_num()
    }
    fn gas_limit(&self) -> u64 {
        self.message.gas_limit()
    }
    fn gas_fee_cap(&self) -> &TokenAmount {
        self.message.gas_fee_cap()
    }
    fn gas_premium(&self) -> &TokenAmount {
        self.message.gas_premium()
    }
}

impl Cbor for SignedMessage {}
