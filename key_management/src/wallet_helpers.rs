// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::Error;
use address::Address;
use bls_signatures::{PrivateKey as BlsPrivate, Serialize as BlsSerialize};
use crypto::{Signature, SignatureType};
use encoding::blake2b_256;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};
use secp256k1::{Message as SecpMessage, PublicKey as SecpPublic, SecretKey as SecpPrivate};

/// Return the public key for a given private_key and [SignatureType].
pub fn to_public(sig_type: SignatureType, private_key: &[u8]) -> Result<Vec<u8>, Error> {
    match sig_type {
        SignatureType::BLS => Ok(BlsPrivate::from_bytes(private_key)
            .map_err(|err| Error::Other(err.to_string()))?
            .public_key()
            .as_bytes()),
        SignatureType::Secp256k1 => {
            let private_key = SecpPrivate::parse_slice(private_key)
                .map_err(|err| Error::Other(err.to_string()))?;
            let public_key = SecpPublic::from_secret_key(&private_key);
            Ok(public_key.serialize().to_vec())
        }
    }
}

/// Return a new [Address] of the given [SignatureType], derived from the
/// supplied public key.
pub fn new_address(sig_type: SignatureType, public_key: &[u8]) -> Result<Address, Error> {
    match sig_type {
        SignatureType::BLS => Ok(Address::new_bls(public_key)?),
        SignatureType::Secp256k1 => Ok(Address::new_secp256k1(public_key)?),
    }
}

/// Sign takes in [SignatureType], private key and message. Returns a
/// [Signature] for that message.
pub fn sign(sig_type: SignatureType, private_key: &[u8], msg: &[u8]) -> Result<Signature, Error> {
    match sig_type {
        SignatureType::BLS => {
            let priv_key =
                BlsPrivate::from_bytes(private_key).map_err(|err| Error::Other(err.to_string()))?;
            let sig = priv_key.sign(msg);
            Ok(Signature::new_bls(sig.as_bytes()))
        }
        SignatureType::Secp256k1 => {
            let priv_key = SecpPrivate::parse_slice(private_key)
                .map_err(|err| Error::Other(err.to_string()))?;
            let msg_hash = blake2b_256(msg);
            let message = SecpMessage::parse(&msg_hash);
            let (sig, recovery_id) = secp256k1::sign(&message, &priv_key);
            let mut new_bytes = [0; 65];
            new_bytes[..64].copy_from_slice(&sig.serialize());
            new_bytes[64] = recovery_id.serialize();
            Ok(Signature::new_secp256k1(new_bytes.to_vec()))
        }
    }
}

/// Generate a new private key using the OS randomness source.
pub fn generate(sig_type: SignatureType) -> Result<Vec<u8>, Error> {
    generate_with_rng(sig_type, &mut OsRng)
}

/// Generate a new private key from the supplied randomness source. With a
/// seeded RNG this yields the same key sequence on every run, which is how
/// genesis accounts stay stable for a given wallet seed.
pub fn generate_with_rng<R>(sig_type: SignatureType, rng: &mut R) -> Result<Vec<u8>, Error>
where
    R: Rng + CryptoRng,
{
    match sig_type {
        SignatureType::BLS => {
            let key = BlsPrivate::generate(rng);
            Ok(key.as_bytes())
        }
        SignatureType::Secp256k1 => {
            let key = SecpPrivate::random(rng);
            Ok(key.serialize().to_vec())
        }
    }
}
