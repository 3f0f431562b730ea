// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::{CodecProtocol, Error};
use cid::{Cid, Code::Blake2b256};
use serde::{de::DeserializeOwned, Serialize};

/// Marshalling through the canonical CBOR representation of a type. The
/// derived `cid` addresses the marshalled bytes, so two values with the same
/// encoding share a content identifier.
pub trait Cbor: Serialize + DeserializeOwned {
    /// Encode into canonical CBOR bytes.
    fn marshal_cbor(&self) -> Result<Vec<u8>, Error> {
        serde_cbor::to_vec(&self).map_err(|e| Error::Marshalling {
            formatted_data: e.to_string(),
            protocol: CodecProtocol::Cbor,
        })
    }

    /// Decode from CBOR bytes.
    fn unmarshal_cbor(bz: &[u8]) -> Result<Self, Error> {
        serde_cbor::from_slice(bz).map_err(|e| Error::Unmarshalling {
            formatted_data: e.to_string(),
            protocol: CodecProtocol::Cbor,
        })
    }

    /// Content identifier of the canonical encoding.
    fn cid(&self) -> Result<Cid, Error> {
        Ok(cid::new_from_cbor(&self.marshal_cbor()?, Blake2b256))
    }
}
