// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod election_proof;
mod errors;
mod header;
mod ticket;
mod tipset;

pub use self::election_proof::ElectionProof;
pub use self::errors::Error;
pub use self::header::{BlockHeader, BlockHeaderBuilder};
pub use self::ticket::Ticket;
pub use self::tipset::{Tipset, TipsetKeys};
