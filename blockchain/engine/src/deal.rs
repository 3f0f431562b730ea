// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use address::Address;
use cid::Cid;
use num_bigint::bigint_ser;
use serde::{Deserialize, Serialize};
use vm::TokenAmount;

/// Canonical storage-deal states. The simulator only walks the linear happy
/// path of [`StorageDealStatus::next_successful`]; the remaining states exist
/// so stored deals stay readable by clients that know the full enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageDealStatus {
    Unknown,
    ProposalNotFound,
    ProposalRejected,
    ProposalAccepted,
    AcceptWait,
    Staged,
    Sealing,
    Finalizing,
    Active,
    Expired,
    Slashed,
    Rejecting,
    Failing,
    FundsReserved,
    CheckForAcceptance,
    Validating,
    Transferring,
    WaitingForData,
    VerifiedData,
    EnsureProviderFunds,
    EnsureClientFunds,
    ProviderFunding,
    ClientFunding,
    Publish,
    Publishing,
    Error,
}

impl StorageDealStatus {
    /// One step of the linear happy path a simulated deal walks, one state
    /// per sealed tipset. States off the path hold still.
    pub fn next_successful(self) -> StorageDealStatus {
        use StorageDealStatus::*;
        match self {
            Validating => Staged,
            Staged => EnsureProviderFunds,
            EnsureProviderFunds => EnsureClientFunds,
            EnsureClientFunds => FundsReserved,
            FundsReserved => ProviderFunding,
            ProviderFunding => ClientFunding,
            ClientFunding => Publish,
            Publish => Publishing,
            Publishing => Transferring,
            Transferring => Sealing,
            Sealing => Finalizing,
            Finalizing => Active,
            Active => Expired,
            other => other,
        }
    }

    /// Number of sealed tipsets a fresh deal needs before it is active.
    pub fn steps_until_active() -> usize {
        let mut state = StorageDealStatus::Validating;
        let mut steps = 0;
        while state != StorageDealStatus::Active {
            state = state.next_successful();
            steps += 1;
        }
        steps
    }
}

/// A simulated storage agreement between a client and the in-process miner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DealInfo {
    /// Monotonically increasing identifier, starting at 1.
    #[serde(rename = "DealID")]
    pub deal_id: u64,
    pub proposal_cid: Cid,
    pub state: StorageDealStatus,
    /// Human-readable progress or failure note.
    pub message: String,
    pub provider: Address,
    pub client: Address,
    #[serde(rename = "PieceCID")]
    pub piece_cid: Cid,
    pub size: u64,
    #[serde(with = "bigint_ser")]
    pub price_per_epoch: TokenAmount,
    pub duration: u64,
}

impl DealInfo {
    /// Total settlement amount of the deal.
    pub fn total_price(&self) -> TokenAmount {
        &self.price_per_epoch * self.duration
    }
}
