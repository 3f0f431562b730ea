// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::blockchain::Blockchain;
use crate::deal::{DealInfo, StorageDealStatus};
use crate::errors::Error;
use address::Address;
use cid::{Cid, Code::Blake2b256};
use db::Store;
use log::info;
use num_bigint::bigint_ser::{self, BigIntSer};
use object_store::{ObjectStat, ObjectStore};
use serde::{Deserialize, Serialize};
use std::convert::TryInto;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use vm::TokenAmount;

/// Bound on every `stat`/`read` against the IPFS-like collaborator; an
/// overrun surfaces as [`Error::ObjectNotFound`].
const OBJECT_STORE_TIMEOUT: Duration = Duration::from_millis(500);

/// Default retrieval payment interval, in bytes.
const PAYMENT_INTERVAL: u64 = 1 << 20;

const DEAL_COUNT_KEY: &str = "deal-count";

fn deal_key(id: u64) -> String {
    format!("deals/{}", id)
}

/// Reference to the data a deal covers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataRef {
    pub transfer_type: String,
    pub root: Cid,
}

/// Client parameters of a storage deal.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartDealParams {
    pub data: DataRef,
    pub wallet: Option<Address>,
    pub miner: Address,
    #[serde(with = "bigint_ser")]
    pub epoch_price: TokenAmount,
    pub min_blocks_duration: u64,
}

/// Offer answering a retrieval query.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryOffer {
    pub root: Cid,
    pub size: u64,
    #[serde(with = "bigint_ser")]
    pub min_price: TokenAmount,
    #[serde(with = "bigint_ser")]
    pub unseal_price: TokenAmount,
    pub payment_interval: u64,
    pub payment_interval_increase: u64,
    pub miner: Address,
}

/// An accepted retrieval, ready to execute.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetrievalOrder {
    pub root: Cid,
    pub size: u64,
    #[serde(with = "bigint_ser")]
    pub total: TokenAmount,
    pub client: Address,
    pub miner: Address,
}

/// Destination file of a retrieval.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileRef {
    pub path: PathBuf,
    pub is_car: bool,
}

/// Deal bookkeeping: every deal ever made, and the ids of those still
/// walking towards `Active`.
#[derive(Default)]
pub(crate) struct MarketState {
    pub(crate) deals: Vec<DealInfo>,
    pub(crate) in_process: Vec<u64>,
}

impl<DB, OS> Blockchain<DB, OS>
where
    DB: Store + Send + Sync + 'static,
    OS: ObjectStore + 'static,
{
    /// Reloads persisted deals. Deals interrupted mid-lifecycle resume
    /// advancement with the next sealed tipset.
    pub(crate) fn load_deals(&self) -> Result<(), Error> {
        let count = match self.db.read(DEAL_COUNT_KEY)? {
            Some(bz) => u64::from_be_bytes(
                bz.as_slice()
                    .try_into()
                    .map_err(|_| Error::Encoding("invalid deal-count record".to_string()))?,
            ),
            None => 0,
        };

        let mut market = self.market.lock();
        market.deals.clear();
        market.in_process.clear();
        for id in 1..=count {
            let bz = self
                .db
                .read(deal_key(id))?
                .ok_or_else(|| Error::Other(format!("missing record for deal {}", id)))?;
            let deal: DealInfo =
                encoding::from_slice(&bz).map_err(|e| Error::Encoding(e.to_string()))?;
            if !matches!(
                deal.state,
                StorageDealStatus::Active | StorageDealStatus::Expired
            ) {
                market.in_process.push(id);
            }
            market.deals.push(deal);
        }
        if count > 0 {
            info!(
                "loaded {} deal(s), {} in process",
                count,
                market.in_process.len()
            );
        }
        Ok(())
    }

    fn persist_deal(&self, deal: &DealInfo) -> Result<(), Error> {
        let bz = encoding::to_vec(deal).map_err(|e| Error::Encoding(e.to_string()))?;
        self.db.write(deal_key(deal.deal_id), bz)?;
        Ok(())
    }

    /// Starts a simulated storage deal: size the data via the object store,
    /// sign the proposal with the client wallet, register the deal, drive it
    /// to `Active` when instamining, and settle the full price with the
    /// provider.
    pub async fn start_deal(self: &Arc<Self>, params: StartDealParams) -> Result<Cid, Error> {
        self.ensure_ready()?;
        let client = params.wallet.clone().ok_or(Error::MissingWallet)?;
        if !self.wallet.read().has_key(&client) {
            return Err(Error::UnknownPrivateKey(client));
        }

        let stat = self.stat_with_timeout(&params.data.root).await?;

        let proposal_bz = encoding::to_vec(&(
            &params.data.root,
            &client,
            &params.miner,
            BigIntSer(&params.epoch_price),
            params.min_blocks_duration,
        ))
        .map_err(|e| Error::Encoding(e.to_string()))?;
        let signature = self.wallet.read().sign(&client, &proposal_bz)?;

        // Simulator shortcut kept for fixture compatibility: the proposal CID
        // addresses the hex string of the signature bytes, not a conformant
        // DealProposal encoding.
        let hex_sig = hex::encode(signature.bytes());
        let sig_bz =
            encoding::to_vec(&hex_sig).map_err(|e| Error::Encoding(e.to_string()))?;
        let proposal_cid = cid::new_from_cbor(&sig_bz, Blake2b256);

        let deal = {
            let mut market = self.market.lock();
            let deal_id = market.deals.len() as u64 + 1;
            let deal = DealInfo {
                deal_id,
                proposal_cid,
                state: StorageDealStatus::Validating,
                message: String::new(),
                provider: params.miner.clone(),
                client: client.clone(),
                piece_cid: params.data.root,
                size: stat.size,
                price_per_epoch: params.epoch_price.clone(),
                duration: params.min_blocks_duration,
            };
            self.persist_deal(&deal)?;
            self.db.write(DEAL_COUNT_KEY, deal_id.to_be_bytes())?;
            market.in_process.push(deal_id);
            market.deals.push(deal.clone());
            deal
        };
        info!("started deal {} ({})", deal.deal_id, deal.proposal_cid);

        if self.options.block_time == 0 {
            // drive the deal through its lifecycle before returning
            while self.deal_state(&proposal_cid)? != StorageDealStatus::Active {
                self.mine_tipset(1).await?;
            }
        }

        if !self
            .accounts
            .transfer_funds(&client, &deal.provider, &deal.total_price())?
        {
            return Err(Error::InsufficientFunds);
        }

        Ok(proposal_cid)
    }

    /// Current state of a deal, by proposal CID.
    pub fn deal_state(&self, proposal_cid: &Cid) -> Result<StorageDealStatus, Error> {
        self.market
            .lock()
            .deals
            .iter()
            .find(|d| &d.proposal_cid == proposal_cid)
            .map(|d| d.state)
            .ok_or_else(|| Error::Other(format!("unknown deal {}", proposal_cid)))
    }

    /// Every deal ever made, in creation order.
    pub fn list_deals(&self) -> Vec<DealInfo> {
        self.market.lock().deals.clone()
    }

    /// Advances every in-process deal one state. Runs inside the mining
    /// critical section; deals reaching `Active` leave the in-process set.
    pub(crate) fn advance_deals(&self) -> Result<(), Error> {
        let mut market = self.market.lock();
        let MarketState { deals, in_process } = &mut *market;

        let mut still_in_process = Vec::with_capacity(in_process.len());
        for id in in_process.drain(..) {
            let deal = &mut deals[(id - 1) as usize];
            deal.state = deal.state.next_successful();
            if deal.state == StorageDealStatus::Active {
                info!("deal {} is active", deal.deal_id);
            } else {
                still_in_process.push(id);
            }
            let deal = deal.clone();
            self.persist_deal(&deal)?;
        }
        *in_process = still_in_process;
        Ok(())
    }

    /// Builds a retrieval offer for locally available data.
    pub async fn create_query_offer(&self, root: Cid) -> Result<QueryOffer, Error> {
        self.ensure_ready()?;
        let stat = self.stat_with_timeout(&root).await?;
        Ok(QueryOffer {
            root,
            size: stat.size,
            min_price: TokenAmount::from(stat.size * 2),
            unseal_price: TokenAmount::default(),
            payment_interval: PAYMENT_INTERVAL,
            payment_interval_increase: PAYMENT_INTERVAL,
            miner: self.options.miner.clone(),
        })
    }

    /// Streams the object behind the order to the destination file and
    /// settles the retrieval payment. The bytes land in a `.partial` file
    /// first and are promoted with an atomic rename.
    pub async fn retrieve(&self, order: RetrievalOrder, file_ref: FileRef) -> Result<(), Error> {
        self.ensure_ready()?;
        self.stat_with_timeout(&order.root).await?;

        let data = match async_std::future::timeout(
            OBJECT_STORE_TIMEOUT,
            self.object_store.read(&order.root),
        )
        .await
        {
            Ok(Ok(data)) => data,
            Ok(Err(_)) | Err(_) => return Err(Error::ObjectNotFound(order.root)),
        };

        let mut partial = file_ref.path.clone().into_os_string();
        partial.push(".partial");
        let partial = PathBuf::from(partial);
        async_std::fs::write(&partial, &data).await?;
        async_std::fs::rename(&partial, &file_ref.path).await?;

        if !self
            .accounts
            .transfer_funds(&order.client, &order.miner, &order.total)?
        {
            return Err(Error::InsufficientFunds);
        }
        Ok(())
    }

    /// Whether the object store holds the given root locally.
    pub async fn has_local(&self, cid: &Cid) -> Result<bool, Error> {
        self.ensure_ready()?;
        Ok(self.stat_with_timeout(cid).await.is_ok())
    }

    pub(crate) async fn stat_with_timeout(&self, cid: &Cid) -> Result<ObjectStat, Error> {
        match async_std::future::timeout(OBJECT_STORE_TIMEOUT, self.object_store.stat(cid)).await
        {
            Ok(Ok(stat)) => Ok(stat),
            Ok(Err(_)) | Err(_) => Err(Error::ObjectNotFound(*cid)),
        }
    }
}
