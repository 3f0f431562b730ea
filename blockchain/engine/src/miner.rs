// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::blockchain::Blockchain;
use crate::burnt_funds_address;
use crate::errors::Error;
use blocks::{BlockHeader, Ticket, Tipset, TipsetKeys};
use crypto::VRFProof;
use db::Store;
use log::{info, warn};
use message::{Message, SignedMessage};
use num_bigint::BigInt;
use object_store::ObjectStore;
use rand::RngCore;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

impl<DB, OS> Blockchain<DB, OS>
where
    DB: Store + Send + Sync + 'static,
    OS: ObjectStore + 'static,
{
    /// Seals one tipset of `n` sibling blocks on top of the current head.
    ///
    /// Under the mining lock: the pool is drained, the drained batch is
    /// applied to the ledger in submission order, the tipset together with
    /// its messages and the new chain tip is committed in one atomic write,
    /// in-process deals advance one state, and the tipset event fires. An
    /// empty pool still seals a heartbeat tipset.
    pub async fn mine_tipset(&self, n: usize) -> Result<(), Error> {
        self.ensure_ready()?;
        let _mining = self.mining_lock.lock().await;

        let batch = self.mpool.drain().await;

        let latest = self.chain.latest_tipset().ok_or(Error::NotReady)?;
        let height = latest.epoch() + 1;
        // single-parent chain: everything links to the first block of the head
        let parents = TipsetKeys::new(vec![latest.cids()[0]]);
        let first = &latest.blocks()[0];
        let weight = first.weight() + BigInt::from(first.election_proof().win_count);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let n = n.max(1);
        let mut headers = Vec::with_capacity(n);
        for _ in 0..n {
            headers.push(
                BlockHeader::builder()
                    .miner_address(self.options.miner.clone())
                    .parents(parents.clone())
                    .weight(weight.clone())
                    .epoch(height)
                    .ticket(Ticket::new(VRFProof::new(self.draw_proof())))
                    .timestamp(timestamp)
                    .build_and_validate()?,
            );
        }
        let tipset = Tipset::new(headers)?;

        let mut successful: Vec<SignedMessage> = Vec::with_capacity(batch.len());
        for msg in batch {
            if self.apply_message(&msg)? {
                successful.push(msg);
            }
        }

        self.chain.put_tipset(&tipset, &successful)?;
        self.advance_deals()?;

        info!(
            "sealed tipset at height {} with {} message(s)",
            height,
            successful.len()
        );
        self.chain.publish(Arc::new(tipset));
        Ok(())
    }

    /// Applies one message to the ledger: burn the base fee, pay the miner
    /// tip, move the principal, then bump the sender's nonce. An insolvent
    /// step skips the message with a warning; earlier debits of the same
    /// message stand, and the rest of the batch continues.
    fn apply_message(&self, msg: &SignedMessage) -> Result<bool, Error> {
        let from = msg.from();

        let burn = msg.base_fee_burn();
        if !self
            .accounts
            .transfer_funds(from, &burnt_funds_address(), &burn)?
        {
            warn!("skipping message from {}: cannot cover base fee burn", from);
            return Ok(false);
        }

        let tip = msg.miner_tip();
        if !self
            .accounts
            .transfer_funds(from, &self.options.miner, &tip)?
        {
            warn!("skipping message from {}: cannot cover miner tip", from);
            return Ok(false);
        }

        if !self
            .accounts
            .transfer_funds(from, msg.to(), msg.value())?
        {
            warn!(
                "skipping message from {}: cannot cover transferred value",
                from
            );
            return Ok(false);
        }

        self.accounts.increment_nonce(from)?;
        Ok(true)
    }

    fn draw_proof(&self) -> Vec<u8> {
        let mut proof = [0u8; 32];
        self.chain_rng.lock().fill_bytes(&mut proof);
        proof.to_vec()
    }
}
