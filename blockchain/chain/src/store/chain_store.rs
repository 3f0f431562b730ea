// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::Error;
use blocks::{BlockHeader, Tipset, TipsetKeys};
use cid::Cid;
use clock::ChainEpoch;
use db::Store;
use encoding::Cbor;
use log::debug;
use message::SignedMessage;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::convert::TryInto;
use std::sync::Arc;
use tokio::sync::broadcast::{channel, Receiver as Subscriber, Sender as Publisher};

const LATEST_TIPSET_KEY: &str = "latest-tipset";

/// Capacity of the tipset event channel. Slow subscribers lag rather than
/// block the miner.
const TIPSET_CHANNEL_CAP: usize = 16;

fn block_key(cid: &Cid) -> String {
    format!("blocks/{}", cid)
}

fn tipset_key(epoch: ChainEpoch) -> String {
    format!("tipsets/{}", epoch)
}

fn message_key(cid: &Cid) -> String {
    format!("signedMessages/{}", cid)
}

fn block_messages_key(cid: &Cid) -> String {
    format!("blockMessages/{}", cid)
}

/// The chain ledger managers rolled into one store: block headers, tipset
/// records, signed messages and the block-to-messages index, all write-through
/// cached over namespaced partitions of the KV store, plus the durable
/// `latest-tipset` chain tip.
pub struct ChainStore<DB> {
    db: Arc<DB>,

    /// Tipset at the head of the chain, kept in sync with the durable tip.
    latest: RwLock<Option<Arc<Tipset>>>,

    /// The genesis tipset.
    earliest: RwLock<Option<Arc<Tipset>>>,

    headers: RwLock<HashMap<Cid, BlockHeader>>,
    tipsets: RwLock<HashMap<ChainEpoch, TipsetKeys>>,

    /// Emits every sealed tipset after its durable commit.
    publisher: Publisher<Arc<Tipset>>,
}

impl<DB> ChainStore<DB>
where
    DB: Store,
{
    /// Constructor, warms the tip caches from the store when it is not empty.
    pub fn new(db: Arc<DB>) -> Result<Self, Error> {
        let (publisher, _) = channel(TIPSET_CHANNEL_CAP);
        let cs = Self {
            db,
            latest: RwLock::new(None),
            earliest: RwLock::new(None),
            headers: RwLock::new(HashMap::new()),
            tipsets: RwLock::new(HashMap::new()),
            publisher,
        };

        if let Some(bz) = cs.db.read(LATEST_TIPSET_KEY)? {
            let height = i64::from_be_bytes(
                bz.as_slice()
                    .try_into()
                    .map_err(|_| Error::Encoding("invalid latest-tipset record".to_string()))?,
            );
            let latest = cs
                .tipset_by_height(height)?
                .ok_or_else(|| Error::UndefinedKey(tipset_key(height)))?;
            let earliest = cs
                .tipset_by_height(0)?
                .ok_or_else(|| Error::UndefinedKey(tipset_key(0)))?;
            debug!("loaded chain tip at height {}", height);
            *cs.latest.write() = Some(latest);
            *cs.earliest.write() = Some(earliest);
        }

        Ok(cs)
    }

    /// Returns the tipset at the head of the chain, if a genesis exists.
    pub fn latest_tipset(&self) -> Option<Arc<Tipset>> {
        self.latest.read().clone()
    }

    /// Returns the genesis tipset, if one was committed.
    pub fn genesis_tipset(&self) -> Option<Arc<Tipset>> {
        self.earliest.read().clone()
    }

    /// Returns the header stored under the given CID.
    pub fn header(&self, cid: &Cid) -> Result<Option<BlockHeader>, Error> {
        if let Some(header) = self.headers.read().get(cid) {
            return Ok(Some(header.clone()));
        }
        match self.db.read(block_key(cid))? {
            Some(bz) => {
                let header = BlockHeader::unmarshal_cbor(&bz)?;
                self.headers.write().insert(*cid, header.clone());
                Ok(Some(header))
            }
            None => Ok(None),
        }
    }

    /// Loads the tipset persisted for the given height, joining its stored
    /// key on the header partition.
    pub fn tipset_by_height(&self, height: ChainEpoch) -> Result<Option<Arc<Tipset>>, Error> {
        let cached = self.tipsets.read().get(&height).cloned();
        let keys = match cached {
            Some(keys) => keys,
            None => match self.db.read(tipset_key(height))? {
                Some(bz) => {
                    let keys = TipsetKeys::unmarshal_cbor(&bz)?;
                    self.tipsets.write().insert(height, keys.clone());
                    keys
                }
                None => return Ok(None),
            },
        };

        let mut headers = Vec::with_capacity(keys.cids().len());
        for cid in keys.cids() {
            let header = self
                .header(cid)?
                .ok_or_else(|| Error::UndefinedKey(block_key(cid)))?;
            headers.push(header);
        }
        Ok(Some(Arc::new(Tipset::from_parts(keys, headers)?)))
    }

    /// Commits a sealed tipset: headers, messages, the block-to-messages
    /// index (everything attributed to the first block), the tipset record
    /// and the chain tip land in one atomic bulk write, after which the in-
    /// memory tip advances. Publishing the tipset event is left to the
    /// caller, which still has deal advancement to run.
    pub fn put_tipset(&self, tipset: &Tipset, messages: &[SignedMessage]) -> Result<(), Error> {
        let height = tipset.epoch();
        let mut keys: Vec<Vec<u8>> = Vec::new();
        let mut values: Vec<Vec<u8>> = Vec::new();

        for block in tipset.blocks() {
            keys.push(block_key(block.cid()).into_bytes());
            values.push(block.marshal_cbor()?);
        }

        let mut msg_cids: Vec<Cid> = Vec::with_capacity(messages.len());
        for msg in messages {
            let cid = msg.cid()?;
            keys.push(message_key(&cid).into_bytes());
            values.push(msg.marshal_cbor()?);
            msg_cids.push(cid);
        }

        keys.push(block_messages_key(&tipset.cids()[0]).into_bytes());
        values.push(
            encoding::to_vec(&msg_cids).map_err(|e| Error::Encoding(e.to_string()))?,
        );

        keys.push(tipset_key(height).into_bytes());
        values.push(tipset.key().marshal_cbor()?);

        keys.push(LATEST_TIPSET_KEY.as_bytes().to_vec());
        values.push(height.to_be_bytes().to_vec());

        self.db.bulk_write(&keys, &values)?;

        {
            let mut headers = self.headers.write();
            for block in tipset.blocks() {
                headers.insert(*block.cid(), block.clone());
            }
        }
        self.tipsets.write().insert(height, tipset.key().clone());

        let tipset = Arc::new(tipset.clone());
        if height == 0 {
            *self.earliest.write() = Some(tipset.clone());
        }
        *self.latest.write() = Some(tipset);

        Ok(())
    }

    /// Returns the signed message stored under the given CID.
    pub fn message(&self, cid: &Cid) -> Result<Option<SignedMessage>, Error> {
        match self.db.read(message_key(cid))? {
            Some(bz) => Ok(Some(SignedMessage::unmarshal_cbor(&bz)?)),
            None => Ok(None),
        }
    }

    /// Returns the messages attributed to the given block, in applied order.
    /// Blocks without an index entry (genesis, sibling blocks) have none.
    pub fn messages_for_block(&self, cid: &Cid) -> Result<Vec<SignedMessage>, Error> {
        let cids: Vec<Cid> = match self.db.read(block_messages_key(cid))? {
            Some(bz) => {
                encoding::from_slice(&bz).map_err(|e| Error::Encoding(e.to_string()))?
            }
            None => return Ok(Vec::new()),
        };

        let mut messages = Vec::with_capacity(cids.len());
        for cid in &cids {
            let msg = self
                .message(cid)?
                .ok_or_else(|| Error::UndefinedKey(message_key(cid)))?;
            messages.push(msg);
        }
        Ok(messages)
    }

    /// Subscribes to sealed tipsets.
    pub fn subscribe(&self) -> Subscriber<Arc<Tipset>> {
        self.publisher.subscribe()
    }

    /// Publishes a committed tipset to subscribers. A send error only means
    /// nobody is listening.
    pub fn publish(&self, tipset: Arc<Tipset>) {
        let _ = self.publisher.send(tipset);
    }
}
