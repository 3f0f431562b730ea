// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::config::BlockchainOptions;
use crate::errors::Error;
use crate::genesis;
use crate::market::MarketState;
use address::Address;
use blocks::Tipset;
use chain::{Account, AccountStore, ChainStore};
use cid::Cid;
use crypto::{Signature, SignatureType, Signer};
use db::Store;
use key_management::{KeyStore, KeyStoreConfig, Wallet};
use log::{info, warn};
use message::{Message, SignedMessage, UnsignedMessage};
use message_pool::MessagePool;
use num_bigint::bigint_ser;
use object_store::ObjectStore;
use parking_lot::{Mutex as SyncMutex, RwLock};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use vm::TokenAmount;

/// Caps the fee reservation of a single submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageSendSpec {
    #[serde(with = "bigint_ser")]
    pub max_fee: TokenAmount,
}

/// Signer handle over the shared wallet. Takes the wallet lock only for the
/// duration of one signature, so no sync guard is held across await points.
pub(crate) struct WalletSigner<DB>(pub(crate) Arc<RwLock<Wallet<DB>>>);

impl<DB: Store> Signer for WalletSigner<DB> {
    fn sign_bytes(&self, data: &[u8], address: &Address) -> Result<Signature, crypto::Error> {
        self.0
            .read()
            .sign(address, data)
            .map_err(|e| crypto::Error::SigningError(e.to_string()))
    }
}

/// The blockchain engine façade. Construction is two-phase: [`Blockchain::new`]
/// wires the managers over the KV store but leaves the engine not ready;
/// [`Blockchain::init`] seeds accounts, ensures genesis, starts the object
/// store and the mining timer, and flips readiness. Every operation gates on
/// readiness with [`Error::NotReady`].
pub struct Blockchain<DB, OS> {
    pub(crate) options: BlockchainOptions,
    pub(crate) db: Arc<DB>,
    pub(crate) chain: Arc<ChainStore<DB>>,
    pub(crate) accounts: Arc<AccountStore<DB>>,
    pub(crate) wallet: Arc<RwLock<Wallet<DB>>>,
    pub(crate) mpool: Arc<MessagePool<DB>>,
    pub(crate) object_store: Arc<OS>,
    pub(crate) market: SyncMutex<MarketState>,

    /// Guards the mining critical section. Lock order is always this lock
    /// first, pool lock second.
    pub(crate) mining_lock: Arc<Mutex<()>>,

    /// Deterministic source of ticket and genesis proofs.
    pub(crate) chain_rng: SyncMutex<ChaCha8Rng>,

    ready_tx: watch::Sender<bool>,
    ready_rx: watch::Receiver<bool>,
    pub(crate) stopped: AtomicBool,
    miner_handle: SyncMutex<Option<async_std::task::JoinHandle<()>>>,
}

impl<DB, OS> Blockchain<DB, OS>
where
    DB: Store + Send + Sync + 'static,
    OS: ObjectStore + 'static,
{
    /// Wires the engine's managers over the store. The engine is not ready
    /// until [`Blockchain::init`] has run.
    pub fn new(
        options: BlockchainOptions,
        db: Arc<DB>,
        object_store: Arc<OS>,
    ) -> Result<Self, Error> {
        let chain = Arc::new(ChainStore::new(db.clone())?);
        let accounts = Arc::new(AccountStore::new(db.clone())?);
        let keystore = KeyStore::new(KeyStoreConfig::Persistent(db.clone()))?;
        let wallet = Arc::new(RwLock::new(Wallet::new(keystore)?));
        let mpool = Arc::new(MessagePool::new(accounts.clone()));
        let chain_rng = SyncMutex::new(ChaCha8Rng::seed_from_u64(options.seed));
        let (ready_tx, ready_rx) = watch::channel(false);

        Ok(Self {
            options,
            db,
            chain,
            accounts,
            wallet,
            mpool,
            object_store,
            market: SyncMutex::new(MarketState::default()),
            mining_lock: Arc::new(Mutex::new(())),
            chain_rng,
            ready_tx,
            ready_rx,
            stopped: AtomicBool::new(false),
            miner_handle: SyncMutex::new(None),
        })
    }

    /// Second constructor phase: seeds accounts when the store is empty,
    /// ensures the genesis tipset, reloads deals, starts the object store,
    /// arms the mining timer and flips readiness.
    pub async fn init(self: &Arc<Self>) -> Result<(), Error> {
        self.object_store
            .start()
            .await
            .map_err(|e| Error::Other(e.to_string()))?;

        if self.accounts.is_empty() {
            let mut rng = ChaCha8Rng::seed_from_u64(self.options.seed);
            let mut wallet = self.wallet.write();
            for _ in 0..self.options.num_accounts {
                let addr = wallet.generate_addr_with_rng(SignatureType::BLS, &mut rng)?;
                self.accounts.set_account(Account::new(
                    addr.clone(),
                    self.options.initial_balance.clone(),
                ))?;
                info!("seeded account {}", addr);
            }
        }

        if self.chain.latest_tipset().is_none() {
            let tipset = {
                let mut rng = self.chain_rng.lock();
                genesis::genesis_tipset(&self.options.miner, &mut *rng)?
            };
            self.chain.put_tipset(&tipset, &[])?;
            info!("created genesis tipset {}", tipset.cids()[0]);
        }

        self.load_deals()?;

        if self.options.block_time > 0 {
            let this = self.clone();
            let handle = async_std::task::spawn(async move {
                loop {
                    async_std::task::sleep(Duration::from_secs(this.options.block_time)).await;
                    if this.stopped.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Err(e) = this.mine_tipset(1).await {
                        warn!("timed mining failed: {}", e);
                    }
                }
            });
            *self.miner_handle.lock() = Some(handle);
        }

        let _ = self.ready_tx.send(true);
        info!(
            "engine ready; miner {}, block time {}s",
            self.options.miner, self.options.block_time
        );
        Ok(())
    }

    pub(crate) fn ensure_ready(&self) -> Result<(), Error> {
        if *self.ready_rx.borrow() {
            Ok(())
        } else {
            Err(Error::NotReady)
        }
    }

    /// Resolves once initialisation has completed.
    pub async fn wait_for_ready(&self) {
        let mut rx = self.ready_rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Stream of sealed tipsets, emitted after each durable commit.
    pub fn subscribe_tipsets(&self) -> broadcast::Receiver<Arc<Tipset>> {
        self.chain.subscribe()
    }

    /// Tipset at the head of the chain.
    pub fn latest_tipset(&self) -> Result<Arc<Tipset>, Error> {
        self.ensure_ready()?;
        self.chain.latest_tipset().ok_or(Error::NotReady)
    }

    /// The genesis tipset.
    pub fn genesis_tipset(&self) -> Result<Arc<Tipset>, Error> {
        self.ensure_ready()?;
        self.chain.genesis_tipset().ok_or(Error::NotReady)
    }

    /// Messages applied by the given block, in applied order.
    pub fn messages_for_block(&self, cid: &Cid) -> Result<Vec<SignedMessage>, Error> {
        self.ensure_ready()?;
        Ok(self.chain.messages_for_block(cid)?)
    }

    /// Snapshot of an account's balance and nonce.
    pub fn account(&self, addr: &Address) -> Result<Account, Error> {
        self.ensure_ready()?;
        Ok(self.accounts.get_account(addr)?)
    }

    /// Addresses the engine holds keys for, in stable order.
    pub fn wallet_addresses(&self) -> Result<Vec<Address>, Error> {
        self.ensure_ready()?;
        Ok(self.wallet.read().list_addrs())
    }

    /// Signs and submits a message from a managed account. The nonce is
    /// assigned by the pool projection; submissions must carry nonce 0.
    pub async fn push(
        self: &Arc<Self>,
        msg: UnsignedMessage,
        spec: Option<MessageSendSpec>,
    ) -> Result<SignedMessage, Error> {
        self.ensure_ready()?;
        if let Some(spec) = &spec {
            if msg.gas_fee_cap() * msg.gas_limit() > spec.max_fee {
                return Err(Error::MaxFeeExceeded);
            }
        }
        if !self.wallet.read().has_key(msg.from()) {
            return Err(Error::UnknownPrivateKey(msg.from().clone()));
        }

        let signer = WalletSigner(self.wallet.clone());
        let smsg = self.mpool.push(msg, &signer).await?;
        self.trigger_instamine();
        Ok(smsg)
    }

    /// Submits an externally signed message and returns the CID it is pooled
    /// under.
    pub async fn push_signed(self: &Arc<Self>, smsg: SignedMessage) -> Result<Cid, Error> {
        self.ensure_ready()?;
        let cid = self.mpool.push_signed(smsg).await?;
        self.trigger_instamine();
        Ok(cid)
    }

    /// In instamine mode every accepted submission produces a tipset right
    /// after enqueueing. The miner is fired without awaiting it; the mining
    /// lock serialises the cascade.
    fn trigger_instamine(self: &Arc<Self>) {
        if self.options.block_time != 0 {
            return;
        }
        let this = self.clone();
        async_std::task::spawn(async move {
            if let Err(e) = this.mine_tipset(1).await {
                warn!("instamine failed: {}", e);
            }
        });
    }

    /// Irrevocable shutdown: takes the mining lock, then the pool lock, and
    /// never releases either, so in-flight operations finish and any later
    /// ones park forever. Collaborator failures are swallowed.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        let mining = self.mining_lock.clone().lock_owned().await;
        std::mem::forget(mining);
        self.mpool.lock_forever().await;

        let handle = self.miner_handle.lock().take();
        if let Some(handle) = handle {
            handle.cancel().await;
        }

        if let Err(e) = self.object_store.stop().await {
            warn!("object store stop failed: {}", e);
        }
        if let Err(e) = self.db.flush() {
            warn!("store flush failed: {}", e);
        }
        info!("engine stopped");
    }
}
