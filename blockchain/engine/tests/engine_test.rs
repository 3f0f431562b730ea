// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use address::Address;
use db::MemoryDB;
use engine::{
    Blockchain, BlockchainOptions, DataRef, Error, FileRef, MessageSendSpec, RetrievalOrder,
    StartDealParams, StorageDealStatus,
};
use message::{Message, UnsignedMessage};
use object_store::{MemoryObjectStore, ObjectStore};
use std::sync::Arc;
use vm::TokenAmount;

type Engine = Arc<Blockchain<MemoryDB, MemoryObjectStore>>;

/// Block time high enough that the timer never fires during a test.
const MANUAL: u64 = 3600;
const INSTAMINE: u64 = 0;

async fn engine_over(
    block_time: u64,
    balance: u64,
    db: Arc<MemoryDB>,
    store: Arc<MemoryObjectStore>,
) -> Engine {
    let options = BlockchainOptions {
        block_time,
        seed: 7,
        num_accounts: 2,
        initial_balance: TokenAmount::from(balance),
        ..Default::default()
    };
    let engine = Arc::new(Blockchain::new(options, db, store).unwrap());
    engine.init().await.unwrap();
    engine.wait_for_ready().await;
    engine
}

async fn engine(block_time: u64, balance: u64) -> Engine {
    engine_over(
        block_time,
        balance,
        Arc::new(MemoryDB::default()),
        Arc::new(MemoryObjectStore::default()),
    )
    .await
}

fn transfer(from: &Address, to: &Address, value: u64) -> UnsignedMessage {
    UnsignedMessage::builder()
        .from(from.clone())
        .to(to.clone())
        .value(TokenAmount::from(value))
        .gas_fee_cap(TokenAmount::from(1u8))
        .gas_limit(1)
        .build()
        .unwrap()
}

fn outside_recipient() -> Address {
    Address::new_bls(&[7u8; address::BLS_PUB_LEN]).unwrap()
}

#[async_std::test]
async fn operations_gate_on_readiness() {
    let engine: Engine = Arc::new(
        Blockchain::new(
            BlockchainOptions::default(),
            Arc::new(MemoryDB::default()),
            Arc::new(MemoryObjectStore::default()),
        )
        .unwrap(),
    );
    assert!(matches!(engine.latest_tipset(), Err(Error::NotReady)));
    let err = engine.mine_tipset(1).await.unwrap_err();
    assert!(matches!(err, Error::NotReady));
}

#[async_std::test]
async fn transfer_settles_value_fees_and_nonce() {
    let engine = engine(MANUAL, 100).await;
    let senders = engine.wallet_addresses().unwrap();
    let a = senders[0].clone();
    let b = outside_recipient();

    engine.push(transfer(&a, &b, 10), None).await.unwrap();
    engine.mine_tipset(1).await.unwrap();

    let miner = engine::default_miner_address();
    assert_eq!(engine.account(&a).unwrap().balance, TokenAmount::from(89u8));
    assert_eq!(engine.account(&b).unwrap().balance, TokenAmount::from(10u8));
    assert_eq!(engine.account(&miner).unwrap().balance, TokenAmount::from(1u8));
    assert_eq!(engine.account(&a).unwrap().nonce, 1);
    assert_eq!(engine.latest_tipset().unwrap().epoch(), 1);
}

#[async_std::test]
async fn pool_batches_contiguous_nonces_for_one_sender() {
    let engine = engine(MANUAL, 100).await;
    let a = engine.wallet_addresses().unwrap()[0].clone();
    let b = outside_recipient();

    for expected in 0..3u64 {
        let smsg = engine.push(transfer(&a, &b, 1), None).await.unwrap();
        assert_eq!(smsg.sequence(), expected);
    }
    assert_eq!(engine.account(&a).unwrap().nonce, 0);

    engine.mine_tipset(1).await.unwrap();
    assert_eq!(engine.account(&a).unwrap().nonce, 3);
    assert_eq!(engine.account(&b).unwrap().balance, TokenAmount::from(3u8));
}

#[async_std::test]
async fn insufficient_funds_rejected_at_submission() {
    let engine = engine(MANUAL, 5).await;
    let a = engine.wallet_addresses().unwrap()[0].clone();
    let err = engine
        .push(transfer(&a, &outside_recipient(), 10), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Pool(message_pool::Error::NotEnoughFunds)
    ));
}

#[async_std::test]
async fn fee_above_spec_maximum_rejected() {
    let engine = engine(MANUAL, 100).await;
    let a = engine.wallet_addresses().unwrap()[0].clone();
    let err = engine
        .push(
            transfer(&a, &outside_recipient(), 1),
            Some(MessageSendSpec {
                max_fee: TokenAmount::default(),
            }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MaxFeeExceeded));
}

#[async_std::test]
async fn unmanaged_sender_rejected() {
    let engine = engine(MANUAL, 100).await;
    let foreign = outside_recipient();
    let err = engine
        .push(transfer(&foreign, &outside_recipient(), 1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownPrivateKey(_)));
}

#[async_std::test]
async fn mid_batch_insolvency_skips_message_without_aborting() {
    let db = Arc::new(MemoryDB::default());
    let store = Arc::new(MemoryObjectStore::default());
    let root = store.put(b"retrievable piece".to_vec()).await.unwrap();
    let engine = engine_over(MANUAL, 100, db, store).await;

    let a = engine.wallet_addresses().unwrap()[0].clone();
    let b = outside_recipient();
    engine.push(transfer(&a, &b, 30), None).await.unwrap();
    engine.push(transfer(&a, &b, 60), None).await.unwrap();

    // an out-of-pool debit makes the earlier projection stale
    let dir = tempfile::tempdir().unwrap();
    engine
        .retrieve(
            RetrievalOrder {
                root,
                size: 17,
                total: TokenAmount::from(50u8),
                client: a.clone(),
                miner: engine::default_miner_address(),
            },
            FileRef {
                path: dir.path().join("piece.bin"),
                is_car: false,
            },
        )
        .await
        .unwrap();

    engine.mine_tipset(1).await.unwrap();

    // The first message applied. The second covered its fee but not its
    // value, so it was skipped with the fee debit standing.
    let account = engine.account(&a).unwrap();
    assert_eq!(account.nonce, 1);
    assert_eq!(account.balance, TokenAmount::from(18u8));
    assert_eq!(engine.account(&b).unwrap().balance, TokenAmount::from(30u8));
    assert_eq!(engine.latest_tipset().unwrap().epoch(), 1);

    let tip = engine.latest_tipset().unwrap();
    let applied = engine.messages_for_block(&tip.cids()[0]).unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(*applied[0].value(), TokenAmount::from(30u8));
}

#[async_std::test]
async fn empty_pool_still_seals_heartbeat_tipsets() {
    let engine = engine(MANUAL, 100).await;
    for height in 1..=3 {
        engine.mine_tipset(1).await.unwrap();
        assert_eq!(engine.latest_tipset().unwrap().epoch(), height);
    }
}

#[async_std::test]
async fn sibling_blocks_share_height_and_parents() {
    let engine = engine(MANUAL, 100).await;
    engine.mine_tipset(3).await.unwrap();

    let tip = engine.latest_tipset().unwrap();
    assert_eq!(tip.len(), 3);
    assert_eq!(tip.epoch(), 1);
    let genesis = engine.genesis_tipset().unwrap();
    for block in tip.blocks() {
        assert_eq!(block.parents().cids(), &[genesis.cids()[0]]);
    }
}

#[async_std::test]
async fn balances_are_conserved_across_mining() {
    let engine = engine(MANUAL, 100).await;
    let senders = engine.wallet_addresses().unwrap();
    let b = outside_recipient();
    let total_seeded = TokenAmount::from(200u8);

    for value in [5u64, 11, 2] {
        let mut msg = transfer(&senders[0], &b, value);
        msg.gas_fee_cap = TokenAmount::from(3u8);
        msg.gas_premium = TokenAmount::from(1u8);
        msg.gas_limit = 2;
        engine.push(msg, None).await.unwrap();
        engine.mine_tipset(1).await.unwrap();
    }

    let mut sum = TokenAmount::default();
    for addr in [
        senders[0].clone(),
        senders[1].clone(),
        b,
        engine::default_miner_address(),
        engine::burnt_funds_address(),
    ] {
        sum += engine.account(&addr).unwrap().balance;
    }
    assert_eq!(sum, total_seeded);

    // the burn sink actually received the premium share
    let burnt = engine.account(&engine::burnt_funds_address()).unwrap();
    assert_eq!(burnt.balance, TokenAmount::from(6u8));
}

#[async_std::test]
async fn instamine_seals_a_tipset_per_push() {
    let engine = engine(INSTAMINE, 100).await;
    let a = engine.wallet_addresses().unwrap()[0].clone();
    let b = outside_recipient();
    let mut tipsets = engine.subscribe_tipsets();

    engine.push(transfer(&a, &b, 4), None).await.unwrap();
    let tip = tipsets.recv().await.unwrap();
    assert_eq!(tip.epoch(), 1);

    let applied = engine.messages_for_block(&tip.cids()[0]).unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(*applied[0].value(), TokenAmount::from(4u8));

    engine.push(transfer(&a, &b, 5), None).await.unwrap();
    let tip = tipsets.recv().await.unwrap();
    assert_eq!(tip.epoch(), 2);
}

#[async_std::test]
async fn restart_recovers_the_durable_tip() {
    let db = Arc::new(MemoryDB::default());
    let store = Arc::new(MemoryObjectStore::default());
    let (a, b) = {
        let engine = engine_over(MANUAL, 100, db.clone(), store.clone()).await;
        for _ in 0..5 {
            engine.mine_tipset(1).await.unwrap();
        }
        assert_eq!(engine.latest_tipset().unwrap().epoch(), 5);
        let a = engine.wallet_addresses().unwrap()[0].clone();
        engine.stop().await;
        (a, outside_recipient())
    };

    // a fresh engine over the same store resumes at the committed tip
    let engine = engine_over(MANUAL, 100, db, store).await;
    assert_eq!(engine.latest_tipset().unwrap().epoch(), 5);
    assert_eq!(
        engine.genesis_tipset().unwrap().cids()[0].to_string(),
        engine::GENESIS_CID
    );
    // seeding did not rerun; the wallet still manages the same account
    assert_eq!(engine.wallet_addresses().unwrap()[0], a);

    engine.push(transfer(&a, &b, 1), None).await.unwrap();
    engine.mine_tipset(1).await.unwrap();
    assert_eq!(engine.latest_tipset().unwrap().epoch(), 6);
}

#[async_std::test]
async fn deal_reaches_active_after_fixed_number_of_tipsets() {
    let db = Arc::new(MemoryDB::default());
    let store = Arc::new(MemoryObjectStore::default());
    let root = store.put(vec![9u8; 64]).await.unwrap();
    let engine = engine_over(INSTAMINE, 10_000, db, store).await;

    let client = engine.wallet_addresses().unwrap()[0].clone();
    let proposal_cid = engine
        .start_deal(StartDealParams {
            data: DataRef {
                transfer_type: "graphsync".to_owned(),
                root,
            },
            wallet: Some(client.clone()),
            miner: engine::default_miner_address(),
            epoch_price: TokenAmount::from(2u8),
            min_blocks_duration: 10,
        })
        .await
        .unwrap();

    assert_eq!(
        engine.deal_state(&proposal_cid).unwrap(),
        StorageDealStatus::Active
    );
    // one tipset per state walked
    assert_eq!(
        engine.latest_tipset().unwrap().epoch(),
        StorageDealStatus::steps_until_active() as i64
    );

    // settlement moved the full price to the provider
    assert_eq!(
        engine.account(&client).unwrap().balance,
        TokenAmount::from(10_000u64 - 20)
    );
    let deals = engine.list_deals();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].deal_id, 1);
    assert_eq!(deals[0].size, 64);
}

#[async_std::test]
async fn deal_requires_wallet_and_managed_key() {
    let db = Arc::new(MemoryDB::default());
    let store = Arc::new(MemoryObjectStore::default());
    let root = store.put(vec![1u8; 8]).await.unwrap();
    let engine = engine_over(MANUAL, 100, db, store).await;

    let params = |wallet: Option<Address>| StartDealParams {
        data: DataRef {
            transfer_type: "graphsync".to_owned(),
            root,
        },
        wallet,
        miner: engine::default_miner_address(),
        epoch_price: TokenAmount::from(1u8),
        min_blocks_duration: 1,
    };

    let err = engine.start_deal(params(None)).await.unwrap_err();
    assert!(matches!(err, Error::MissingWallet));

    let err = engine
        .start_deal(params(Some(outside_recipient())))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownPrivateKey(_)));
}

#[async_std::test]
async fn deal_ids_stay_monotonic_across_restart() {
    let db = Arc::new(MemoryDB::default());
    let store = Arc::new(MemoryObjectStore::default());
    let root = store.put(vec![3u8; 16]).await.unwrap();

    let params = |wallet: Address, root| StartDealParams {
        data: DataRef {
            transfer_type: "graphsync".to_owned(),
            root,
        },
        wallet: Some(wallet),
        miner: engine::default_miner_address(),
        epoch_price: TokenAmount::from(1u8),
        min_blocks_duration: 1,
    };

    {
        let engine = engine_over(INSTAMINE, 10_000, db.clone(), store.clone()).await;
        let client = engine.wallet_addresses().unwrap()[0].clone();
        engine.start_deal(params(client, root)).await.unwrap();
        engine.stop().await;
    }

    let engine = engine_over(INSTAMINE, 10_000, db, store.clone()).await;
    let other = store.put(vec![4u8; 16]).await.unwrap();
    let client = engine.wallet_addresses().unwrap()[0].clone();
    engine.start_deal(params(client, other)).await.unwrap();

    let deals = engine.list_deals();
    assert_eq!(
        deals.iter().map(|d| d.deal_id).collect::<Vec<u64>>(),
        vec![1, 2]
    );
}

#[async_std::test]
async fn query_offer_prices_by_size() {
    let db = Arc::new(MemoryDB::default());
    let store = Arc::new(MemoryObjectStore::default());
    let root = store.put(vec![0u8; 32]).await.unwrap();
    let engine = engine_over(MANUAL, 100, db, store).await;

    let offer = engine.create_query_offer(root).await.unwrap();
    assert_eq!(offer.size, 32);
    assert_eq!(offer.min_price, TokenAmount::from(64u8));
    assert_eq!(offer.miner, engine::default_miner_address());

    assert!(engine.has_local(&root).await.unwrap());
    let missing = cid::new_from_raw(b"never stored", cid::Code::Blake2b256);
    assert!(!engine.has_local(&missing).await.unwrap());
    let err = engine.create_query_offer(missing).await.unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));
}

#[async_std::test]
async fn retrieve_writes_file_and_settles_payment() {
    let db = Arc::new(MemoryDB::default());
    let store = Arc::new(MemoryObjectStore::default());
    let root = store.put(b"hello piece".to_vec()).await.unwrap();
    let engine = engine_over(MANUAL, 100, db, store).await;

    let client = engine.wallet_addresses().unwrap()[0].clone();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.bin");

    engine
        .retrieve(
            RetrievalOrder {
                root,
                size: 11,
                total: TokenAmount::from(22u8),
                client: client.clone(),
                miner: engine::default_miner_address(),
            },
            FileRef {
                path: path.clone(),
                is_car: false,
            },
        )
        .await
        .unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"hello piece");
    assert!(!path.with_extension("bin.partial").exists());
    assert_eq!(
        engine.account(&client).unwrap().balance,
        TokenAmount::from(78u8)
    );
    assert_eq!(
        engine
            .account(&engine::default_miner_address())
            .unwrap()
            .balance,
        TokenAmount::from(22u8)
    );
}

#[async_std::test]
async fn retrieve_insufficient_funds_surfaces() {
    let db = Arc::new(MemoryDB::default());
    let store = Arc::new(MemoryObjectStore::default());
    let root = store.put(b"data".to_vec()).await.unwrap();
    let engine = engine_over(MANUAL, 10, db, store).await;

    let client = engine.wallet_addresses().unwrap()[0].clone();
    let dir = tempfile::tempdir().unwrap();
    let err = engine
        .retrieve(
            RetrievalOrder {
                root,
                size: 4,
                total: TokenAmount::from(100u8),
                client,
                miner: engine::default_miner_address(),
            },
            FileRef {
                path: dir.path().join("out.bin"),
                is_car: false,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds));
}

#[async_std::test]
async fn stop_is_idempotent() {
    let engine = engine(MANUAL, 100).await;
    engine.mine_tipset(1).await.unwrap();
    engine.stop().await;
    engine.stop().await;
}
