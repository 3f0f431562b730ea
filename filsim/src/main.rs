// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod cli;
mod logger;

use async_std::task;
use cli::{Cli, Config};
use db::SledDb;
use engine::{Blockchain, BlockchainOptions};
use futures::FutureExt;
use log::{error, info, warn};
use object_store::MemoryObjectStore;
use std::process;
use std::sync::Arc;
use structopt::StructOpt;

fn main() {
    logger::setup_logger();
    let cli = Cli::from_args();
    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = task::block_on(run(config)) {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting filsim daemon");

    let db = Arc::new(SledDb::open(config.data_dir.join("db"))?);
    let object_store = Arc::new(MemoryObjectStore::default());
    let options = BlockchainOptions {
        block_time: config.block_time,
        seed: config.seed,
        num_accounts: config.accounts,
        initial_balance: vm::from_fil(config.balance),
        ..Default::default()
    };

    let blockchain = Arc::new(Blockchain::new(options, db, object_store)?);
    blockchain.init().await?;
    blockchain.wait_for_ready().await;

    for addr in blockchain.wallet_addresses()? {
        let account = blockchain.account(&addr)?;
        info!("account {} with balance {} attoFIL", addr, account.balance);
    }
    info!(
        "chain tip at height {}",
        blockchain.latest_tipset()?.epoch()
    );

    let (interrupt_tx, interrupt_rx) = async_std::channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })?;

    let mut tipsets = blockchain.subscribe_tipsets();
    loop {
        let tipset = tipsets.recv().fuse();
        let interrupt = interrupt_rx.recv().fuse();
        futures::pin_mut!(tipset, interrupt);

        futures::select! {
            tipset = tipset => match tipset {
                Ok(ts) => info!("sealed tipset at height {} ({} block(s))", ts.epoch(), ts.len()),
                Err(_) => warn!("tipset subscription lagged"),
            },
            _ = interrupt => {
                info!("Keyboard interrupt.");
                break;
            }
        }
    }

    blockchain.stop().await;
    Ok(())
}
