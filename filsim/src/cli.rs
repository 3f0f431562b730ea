// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use structopt::StructOpt;

/// CLI structure generated when interacting with the filsim binary.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "filsim",
    version = "0.1.0",
    about = "Filecoin devnet simulator. This command starts the daemon process",
    author = "ChainSafe Systems <info@chainsafe.io>"
)]
pub struct Cli {
    #[structopt(short, long, help = "A toml file containing relevant configurations")]
    pub config: Option<String>,
    #[structopt(long, help = "Seconds between sealed tipsets (0 mines on submission)")]
    pub block_time: Option<u64>,
    #[structopt(long, help = "Directory holding the chain database")]
    pub data_dir: Option<PathBuf>,
    #[structopt(long, help = "Number of accounts seeded at genesis")]
    pub accounts: Option<usize>,
    #[structopt(long, help = "Starting balance of each seeded account, in FIL")]
    pub balance: Option<u64>,
    #[structopt(long, help = "Seed behind deterministic accounts and tickets")]
    pub seed: Option<u64>,
}

/// Daemon configuration. Values in the config file are overridden by their
/// CLI counterparts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub block_time: u64,
    pub data_dir: PathBuf,
    pub accounts: usize,
    pub balance: u64,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_time: 0,
            data_dir: PathBuf::from("filsim-data"),
            accounts: 10,
            balance: 100,
            seed: 0,
        }
    }
}

impl Cli {
    pub fn to_config(&self) -> Result<Config, io::Error> {
        let mut cfg: Config = match &self.config {
            Some(config_file) => {
                let toml = fs::read_to_string(config_file)?;
                toml::from_str(&toml)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
            }
            None => Config::default(),
        };

        if let Some(block_time) = self.block_time {
            cfg.block_time = block_time;
        }
        if let Some(data_dir) = &self.data_dir {
            cfg.data_dir = data_dir.clone();
        }
        if let Some(accounts) = self.accounts {
            cfg.accounts = accounts;
        }
        if let Some(balance) = self.balance {
            cfg.balance = balance;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        Ok(cfg)
    }
}
