// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::Error;
use address::Address;
use db::Store;
use encoding::tuple::*;
use encoding::Cbor;
use num_bigint::bigint_ser;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use vm::TokenAmount;

const ACCOUNTS_INDEX_KEY: &str = "accounts";

fn account_key(addr: &Address) -> String {
    format!("accounts/{}", addr)
}

/// Balance and nonce record of a single account. The nonce is the next one
/// to be assigned, so a fresh account starts at 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
pub struct Account {
    pub address: Address,
    #[serde(with = "bigint_ser")]
    pub balance: TokenAmount,
    pub nonce: u64,
}

impl Cbor for Account {}

impl Account {
    /// A fresh account with the given starting balance.
    pub fn new(address: Address, balance: TokenAmount) -> Self {
        Self {
            address,
            balance,
            nonce: 0,
        }
    }
}

/// The account ledger: write-through cached `accounts/<address>` records with
/// an index record for restart enumeration. Unknown addresses materialise as
/// zero-balance records on first touch, so recipients need no registration.
///
/// All mutations run under the store's own sync lock, which keeps
/// `transfer_funds` atomic with respect to both submitters (pool lock held)
/// and the miner (mining lock held).
pub struct AccountStore<DB> {
    db: Arc<DB>,
    accounts: RwLock<HashMap<Address, Account>>,
}

impl<DB> AccountStore<DB>
where
    DB: Store,
{
    /// Constructor, warms the cache from the persisted index.
    pub fn new(db: Arc<DB>) -> Result<Self, Error> {
        let mut accounts = HashMap::new();
        if let Some(bz) = db.read(ACCOUNTS_INDEX_KEY)? {
            let index: Vec<String> =
                encoding::from_slice(&bz).map_err(|e| Error::Encoding(e.to_string()))?;
            for addr in index {
                let key = format!("accounts/{}", addr);
                let bz = db
                    .read(&key)?
                    .ok_or_else(|| Error::UndefinedKey(key.clone()))?;
                let account = Account::unmarshal_cbor(&bz)?;
                accounts.insert(account.address.clone(), account);
            }
        }
        Ok(Self {
            db,
            accounts: RwLock::new(accounts),
        })
    }

    /// Returns whether any accounts exist yet. Genesis seeding keys off this.
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Returns all known account addresses, ordered by their string form.
    pub fn list_addresses(&self) -> Vec<Address> {
        let mut addrs: Vec<Address> = self.accounts.read().keys().cloned().collect();
        addrs.sort_by_key(|a| a.to_string());
        addrs
    }

    /// Returns a snapshot of the account, creating a zero-balance record for
    /// unknown addresses.
    pub fn get_account(&self, addr: &Address) -> Result<Account, Error> {
        if let Some(account) = self.accounts.read().get(addr) {
            return Ok(account.clone());
        }
        let mut accounts = self.accounts.write();
        self.ensure(&mut accounts, addr)?;
        Ok(accounts[addr].clone())
    }

    /// Installs an account record, replacing any existing one. Used for
    /// genesis seeding.
    pub fn set_account(&self, account: Account) -> Result<(), Error> {
        let mut accounts = self.accounts.write();
        self.persist(&account)?;
        let created = accounts
            .insert(account.address.clone(), account)
            .is_none();
        if created {
            self.flush_index(&accounts)?;
        }
        Ok(())
    }

    /// Moves `amount` between two accounts. Returns `false` without touching
    /// either balance when the sender cannot cover it.
    pub fn transfer_funds(
        &self,
        from: &Address,
        to: &Address,
        amount: &TokenAmount,
    ) -> Result<bool, Error> {
        let mut accounts = self.accounts.write();
        self.ensure(&mut accounts, from)?;

        if accounts[from].balance < *amount {
            return Ok(false);
        }
        self.ensure(&mut accounts, to)?;

        {
            let sender = accounts.get_mut(from).expect("sender ensured above");
            sender.balance -= amount;
            let sender = sender.clone();
            self.persist(&sender)?;
        }
        {
            let recipient = accounts.get_mut(to).expect("recipient ensured above");
            recipient.balance += amount;
            let recipient = recipient.clone();
            self.persist(&recipient)?;
        }
        Ok(true)
    }

    /// Advances the account's next nonce after a message applied.
    pub fn increment_nonce(&self, addr: &Address) -> Result<(), Error> {
        let mut accounts = self.accounts.write();
        self.ensure(&mut accounts, addr)?;
        let account = accounts.get_mut(addr).expect("account ensured above");
        account.nonce += 1;
        let account = account.clone();
        self.persist(&account)
    }

    fn ensure(&self, accounts: &mut HashMap<Address, Account>, addr: &Address) -> Result<(), Error> {
        if accounts.contains_key(addr) {
            return Ok(());
        }
        let account = Account::new(addr.clone(), TokenAmount::default());
        self.persist(&account)?;
        accounts.insert(addr.clone(), account);
        self.flush_index(accounts)
    }

    fn persist(&self, account: &Account) -> Result<(), Error> {
        self.db
            .write(account_key(&account.address), account.marshal_cbor()?)?;
        Ok(())
    }

    fn flush_index(&self, accounts: &HashMap<Address, Account>) -> Result<(), Error> {
        let index: Vec<String> = accounts.keys().map(|a| a.to_string()).collect();
        let bz = encoding::to_vec(&index).map_err(|e| Error::Encoding(e.to_string()))?;
        self.db.write(ACCOUNTS_INDEX_KEY, bz)?;
        Ok(())
    }
}
