// Copyright 2019-2023 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::check::{check_message, check_unsigned};
use super::errors::Error;
use address::Address;
use chain::AccountStore;
use cid::Cid;
use crypto::Signer;
use db::Store;
use encoding::Cbor;
use message::{Message, SignedMessage, UnsignedMessage};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use vm::TokenAmount;

/// The in-memory queue of validated signed messages awaiting inclusion. The
/// queue mutex is the pool lock of the engine: it is held across validation,
/// nonce projection and the balance check, so concurrent submitters
/// serialise and each sees the projections of everyone admitted before it.
pub struct MessagePool<DB> {
    pending: Arc<Mutex<Vec<SignedMessage>>>,
    accounts: Arc<AccountStore<DB>>,
}

impl<DB> MessagePool<DB>
where
    DB: Store,
{
    /// Creates a pool projecting against the given account ledger.
    pub fn new(accounts: Arc<AccountStore<DB>>) -> Self {
        Self {
            pending: Arc::new(Mutex::new(Vec::new())),
            accounts,
        }
    }

    /// Signs and enqueues an unsigned message: validate, project the nonce,
    /// sign the amended message, then admit it against the sender's balance.
    pub async fn push<S: Signer>(
        &self,
        msg: UnsignedMessage,
        signer: &S,
    ) -> Result<SignedMessage, Error> {
        let mut pending = self.pending.lock().await;

        check_unsigned(&msg)?;
        let sequence = self.project_nonce(&pending, msg.from())?;
        let mut msg = msg;
        msg.set_sequence(sequence);

        let smsg = SignedMessage::new(msg, signer).map_err(|e| Error::Other(e.to_string()))?;
        self.check_balance(&pending, &smsg)?;

        pending.push(smsg.clone());
        Ok(smsg)
    }

    /// Enqueues an externally signed message: validate against the submitted
    /// encoding, then amend the nonce to the pool projection and admit. The
    /// amended copy keeps the submitted signature.
    pub async fn push_signed(&self, smsg: SignedMessage) -> Result<Cid, Error> {
        let mut pending = self.pending.lock().await;

        check_message(&smsg)?;
        let sequence = self.project_nonce(&pending, smsg.from())?;
        let mut smsg = smsg;
        smsg.set_sequence(sequence);
        self.check_balance(&pending, &smsg)?;

        let cid = smsg.cid()?;
        pending.push(smsg);
        Ok(cid)
    }

    /// Snapshots and empties the queue. The miner calls this under the
    /// mining lock; the pool lock itself is only held for the swap.
    pub async fn drain(&self) -> Vec<SignedMessage> {
        let mut pending = self.pending.lock().await;
        std::mem::take(&mut *pending)
    }

    /// Number of messages awaiting inclusion.
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Snapshot of the queue, in submission order.
    pub async fn pending(&self) -> Vec<SignedMessage> {
        self.pending.lock().await.clone()
    }

    /// Takes the pool lock and never gives it back. Part of the engine's
    /// irrevocable shutdown: any submission after this parks forever.
    pub async fn lock_forever(&self) {
        let guard = self.pending.clone().lock_owned().await;
        std::mem::forget(guard);
    }

    /// Next nonce for a sender: its committed next nonce, or one past the
    /// highest nonce it has sitting in the pool, whichever is larger.
    fn project_nonce(
        &self,
        pending: &MutexGuard<'_, Vec<SignedMessage>>,
        from: &Address,
    ) -> Result<u64, Error> {
        let account = self.accounts.get_account(from)?;
        let pending_max = pending
            .iter()
            .filter(|m| m.from() == from)
            .map(|m| m.sequence())
            .max();
        Ok(match pending_max {
            Some(n) => account.nonce.max(n + 1),
            None => account.nonce,
        })
    }

    /// Admission control: the sender's balance must cover the newcomer plus
    /// everything it already has pending.
    fn check_balance(
        &self,
        pending: &MutexGuard<'_, Vec<SignedMessage>>,
        new: &SignedMessage,
    ) -> Result<(), Error> {
        let account = self.accounts.get_account(new.from())?;
        let mut required: TokenAmount = new.required_funds();
        for msg in pending.iter().filter(|m| m.from() == new.from()) {
            required += msg.required_funds();
        }
        if account.balance < required {
            return Err(Error::NotEnoughFunds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::Account;
    use crypto::SignatureType;
    use db::MemoryDB;
    use key_management::{KeyStore, KeyStoreConfig, Wallet};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixture {
        pool: MessagePool<MemoryDB>,
        accounts: Arc<AccountStore<MemoryDB>>,
        wallet: Wallet<MemoryDB>,
        sender: Address,
    }

    fn fixture(balance: u64) -> Fixture {
        let db = Arc::new(MemoryDB::default());
        let accounts = Arc::new(AccountStore::new(db).unwrap());
        let mut wallet =
            Wallet::new(KeyStore::new(KeyStoreConfig::Memory).unwrap()).unwrap();
        let rng = &mut ChaCha8Rng::seed_from_u64(5);
        let sender = wallet
            .generate_addr_with_rng(SignatureType::BLS, rng)
            .unwrap();
        accounts
            .set_account(Account::new(sender.clone(), TokenAmount::from(balance)))
            .unwrap();
        Fixture {
            pool: MessagePool::new(accounts.clone()),
            accounts,
            wallet,
            sender,
        }
    }

    fn transfer(fix: &Fixture, value: u64) -> UnsignedMessage {
        UnsignedMessage::builder()
            .from(fix.sender.clone())
            .to(Address::new_bls(&[3u8; address::BLS_PUB_LEN]).unwrap())
            .value(TokenAmount::from(value))
            .gas_fee_cap(TokenAmount::from(1u8))
            .gas_limit(1)
            .build()
            .unwrap()
    }

    #[async_std::test]
    async fn queued_messages_get_contiguous_nonces() {
        let fix = fixture(100);
        for expected in 0..3u64 {
            let smsg = fix.pool.push(transfer(&fix, 1), &fix.wallet).await.unwrap();
            assert_eq!(smsg.sequence(), expected);
        }
        assert_eq!(fix.pool.len().await, 3);
        // the committed nonce is untouched until mining
        assert_eq!(fix.accounts.get_account(&fix.sender).unwrap().nonce, 0);
    }

    #[async_std::test]
    async fn non_transfer_method_rejected() {
        let fix = fixture(100);
        let mut msg = transfer(&fix, 1);
        msg.method_num = 2;
        let err = fix.pool.push(msg, &fix.wallet).await.unwrap_err();
        assert_eq!(err, Error::UnsupportedMethod(2));
        assert_eq!(fix.pool.len().await, 0);
    }

    #[async_std::test]
    async fn submitted_nonce_rejected() {
        let fix = fixture(100);
        let mut msg = transfer(&fix, 1);
        msg.set_sequence(7);
        assert_eq!(
            fix.pool.push(msg, &fix.wallet).await.unwrap_err(),
            Error::InvalidNonce(7)
        );
    }

    #[async_std::test]
    async fn id_protocol_party_rejected() {
        let fix = fixture(100);
        let mut msg = transfer(&fix, 1);
        msg.to = Address::new_id(99);
        assert!(matches!(
            fix.pool.push(msg, &fix.wallet).await.unwrap_err(),
            Error::InvalidProtocol(_)
        ));
    }

    #[async_std::test]
    async fn premium_above_cap_rejected() {
        let fix = fixture(100);
        let mut msg = transfer(&fix, 1);
        msg.gas_premium = TokenAmount::from(2u8);
        assert_eq!(
            fix.pool.push(msg, &fix.wallet).await.unwrap_err(),
            Error::GasFeeCapTooLow
        );
    }

    #[async_std::test]
    async fn insufficient_funds_rejected_at_submission() {
        let fix = fixture(5);
        let err = fix.pool.push(transfer(&fix, 10), &fix.wallet).await.unwrap_err();
        assert_eq!(err, Error::NotEnoughFunds);
        assert_eq!(fix.pool.len().await, 0);
    }

    #[async_std::test]
    async fn projection_covers_whole_pending_set() {
        // balance covers two messages of required 51 each, not three
        let fix = fixture(102);
        fix.pool.push(transfer(&fix, 50), &fix.wallet).await.unwrap();
        fix.pool.push(transfer(&fix, 50), &fix.wallet).await.unwrap();
        assert_eq!(
            fix.pool.push(transfer(&fix, 50), &fix.wallet).await.unwrap_err(),
            Error::NotEnoughFunds
        );
        assert_eq!(fix.pool.len().await, 2);
    }

    #[async_std::test]
    async fn tampered_signature_rejected() {
        let fix = fixture(100);
        let smsg = SignedMessage::new(transfer(&fix, 1), &fix.wallet).unwrap();
        let mut inner = smsg.message().clone();
        inner.value = TokenAmount::from(99u8);
        let forged = SignedMessage::new_from_parts(inner, smsg.signature().clone());
        assert!(matches!(
            fix.pool.push_signed(forged).await.unwrap_err(),
            Error::InvalidSignature(_)
        ));
    }

    #[async_std::test]
    async fn push_signed_amends_nonce_after_verification() {
        let fix = fixture(100);
        fix.pool.push(transfer(&fix, 1), &fix.wallet).await.unwrap();

        let smsg = SignedMessage::new(transfer(&fix, 1), &fix.wallet).unwrap();
        fix.pool.push_signed(smsg).await.unwrap();

        let pending = fix.pool.pending().await;
        assert_eq!(pending[1].sequence(), 1);
    }

    #[async_std::test]
    async fn drain_empties_the_queue_in_order() {
        let fix = fixture(100);
        fix.pool.push(transfer(&fix, 1), &fix.wallet).await.unwrap();
        fix.pool.push(transfer(&fix, 2), &fix.wallet).await.unwrap();
        let batch = fix.pool.drain().await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].sequence(), 0);
        assert_eq!(batch[1].sequence(), 1);
        assert_eq!(fix.pool.len().await, 0);
    }
}
