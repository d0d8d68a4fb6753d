//! Test utilities and mocks for chequebook settlement.
//!
//! - [`MockLedger`] - Scripted [`LedgerClient`] recording submitted transactions
//! - [`test_signer`] / [`test_key`] - Deterministic local signing keys
//! - [`RefusingSigner`] - A signer that declines every request

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;

use alloy_primitives::{Address, B256, Log, Signature};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use parking_lot::Mutex;
use vertex_swarm_chequebook::{
    ChequeSigner, LedgerClient, LedgerError, LocalChequeSigner, Receipt, SignedTransaction,
    SignerError, TransactionSkeleton, TxRef,
};

/// Deterministic private key derived from `seed`.
pub fn test_key(seed: u8) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(seed.max(1)))
        .expect("repeated non-zero byte is a valid secp256k1 key")
}

/// Local signer holding the keys for each of `seeds`.
pub fn test_signer(seeds: &[u8]) -> LocalChequeSigner {
    LocalChequeSigner::with_accounts(seeds.iter().copied().map(test_key).collect())
}

/// Ledger call a [`MockLedger`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// [`LedgerClient::pending_nonce`]
    PendingNonce,
    /// [`LedgerClient::suggested_fee_price`]
    FeePrice,
    /// [`LedgerClient::send_transaction`]
    Send,
    /// [`LedgerClient::wait_mined`]
    WaitMined,
}

/// Error returned by a [`MockLedger`] at its configured [`FailPoint`].
#[derive(Debug, thiserror::Error)]
#[error("mock ledger failure at {0:?}")]
pub struct MockLedgerError(pub FailPoint);

#[derive(Default)]
struct MockLedgerState {
    nonces: HashMap<Address, u64>,
    fee_price: u128,
    revert: bool,
    logs: Vec<Log>,
    fail: Option<FailPoint>,
    nonce_queries: Vec<Address>,
    submitted: Vec<SignedTransaction>,
}

/// In-memory ledger client with scripted answers.
///
/// Every submitted transaction is mined immediately. Receipts succeed unless
/// [`MockLedger::reverting`] was set.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockLedgerState>,
}

impl MockLedger {
    /// Ledger answering nonce 0 and fee price 1 gwei.
    pub fn new() -> Self {
        Self::default().with_fee_price(1_000_000_000)
    }

    /// Answer `nonce` for `address`.
    pub fn with_nonce(self, address: Address, nonce: u64) -> Self {
        self.state.lock().nonces.insert(address, nonce);
        self
    }

    /// Answer `fee_price` for fee queries.
    pub fn with_fee_price(self, fee_price: u128) -> Self {
        self.state.lock().fee_price = fee_price;
        self
    }

    /// Logs attached to every receipt.
    pub fn with_logs(self, logs: Vec<Log>) -> Self {
        self.state.lock().logs = logs;
        self
    }

    /// Mine every transaction with a failed status.
    pub fn reverting(self) -> Self {
        self.state.lock().revert = true;
        self
    }

    /// Fail the given call.
    pub fn failing_at(self, point: FailPoint) -> Self {
        self.state.lock().fail = Some(point);
        self
    }

    /// Transactions submitted so far.
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.state.lock().submitted.clone()
    }

    /// Addresses nonces were queried for, in order.
    pub fn nonce_queries(&self) -> Vec<Address> {
        self.state.lock().nonce_queries.clone()
    }

    fn check(&self, point: FailPoint) -> Result<(), LedgerError> {
        if self.state.lock().fail == Some(point) {
            return Err(Box::new(MockLedgerError(point)));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn pending_nonce(&self, address: Address) -> Result<u64, LedgerError> {
        self.check(FailPoint::PendingNonce)?;
        let mut state = self.state.lock();
        state.nonce_queries.push(address);
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn suggested_fee_price(&self) -> Result<u128, LedgerError> {
        self.check(FailPoint::FeePrice)?;
        Ok(self.state.lock().fee_price)
    }

    async fn send_transaction(&self, tx: SignedTransaction) -> Result<TxRef, LedgerError> {
        self.check(FailPoint::Send)?;
        let hash = *tx.hash();
        self.state.lock().submitted.push(tx);
        Ok(hash)
    }

    async fn wait_mined(&self, tx: TxRef) -> Result<Receipt, LedgerError> {
        self.check(FailPoint::WaitMined)?;
        let state = self.state.lock();
        if !state.submitted.iter().any(|submitted| *submitted.hash() == tx) {
            return Err(format!("unknown transaction {tx}").into());
        }
        Ok(Receipt {
            tx_hash: tx,
            status: !state.revert,
            logs: state.logs.clone(),
        })
    }
}

/// Signer declining every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefusingSigner;

#[async_trait]
impl ChequeSigner for RefusingSigner {
    fn identities(&self) -> Vec<Address> {
        Vec::new()
    }

    async fn sign_data(
        &self,
        _identity: Address,
        _mime_type: &str,
        _data: &[u8],
    ) -> Result<Signature, SignerError> {
        Err(SignerError::Refused("user declined".into()))
    }

    async fn sign_transaction(
        &self,
        _identity: Address,
        _tx: TransactionSkeleton,
        _chain_id: Option<u64>,
    ) -> Result<SignedTransaction, SignerError> {
        Err(SignerError::Refused("user declined".into()))
    }
}
