//! Ledger client capability.
//!
//! The chequebook crate never talks to a chain directly. Callers supply a
//! [`LedgerClient`] that answers nonce and fee queries and submits signed
//! transactions. Submission and inclusion are two separate calls so an
//! implementation can block, poll, or drive futures as it sees fit.

use alloy_primitives::{Address, B256, Log};
use async_trait::async_trait;

use crate::signer::SignedTransaction;

/// Opaque error returned by a ledger client, surfaced to callers verbatim.
pub type LedgerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reference to a submitted transaction.
pub type TxRef = B256;

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the mined transaction.
    pub tx_hash: TxRef,
    /// `true` if execution succeeded, `false` if it reverted.
    pub status: bool,
    /// Logs emitted during execution.
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Whether the transaction executed successfully.
    pub fn succeeded(&self) -> bool {
        self.status
    }
}

/// Access to the ledger the chequebook contract lives on.
///
/// Implementations own retry policy; errors are passed through unchanged.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Next nonce for `address`, including pending transactions.
    async fn pending_nonce(&self, address: Address) -> Result<u64, LedgerError>;

    /// Currently suggested fee price.
    async fn suggested_fee_price(&self) -> Result<u128, LedgerError>;

    /// Broadcast a signed transaction.
    async fn send_transaction(&self, tx: SignedTransaction) -> Result<TxRef, LedgerError>;

    /// Wait until `tx` is included and return its receipt.
    async fn wait_mined(&self, tx: TxRef) -> Result<Receipt, LedgerError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for &T {
    async fn pending_nonce(&self, address: Address) -> Result<u64, LedgerError> {
        (**self).pending_nonce(address).await
    }

    async fn suggested_fee_price(&self) -> Result<u128, LedgerError> {
        (**self).suggested_fee_price().await
    }

    async fn send_transaction(&self, tx: SignedTransaction) -> Result<TxRef, LedgerError> {
        (**self).send_transaction(tx).await
    }

    async fn wait_mined(&self, tx: TxRef) -> Result<Receipt, LedgerError> {
        (**self).wait_mined(tx).await
    }
}
