//! Signer capability.
//!
//! Mirrors the narrow surface of an external wallet: list identities, sign
//! opaque data under a MIME type, sign a transaction. It is passed
//! explicitly to whatever needs to sign so tests can substitute their own.

use alloy_consensus::{SignableTransaction, Signed, TxLegacy};
use alloy_primitives::{Address, Signature};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::cashout::TransactionSkeleton;

/// MIME type for plain data. Wallets apply the personal message prefix.
pub const MIMETYPE_TEXT_PLAIN: &str = "text/plain";

/// A transaction signed by the submitting account.
pub type SignedTransaction = Signed<TxLegacy>;

/// Errors produced by a signer.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The signer holds no key for this identity.
    #[error("not authorized to sign for {0}")]
    UnknownIdentity(Address),

    /// The signer does not support the requested MIME type.
    #[error("unsupported mime type: {0}")]
    UnsupportedMimeType(String),

    /// The signer declined the request.
    #[error("signing refused: {0}")]
    Refused(String),

    /// The underlying key failed to sign.
    #[error(transparent)]
    Signer(#[from] alloy_signer::Error),
}

/// An external signer holding one or more identities.
#[async_trait]
pub trait ChequeSigner: Send + Sync {
    /// Identities this signer can sign for.
    fn identities(&self) -> Vec<Address>;

    /// Sign opaque `data` as `identity`.
    ///
    /// For [`MIMETYPE_TEXT_PLAIN`] the signature is over
    /// `keccak256("\x19Ethereum Signed Message:\n" || len(data) || data)`.
    async fn sign_data(
        &self,
        identity: Address,
        mime_type: &str,
        data: &[u8],
    ) -> Result<Signature, SignerError>;

    /// Sign a transaction as `identity`.
    async fn sign_transaction(
        &self,
        identity: Address,
        tx: TransactionSkeleton,
        chain_id: Option<u64>,
    ) -> Result<SignedTransaction, SignerError>;
}

#[async_trait]
impl<T: ChequeSigner + ?Sized> ChequeSigner for &T {
    fn identities(&self) -> Vec<Address> {
        (**self).identities()
    }

    async fn sign_data(
        &self,
        identity: Address,
        mime_type: &str,
        data: &[u8],
    ) -> Result<Signature, SignerError> {
        (**self).sign_data(identity, mime_type, data).await
    }

    async fn sign_transaction(
        &self,
        identity: Address,
        tx: TransactionSkeleton,
        chain_id: Option<u64>,
    ) -> Result<SignedTransaction, SignerError> {
        (**self).sign_transaction(identity, tx, chain_id).await
    }
}

/// In-process signer backed by local private keys.
#[derive(Debug, Clone)]
pub struct LocalChequeSigner {
    accounts: Vec<PrivateKeySigner>,
}

impl LocalChequeSigner {
    /// Signer holding a single key.
    pub fn new(account: PrivateKeySigner) -> Self {
        Self {
            accounts: vec![account],
        }
    }

    /// Signer holding several keys.
    pub fn with_accounts(accounts: Vec<PrivateKeySigner>) -> Self {
        Self { accounts }
    }

    fn account(&self, identity: Address) -> Result<&PrivateKeySigner, SignerError> {
        self.accounts
            .iter()
            .find(|account| account.address() == identity)
            .ok_or(SignerError::UnknownIdentity(identity))
    }
}

#[async_trait]
impl ChequeSigner for LocalChequeSigner {
    fn identities(&self) -> Vec<Address> {
        self.accounts.iter().map(|account| account.address()).collect()
    }

    async fn sign_data(
        &self,
        identity: Address,
        mime_type: &str,
        data: &[u8],
    ) -> Result<Signature, SignerError> {
        let account = self.account(identity)?;
        match mime_type {
            MIMETYPE_TEXT_PLAIN => Ok(account.sign_message_sync(data)?),
            other => Err(SignerError::UnsupportedMimeType(other.to_string())),
        }
    }

    async fn sign_transaction(
        &self,
        identity: Address,
        tx: TransactionSkeleton,
        chain_id: Option<u64>,
    ) -> Result<SignedTransaction, SignerError> {
        let account = self.account(identity)?;
        let tx = tx.into_legacy(chain_id);
        let signature = account.sign_hash_sync(&tx.signature_hash())?;
        Ok(tx.into_signed(signature))
    }
}
