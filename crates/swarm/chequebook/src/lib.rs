//! Chequebook cheques and their on-chain cash-out.
//!
//! This crate provides the pieces needed to pay through a chequebook
//! contract with off-chain cheques:
//!
//! - [`Cheque`] - An unsigned cumulative-payout commitment
//! - [`SignedCheque`] - A cheque with the issuer's signature
//! - [`cashout`] - Call data and transaction building for `cashChequeBeneficiary`
//! - [`CashOut`] - The sign, build, submit, await pipeline
//!
//! # Signing
//!
//! The issuer signs the packed cheque with the wallet `personal_sign` prefix:
//!
//! ```text
//! keccak256("\x19Ethereum Signed Message:\n32" || keccak256(chequebook || beneficiary || uint256(cumulativePayout)))
//! ```
//!
//! # Cashing a Cheque
//!
//! ```ignore
//! let pipeline = CashOut::new(signer, ledger, CashOutConfig::default());
//!
//! let cheque = Cheque::new(chequebook, beneficiary, 100);
//! let signed = pipeline.sign_cheque(issuer, cheque).await?;
//! let receipt = pipeline.cash(&signed).await?;
//! ```
//!
//! Signing and ledger access are injected through [`ChequeSigner`] and
//! [`LedgerClient`]; the crate itself performs no I/O.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod cashout;
pub mod cheque;
pub mod config;
pub mod contract;
pub mod deployment;
mod error;
pub mod ledger;
pub mod pipeline;
pub mod signer;

pub use cashout::{
    CashOutRequest, TransactionSkeleton, build_cash_out_call_data, build_transaction_skeleton,
    decode_cash_out_call_data,
};
pub use cheque::{Cheque, SignedCheque};
pub use config::{CashOutConfig, ConfigError};
pub use deployment::find_deployed_chequebook;
pub use error::ChequeError;
pub use ledger::{LedgerClient, LedgerError, Receipt, TxRef};
pub use pipeline::{CashOut, CashOutStage, sign_cheque};
pub use signer::{ChequeSigner, LocalChequeSigner, SignedTransaction, SignerError};

// Re-export commonly used types
pub use alloy_primitives::{Address, B256, Bytes};
