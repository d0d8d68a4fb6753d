//! Chequebook errors.

use alloy_primitives::Address;

use crate::{Receipt, ledger::LedgerError, pipeline::CashOutStage};

/// Errors that can occur while encoding, signing or cashing a cheque.
#[derive(Debug, thiserror::Error)]
pub enum ChequeError {
    /// A value does not fit its fixed-width slot or could not be decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The signer refused, or the produced signature is malformed.
    #[error("signature rejected during {stage}: {reason}")]
    SignatureRejected { stage: CashOutStage, reason: String },

    /// Cheque was signed by an unexpected address.
    #[error("invalid signer: expected {expected}, got {actual}")]
    InvalidSigner { expected: Address, actual: Address },

    /// A ledger query or submission failed.
    #[error("ledger query failed during {stage}: {source}")]
    UpstreamQuery {
        stage: CashOutStage,
        #[source]
        source: LedgerError,
    },

    /// The cash-out transaction was mined but reverted.
    #[error(
        "cash-out of {cumulative_payout} from chequebook {chequebook} reverted in tx {}",
        receipt.tx_hash
    )]
    CashOutReverted {
        chequebook: Address,
        cumulative_payout: u64,
        receipt: Box<Receipt>,
    },

    /// No chequebook deployment event was found in the receipt.
    #[error("no chequebook deployment found for factory {factory}")]
    DeploymentNotFound { factory: Address },

    /// More than one distinct chequebook deployment matched.
    #[error("ambiguous chequebook deployment for factory {factory}: {candidates:?}")]
    AmbiguousDeployment {
        factory: Address,
        candidates: Vec<Address>,
    },

    /// Cheque serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ChequeError {
    /// Pipeline stage the error belongs to, when known.
    pub fn stage(&self) -> Option<CashOutStage> {
        match self {
            Self::SignatureRejected { stage, .. } | Self::UpstreamQuery { stage, .. } => {
                Some(*stage)
            }
            Self::InvalidSigner { .. } => Some(CashOutStage::Signed),
            Self::CashOutReverted { .. } => Some(CashOutStage::Mined),
            _ => None,
        }
    }
}
