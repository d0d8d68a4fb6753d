//! Cheque cash-out pipeline.
//!
//! A single cash-out moves strictly forward through:
//!
//! ```text
//! Issued -> HashComputed -> Signed -> CallDataBuilt -> TransactionBuilt -> Submitted -> Mined
//! ```
//!
//! Nothing is retried here. A failure at any step is returned with the stage
//! it happened in; a reverted receipt is reported as
//! [`ChequeError::CashOutReverted`].

use alloy_primitives::Address;
use tracing::{debug, info, warn};

use crate::{
    Cheque, ChequeError, SignedCheque,
    cashout::build_transaction_skeleton,
    config::CashOutConfig,
    ledger::{LedgerClient, Receipt, TxRef},
    signer::{ChequeSigner, MIMETYPE_TEXT_PLAIN, SignedTransaction},
};

/// Stages of a cheque cash-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CashOutStage {
    /// Cheque created in memory.
    Issued,
    /// Signature hash computed.
    HashComputed,
    /// Issuer signature obtained.
    Signed,
    /// Contract call data encoded.
    CallDataBuilt,
    /// Unsigned transaction assembled from ledger nonce and fee price.
    TransactionBuilt,
    /// Transaction handed to the ledger.
    Submitted,
    /// Transaction included.
    Mined,
}

/// Have `issuer` sign `cheque` through `signer`.
///
/// The signer receives the cheque digest as `text/plain` data and applies
/// the personal message prefix itself. The returned signature is checked
/// to recover to `issuer`.
pub async fn sign_cheque<S: ChequeSigner>(
    signer: &S,
    issuer: Address,
    cheque: Cheque,
) -> Result<SignedCheque, ChequeError> {
    let digest = cheque.digest();
    debug!(
        stage = %CashOutStage::HashComputed,
        chequebook = %cheque.chequebook(),
        beneficiary = %cheque.beneficiary(),
        cumulative_payout = cheque.cumulative_payout(),
        %digest,
        "Cheque hashed"
    );

    let signature = signer
        .sign_data(issuer, MIMETYPE_TEXT_PLAIN, digest.as_slice())
        .await
        .map_err(|e| ChequeError::SignatureRejected {
            stage: CashOutStage::Signed,
            reason: e.to_string(),
        })?;

    let signed = SignedCheque::from_signature(cheque, signature);
    signed.verify(issuer)?;

    debug!(stage = %CashOutStage::Signed, %issuer, "Cheque signed");
    Ok(signed)
}

/// Drives cheques through signing and cashing with injected capabilities.
pub struct CashOut<S, L> {
    signer: S,
    ledger: L,
    config: CashOutConfig,
}

impl<S: ChequeSigner, L: LedgerClient> CashOut<S, L> {
    /// Create a pipeline over a signer and ledger client.
    pub fn new(signer: S, ledger: L, config: CashOutConfig) -> Self {
        Self {
            signer,
            ledger,
            config,
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &CashOutConfig {
        &self.config
    }

    /// Have `issuer` sign `cheque`. See [`sign_cheque`].
    pub async fn sign_cheque(
        &self,
        issuer: Address,
        cheque: Cheque,
    ) -> Result<SignedCheque, ChequeError> {
        sign_cheque(&self.signer, issuer, cheque).await
    }

    /// Build and sign the cash-out transaction for `signed`.
    ///
    /// The transaction is sent from the cheque's beneficiary. Nonce and fee
    /// price are queried from the ledger immediately before assembly.
    pub async fn prepare(&self, signed: &SignedCheque) -> Result<SignedTransaction, ChequeError> {
        let cheque = signed.cheque();
        signed.parse_signature()?;

        let recipient = self.config.recipient_for(cheque);
        let call_data = signed.cash_out_call_data(recipient);
        debug!(
            stage = %CashOutStage::CallDataBuilt,
            chequebook = %cheque.chequebook(),
            %recipient,
            len = call_data.len(),
            "Cash-out call data built"
        );

        let sender = cheque.beneficiary();
        let nonce = self
            .ledger
            .pending_nonce(sender)
            .await
            .map_err(|source| ChequeError::UpstreamQuery {
                stage: CashOutStage::TransactionBuilt,
                source,
            })?;
        let fee_price = self
            .ledger
            .suggested_fee_price()
            .await
            .map_err(|source| ChequeError::UpstreamQuery {
                stage: CashOutStage::TransactionBuilt,
                source,
            })?;

        let skeleton = build_transaction_skeleton(call_data, cheque.chequebook(), nonce, fee_price)
            .with_gas_limit(self.config.gas_limit);
        debug!(
            stage = %CashOutStage::TransactionBuilt,
            %sender,
            nonce,
            fee_price = %fee_price,
            gas_limit = skeleton.gas_limit,
            "Cash-out transaction built"
        );

        self.signer
            .sign_transaction(sender, skeleton, self.config.chain_id)
            .await
            .map_err(|e| ChequeError::SignatureRejected {
                stage: CashOutStage::TransactionBuilt,
                reason: e.to_string(),
            })
    }

    /// Broadcast a signed cash-out transaction.
    pub async fn submit(&self, tx: SignedTransaction) -> Result<TxRef, ChequeError> {
        let tx_ref = self
            .ledger
            .send_transaction(tx)
            .await
            .map_err(|source| ChequeError::UpstreamQuery {
                stage: CashOutStage::Submitted,
                source,
            })?;

        info!(stage = %CashOutStage::Submitted, tx = %tx_ref, "Cash-out transaction submitted");
        Ok(tx_ref)
    }

    /// Wait for `tx_ref` to be mined, failing if it reverted.
    pub async fn await_outcome(
        &self,
        cheque: &Cheque,
        tx_ref: TxRef,
    ) -> Result<Receipt, ChequeError> {
        let receipt =
            self.ledger
                .wait_mined(tx_ref)
                .await
                .map_err(|source| ChequeError::UpstreamQuery {
                    stage: CashOutStage::Mined,
                    source,
                })?;

        if !receipt.succeeded() {
            warn!(
                chequebook = %cheque.chequebook(),
                cumulative_payout = cheque.cumulative_payout(),
                tx = %receipt.tx_hash,
                "Cash-out reverted"
            );
            return Err(ChequeError::CashOutReverted {
                chequebook: cheque.chequebook(),
                cumulative_payout: cheque.cumulative_payout(),
                receipt: Box::new(receipt),
            });
        }

        info!(
            stage = %CashOutStage::Mined,
            chequebook = %cheque.chequebook(),
            cumulative_payout = cheque.cumulative_payout(),
            tx = %receipt.tx_hash,
            "Cheque cashed"
        );
        Ok(receipt)
    }

    /// Cash a signed cheque and wait for the outcome.
    pub async fn cash(&self, signed: &SignedCheque) -> Result<Receipt, ChequeError> {
        let tx = self.prepare(signed).await?;
        let tx_ref = self.submit(tx).await?;
        self.await_outcome(signed.cheque(), tx_ref).await
    }

    /// Sign `cheque` as `issuer` and cash it immediately.
    pub async fn issue_and_cash(
        &self,
        issuer: Address,
        cheque: Cheque,
    ) -> Result<(SignedCheque, Receipt), ChequeError> {
        let signed = self.sign_cheque(issuer, cheque).await?;
        let receipt = self.cash(&signed).await?;
        Ok((signed, receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        assert_eq!(CashOutStage::Issued.to_string(), "issued");
        assert_eq!(CashOutStage::HashComputed.to_string(), "hash_computed");
        assert_eq!(CashOutStage::TransactionBuilt.to_string(), "transaction_built");
    }
}
