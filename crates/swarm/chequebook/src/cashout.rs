//! Cash-out request building.
//!
//! Turns a signed cheque into call data for the chequebook's
//! `cashChequeBeneficiary(address,uint256,bytes)` entry point and wraps it in
//! an unsigned transaction. Nonce and fee price come from the ledger client
//! and should be queried right before submission.

use alloy_consensus::TxLegacy;
use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::{ChequeError, contract::cashChequeBeneficiaryCall};

/// Gas ceiling for a cash-out call under normal contract logic.
pub const DEFAULT_CASH_OUT_GAS_LIMIT: u64 = 1_000_000;

/// Decoded arguments of a cash-out call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashOutRequest {
    /// Address receiving the paid out tokens.
    pub recipient: Address,
    /// Cumulative payout of the cheque being cashed.
    pub cumulative_payout: u64,
    /// Issuer signature over the cheque.
    pub issuer_signature: Bytes,
}

impl CashOutRequest {
    /// ABI-encoded call data for this request.
    pub fn call_data(&self) -> Bytes {
        build_cash_out_call_data(
            self.recipient,
            self.cumulative_payout,
            self.issuer_signature.clone(),
        )
    }
}

/// Encode a `cashChequeBeneficiary` call.
///
/// A dynamic `bytes` length always fits the 256-bit length word, so encoding
/// cannot fail.
pub fn build_cash_out_call_data(
    recipient: Address,
    cumulative_payout: u64,
    issuer_signature: Bytes,
) -> Bytes {
    cashChequeBeneficiaryCall {
        recipient,
        cumulativePayout: U256::from(cumulative_payout),
        issuerSig: issuer_signature,
    }
    .abi_encode()
    .into()
}

/// Decode `cashChequeBeneficiary` call data.
pub fn decode_cash_out_call_data(data: &[u8]) -> Result<CashOutRequest, ChequeError> {
    let call = cashChequeBeneficiaryCall::abi_decode(data)
        .map_err(|e| ChequeError::Encoding(format!("invalid cash-out call data: {e}")))?;

    let cumulative_payout = u64::try_from(call.cumulativePayout).map_err(|_| {
        ChequeError::Encoding(format!(
            "cumulative payout {} exceeds 64 bits",
            call.cumulativePayout
        ))
    })?;

    Ok(CashOutRequest {
        recipient: call.recipient,
        cumulative_payout,
        issuer_signature: call.issuerSig,
    })
}

/// Unsigned cash-out transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSkeleton {
    /// Sender's next pending nonce.
    pub nonce: u64,
    /// Chequebook contract being called.
    pub to: Address,
    /// Always zero, cashing transfers no native value.
    pub value: U256,
    /// Gas ceiling.
    pub gas_limit: u64,
    /// Fee price suggested by the ledger.
    pub gas_price: u128,
    /// Call data.
    pub input: Bytes,
}

impl TransactionSkeleton {
    /// Override the gas ceiling.
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Legacy transaction for `chain_id`, or pre-EIP-155 when `None`.
    pub fn into_legacy(self, chain_id: Option<u64>) -> TxLegacy {
        TxLegacy {
            chain_id,
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: self.input,
        }
    }
}

/// Assemble an unsigned cash-out transaction.
pub fn build_transaction_skeleton(
    call_data: Bytes,
    chequebook: Address,
    sender_next_nonce: u64,
    suggested_fee_price: u128,
) -> TransactionSkeleton {
    TransactionSkeleton {
        nonce: sender_next_nonce,
        to: chequebook,
        value: U256::ZERO,
        gas_limit: DEFAULT_CASH_OUT_GAS_LIMIT,
        gas_price: suggested_fee_price,
        input: call_data,
    }
}
