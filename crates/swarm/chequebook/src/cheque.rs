//! Cheque types for chequebook settlement.
//!
//! A cheque is a signed commitment to pay a certain cumulative amount from a
//! chequebook contract to a beneficiary. Cheques are exchanged off-chain and
//! can be cashed on-chain at any time.
//!
//! # Signing
//!
//! The chequebook contract recomputes the digest from the packed cheque
//! fields and recovers the issuer with the wallet `personal_sign` prefix:
//!
//! ```text
//! encoded = chequebook (20) || beneficiary (20) || cumulativePayout (32, big-endian)
//! digest  = keccak256(encoded)
//! hash    = keccak256("\x19Ethereum Signed Message:\n" || "32" || digest)
//! ```
//!
//! A wallet asked to sign `digest` as `text/plain` data produces a signature
//! over `hash`, which is what the contract verifies.

use alloy_primitives::{Address, B256, Bytes, Keccak256, Signature, U256, keccak256};
use serde::{Deserialize, Serialize};

use crate::{ChequeError, cashout, pipeline::CashOutStage};

/// Length of the packed cheque encoding.
pub const ENCODED_CHEQUE_LEN: usize = 20 + 20 + 32;

/// Length of an ECDSA signature (r[32] + s[32] + v[1]).
pub const SIGNATURE_LEN: usize = 65;

/// Prefix prepended by wallets when signing arbitrary data.
pub const SIGNED_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// An unsigned cheque.
///
/// Immutable once created: a new cumulative payout requires a new cheque.
/// The model does not enforce monotonic payouts; the chequebook contract
/// rejects cheques that do not exceed what was already paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cheque {
    /// Chequebook contract instance, binds the cheque to one contract.
    chequebook: Address,
    /// Address entitled to cash the cheque.
    beneficiary: Address,
    /// Total amount owed to the beneficiary to date.
    cumulative_payout: u64,
}

impl Cheque {
    /// Create a new cheque.
    pub const fn new(chequebook: Address, beneficiary: Address, cumulative_payout: u64) -> Self {
        Self {
            chequebook,
            beneficiary,
            cumulative_payout,
        }
    }

    /// Create a cheque from a 256-bit payout, failing if it does not fit in 64 bits.
    pub fn try_from_u256(
        chequebook: Address,
        beneficiary: Address,
        cumulative_payout: U256,
    ) -> Result<Self, ChequeError> {
        let payout = u64::try_from(cumulative_payout).map_err(|_| {
            ChequeError::Encoding(format!(
                "cumulative payout {cumulative_payout} exceeds 64 bits"
            ))
        })?;
        Ok(Self::new(chequebook, beneficiary, payout))
    }

    /// The chequebook contract address.
    pub const fn chequebook(&self) -> Address {
        self.chequebook
    }

    /// The beneficiary address.
    pub const fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    /// Get the cumulative payout amount.
    pub const fn cumulative_payout(&self) -> u64 {
        self.cumulative_payout
    }

    /// Packed encoding of the cheque fields as recomputed by the contract.
    pub fn encode_for_signature(&self) -> [u8; ENCODED_CHEQUE_LEN] {
        let mut out = [0u8; ENCODED_CHEQUE_LEN];
        let (chequebook, rest) = out.split_at_mut(20);
        let (beneficiary, payout) = rest.split_at_mut(20);

        chequebook.copy_from_slice(self.chequebook.as_slice());
        beneficiary.copy_from_slice(self.beneficiary.as_slice());
        payout.copy_from_slice(&U256::from(self.cumulative_payout).to_be_bytes::<32>());

        out
    }

    /// Keccak-256 of the packed encoding.
    ///
    /// This is the opaque data handed to a wallet for `text/plain` signing.
    pub fn digest(&self) -> B256 {
        keccak256(self.encode_for_signature())
    }

    /// Hash the issuer's signature must be made over.
    pub fn signature_hash(&self) -> B256 {
        let digest = self.digest();

        let mut hasher = Keccak256::new();
        hasher.update(SIGNED_MESSAGE_PREFIX);
        hasher.update(digest.len().to_string());
        hasher.update(digest);
        hasher.finalize()
    }
}

/// A signed cheque ready for transmission or cashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCheque {
    /// The unsigned cheque data.
    #[serde(flatten)]
    cheque: Cheque,
    /// Issuer signature over [`Cheque::signature_hash`].
    signature: Bytes,
}

impl SignedCheque {
    /// Create a new signed cheque from raw signature bytes.
    ///
    /// The signature is not checked here; see [`SignedCheque::verify`].
    pub fn new(cheque: Cheque, signature: Bytes) -> Self {
        Self { cheque, signature }
    }

    /// Create a signed cheque from a cheque and signature.
    pub fn from_signature(cheque: Cheque, sig: Signature) -> Self {
        Self {
            cheque,
            signature: Bytes::copy_from_slice(&sig.as_bytes()),
        }
    }

    /// The unsigned cheque.
    pub const fn cheque(&self) -> &Cheque {
        &self.cheque
    }

    /// Raw signature bytes.
    pub const fn signature(&self) -> &Bytes {
        &self.signature
    }

    /// Parse the signature bytes.
    pub fn parse_signature(&self) -> Result<Signature, ChequeError> {
        if self.signature.len() != SIGNATURE_LEN {
            return Err(ChequeError::SignatureRejected {
                stage: CashOutStage::Signed,
                reason: format!(
                    "invalid signature length: expected {SIGNATURE_LEN}, got {}",
                    self.signature.len()
                ),
            });
        }

        Signature::try_from(self.signature.as_ref()).map_err(|e| ChequeError::SignatureRejected {
            stage: CashOutStage::Signed,
            reason: format!("invalid signature: {e}"),
        })
    }

    /// Recover the issuer address from the signature.
    pub fn recover_signer(&self) -> Result<Address, ChequeError> {
        let sig = self.parse_signature()?;
        let hash = self.cheque.signature_hash();

        sig.recover_address_from_prehash(&hash)
            .map_err(|e| ChequeError::SignatureRejected {
                stage: CashOutStage::Signed,
                reason: format!("recovery failed: {e}"),
            })
    }

    /// Verify that this cheque was signed by the expected issuer.
    pub fn verify(&self, issuer: Address) -> Result<(), ChequeError> {
        let signer = self.recover_signer()?;
        if signer != issuer {
            return Err(ChequeError::InvalidSigner {
                expected: issuer,
                actual: signer,
            });
        }
        Ok(())
    }

    /// Call data cashing this cheque to `recipient`.
    pub fn cash_out_call_data(&self, recipient: Address) -> Bytes {
        cashout::build_cash_out_call_data(
            recipient,
            self.cheque.cumulative_payout,
            self.signature.clone(),
        )
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Bytes, ChequeError> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|e| ChequeError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self, ChequeError> {
        serde_json::from_slice(data).map_err(|e| ChequeError::Serialization(e.to_string()))
    }
}
