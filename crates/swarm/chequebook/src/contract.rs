//! Solidity bindings for the chequebook contract and its factory.

use alloy_sol_types::sol;

sol! {
    /// Chequebook contract, the subset needed for cashing cheques.
    interface ERC20SimpleSwap {
        /// Cash a cheque as its beneficiary, paying out to `recipient`.
        function cashChequeBeneficiary(address recipient, uint256 cumulativePayout, bytes issuerSig) external;
    }

    /// Factory deploying chequebook instances.
    interface SimpleSwapFactory {
        /// Emitted once per chequebook deployment.
        event SimpleSwapDeployed(address contractAddress);
    }
}

pub use ERC20SimpleSwap::cashChequeBeneficiaryCall;
pub use SimpleSwapFactory::SimpleSwapDeployed;
