//! Chequebook address lookup from a factory deployment receipt.

use alloy_primitives::{Address, Log};
use alloy_sol_types::SolEvent;

use crate::{ChequeError, contract::SimpleSwapDeployed};

/// Find the chequebook deployed by `factory` among `logs`.
///
/// Only logs emitted by `factory` are considered. Repeated events for the
/// same address collapse into one; distinct addresses are ambiguous and
/// rejected rather than picking one.
pub fn find_deployed_chequebook(factory: Address, logs: &[Log]) -> Result<Address, ChequeError> {
    let mut candidates: Vec<Address> = Vec::new();

    for log in logs.iter().filter(|log| log.address == factory) {
        let Ok(event) = SimpleSwapDeployed::decode_log_data(&log.data) else {
            continue;
        };
        let address = event.contractAddress;
        if !address.is_zero() && !candidates.contains(&address) {
            candidates.push(address);
        }
    }

    match candidates.as_slice() {
        [] => Err(ChequeError::DeploymentNotFound { factory }),
        [chequebook] => Ok(*chequebook),
        _ => Err(ChequeError::AmbiguousDeployment {
            factory,
            candidates,
        }),
    }
}
