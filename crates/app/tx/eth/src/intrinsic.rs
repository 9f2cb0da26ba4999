//! Intrinsic gas: the floor every Ethereum transaction must declare.

use alloy_eips::eip2930::AccessList;
use tollgate_core::{AnteError, AnteResult, ErrorKind};

pub const TX_GAS: u64 = 21_000;
pub const TX_GAS_CONTRACT_CREATION: u64 = 53_000;
pub const TX_DATA_ZERO_GAS: u64 = 4;
pub const TX_DATA_NON_ZERO_GAS_FRONTIER: u64 = 68;
pub const TX_DATA_NON_ZERO_GAS_EIP2028: u64 = 16;
pub const TX_ACCESS_LIST_ADDRESS_GAS: u64 = 2_400;
pub const TX_ACCESS_LIST_STORAGE_KEY_GAS: u64 = 1_900;

fn overflow() -> AnteError {
    AnteError::new(ErrorKind::OutOfGas, "gas uint64 overflow")
}

/// Gas charged before any execution.
///
/// `homestead` prices contract creation at 53000 instead of 21000;
/// `istanbul` lowers the non-zero calldata byte cost from 68 to 16.
pub fn intrinsic_gas(
    data: &[u8],
    access_list: Option<&AccessList>,
    is_contract_creation: bool,
    homestead: bool,
    istanbul: bool,
) -> AnteResult<u64> {
    let mut gas = if is_contract_creation && homestead {
        TX_GAS_CONTRACT_CREATION
    } else {
        TX_GAS
    };

    if !data.is_empty() {
        let non_zero = data.iter().filter(|b| **b != 0).count() as u64;
        let zero = data.len() as u64 - non_zero;
        let non_zero_cost = if istanbul {
            TX_DATA_NON_ZERO_GAS_EIP2028
        } else {
            TX_DATA_NON_ZERO_GAS_FRONTIER
        };
        gas = non_zero
            .checked_mul(non_zero_cost)
            .and_then(|c| gas.checked_add(c))
            .ok_or_else(overflow)?;
        gas = zero
            .checked_mul(TX_DATA_ZERO_GAS)
            .and_then(|c| gas.checked_add(c))
            .ok_or_else(overflow)?;
    }

    if let Some(list) = access_list {
        let addresses = list.0.len() as u64;
        let keys: u64 = list.0.iter().map(|item| item.storage_keys.len() as u64).sum();
        gas = addresses
            .checked_mul(TX_ACCESS_LIST_ADDRESS_GAS)
            .and_then(|c| gas.checked_add(c))
            .ok_or_else(overflow)?;
        gas = keys
            .checked_mul(TX_ACCESS_LIST_STORAGE_KEY_GAS)
            .and_then(|c| gas.checked_add(c))
            .ok_or_else(overflow)?;
    }

    Ok(gas)
}
