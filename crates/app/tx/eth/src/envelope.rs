//! Signed transaction payload supporting EIP-2718 typed transactions.

use alloy_consensus::{SignableTransaction, Signed, TxEip1559, TxEip2930, TxLegacy};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, PrimitiveSignature, B256, U256};
use tollgate_core::{ensure, AnteError, AnteResult, ErrorKind};

use crate::traits::TypedTransaction;

/// Transaction type constants per EIP-2718.
pub mod tx_type {
    /// Legacy transaction (pre-EIP-2718).
    pub const LEGACY: u8 = 0x00;
    /// EIP-2930 access list transaction.
    pub const EIP2930: u8 = 0x01;
    /// EIP-1559 fee market transaction.
    pub const EIP1559: u8 = 0x02;
}

/// The signed payload of an Ethereum message.
#[derive(Clone, Debug, PartialEq)]
pub enum EthTxData {
    /// Legacy transaction (type 0x00 or untyped).
    Legacy(Signed<TxLegacy>),
    /// EIP-2930 access list transaction (type 0x01).
    AccessList(Signed<TxEip2930>),
    /// EIP-1559 fee market transaction (type 0x02).
    DynamicFee(Signed<TxEip1559>),
}

impl EthTxData {
    /// Stateless sanity checks on the payload itself.
    pub fn validate(&self) -> AnteResult<()> {
        ensure!(
            self.gas_limit() > 0,
            AnteError::new(ErrorKind::InvalidGasLimit, "gas limit must not be zero")
        );
        if let Self::DynamicFee(signed) = self {
            let tx = signed.tx();
            ensure!(
                tx.max_fee_per_gas >= tx.max_priority_fee_per_gas,
                AnteError::new(
                    ErrorKind::InvalidGasCap,
                    format!(
                        "max priority fee per gas higher than max fee per gas ({} > {})",
                        tx.max_priority_fee_per_gas, tx.max_fee_per_gas
                    ),
                )
            );
        }
        Ok(())
    }
}

impl From<Signed<TxLegacy>> for EthTxData {
    fn from(signed: Signed<TxLegacy>) -> Self {
        Self::Legacy(signed)
    }
}

impl From<Signed<TxEip2930>> for EthTxData {
    fn from(signed: Signed<TxEip2930>) -> Self {
        Self::AccessList(signed)
    }
}

impl From<Signed<TxEip1559>> for EthTxData {
    fn from(signed: Signed<TxEip1559>) -> Self {
        Self::DynamicFee(signed)
    }
}

impl TypedTransaction for EthTxData {
    fn tx_type(&self) -> u8 {
        match self {
            Self::Legacy(_) => tx_type::LEGACY,
            Self::AccessList(_) => tx_type::EIP2930,
            Self::DynamicFee(_) => tx_type::EIP1559,
        }
    }

    fn tx_hash(&self) -> B256 {
        match self {
            Self::Legacy(signed) => *signed.hash(),
            Self::AccessList(signed) => *signed.hash(),
            Self::DynamicFee(signed) => *signed.hash(),
        }
    }

    fn chain_id(&self) -> Option<u64> {
        match self {
            Self::Legacy(signed) => signed.tx().chain_id,
            Self::AccessList(signed) => Some(signed.tx().chain_id),
            Self::DynamicFee(signed) => Some(signed.tx().chain_id),
        }
    }

    fn nonce(&self) -> u64 {
        match self {
            Self::Legacy(signed) => signed.tx().nonce,
            Self::AccessList(signed) => signed.tx().nonce,
            Self::DynamicFee(signed) => signed.tx().nonce,
        }
    }

    fn gas_limit(&self) -> u64 {
        match self {
            Self::Legacy(signed) => signed.tx().gas_limit,
            Self::AccessList(signed) => signed.tx().gas_limit,
            Self::DynamicFee(signed) => signed.tx().gas_limit,
        }
    }

    fn to(&self) -> Option<Address> {
        let kind = match self {
            Self::Legacy(signed) => &signed.tx().to,
            Self::AccessList(signed) => &signed.tx().to,
            Self::DynamicFee(signed) => &signed.tx().to,
        };
        kind.to().copied()
    }

    fn value(&self) -> U256 {
        match self {
            Self::Legacy(signed) => signed.tx().value,
            Self::AccessList(signed) => signed.tx().value,
            Self::DynamicFee(signed) => signed.tx().value,
        }
    }

    fn input(&self) -> &[u8] {
        match self {
            Self::Legacy(signed) => &signed.tx().input,
            Self::AccessList(signed) => &signed.tx().input,
            Self::DynamicFee(signed) => &signed.tx().input,
        }
    }

    fn access_list(&self) -> Option<&AccessList> {
        match self {
            Self::Legacy(_) => None,
            Self::AccessList(signed) => Some(&signed.tx().access_list),
            Self::DynamicFee(signed) => Some(&signed.tx().access_list),
        }
    }

    fn gas_fee_cap(&self) -> U256 {
        match self {
            Self::Legacy(signed) => U256::from(signed.tx().gas_price),
            Self::AccessList(signed) => U256::from(signed.tx().gas_price),
            Self::DynamicFee(signed) => U256::from(signed.tx().max_fee_per_gas),
        }
    }

    fn gas_tip_cap(&self) -> U256 {
        match self {
            Self::Legacy(signed) => U256::from(signed.tx().gas_price),
            Self::AccessList(signed) => U256::from(signed.tx().gas_price),
            Self::DynamicFee(signed) => U256::from(signed.tx().max_priority_fee_per_gas),
        }
    }

    fn signature(&self) -> &PrimitiveSignature {
        match self {
            Self::Legacy(signed) => signed.signature(),
            Self::AccessList(signed) => signed.signature(),
            Self::DynamicFee(signed) => signed.signature(),
        }
    }

    fn signature_hash(&self) -> B256 {
        match self {
            Self::Legacy(signed) => signed.tx().signature_hash(),
            Self::AccessList(signed) => signed.tx().signature_hash(),
            Self::DynamicFee(signed) => signed.tx().signature_hash(),
        }
    }
}
