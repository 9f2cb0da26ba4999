//! Signer and recovery failures.
//!
//! These stay local to the crate; the admission pipeline folds every variant
//! into an `InvalidSigner` rejection with the rendered message as reason.

use thiserror::Error;
use tollgate_core::{AnteError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("transaction type {0:#04x} not supported")]
    UnsupportedTxType(u8),

    #[error("invalid chain id for signer: have {got}, want {expected}")]
    ChainIdMismatch { expected: u64, got: u64 },

    #[error("replay-protected transaction before EIP-155 activation")]
    ProtectionNotActive,

    #[error("invalid transaction v, r, s values")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("sender already set to {0}")]
    SenderAlreadySet(alloy_primitives::Address),
}

impl From<SignerError> for AnteError {
    fn from(err: SignerError) -> Self {
        AnteError::new(
            ErrorKind::InvalidSigner,
            format!("couldn't retrieve sender address from the ethereum transaction: {err}"),
        )
    }
}
