//! Rejection kinds and the error type returned by every admission step.
//!
//! ## Kind conventions
//!
//! Callers (mempool, block executor) branch on [`ErrorKind`] only. The
//! human-readable reason carried by [`AnteError`] is for operators and is not
//! part of the stable surface.
//!
//! Each kind maps to a `(codespace, code)` pair that never changes once
//! assigned:
//! - `sdk`: generic ledger rejections (fees, signatures, sequences)
//! - `evm`: Ethereum-specific rejections (access control, fee caps, tx types)
//! - `ante`: rejections introduced by this pipeline (reward fallback, vesting)

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    #[error("internal")]
    Internal,
    #[error("tx parse error")]
    InvalidTxType,
    #[error("invalid request")]
    InvalidRequest,
    #[error("unknown address")]
    UnknownAddress,
    #[error("incorrect account sequence")]
    InvalidSequence,
    #[error("insufficient fee")]
    InsufficientFee,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("insufficient funds and failed to claim sufficient staking rewards to pay for fees")]
    InsufficientFundsAndRewards,
    #[error("insufficient unlocked vesting coins")]
    InsufficientUnlockedVestingCoins,
    #[error("invalid signer")]
    InvalidSigner,
    #[error("feature not supported")]
    NotSupported,
    #[error("out of gas")]
    OutOfGas,
    #[error("EVM Create operation is disabled")]
    CreateDisabled,
    #[error("EVM Call operation is disabled")]
    CallDisabled,
    #[error("invalid gas limit")]
    InvalidGasLimit,
    #[error("unknown extension options")]
    UnknownExtensionOptions,
    #[error("tx timeout height")]
    TxTimeoutHeight,
    #[error("memo too large")]
    MemoTooLarge,
    #[error("invalid pubkey")]
    InvalidPubKey,
    #[error("unauthorized")]
    Unauthorized,
    #[error("no signatures supplied")]
    NoSignatures,
    #[error("too many signatures")]
    TooManySignatures,
    #[error("invalid base fee")]
    InvalidBaseFee,
    #[error("transaction type not supported")]
    TxTypeNotSupported,
    #[error("invalid gas cap")]
    InvalidGasCap,
    #[error("invalid chain-id")]
    InvalidChainId,
    #[error("tx is redundant")]
    RedundantTx,
}

impl ErrorKind {
    pub const fn codespace(self) -> &'static str {
        match self {
            Self::CreateDisabled
            | Self::CallDisabled
            | Self::InvalidBaseFee
            | Self::TxTypeNotSupported
            | Self::InvalidGasCap => "evm",
            Self::InsufficientFundsAndRewards | Self::InsufficientUnlockedVestingCoins => "ante",
            _ => "sdk",
        }
    }

    pub const fn code(self) -> u32 {
        match self {
            Self::Internal => 1,
            Self::Unauthorized => 4,
            Self::InsufficientFunds => 5,
            Self::InvalidPubKey => 8,
            Self::UnknownAddress => 9,
            Self::OutOfGas => 11,
            Self::MemoTooLarge => 12,
            Self::InsufficientFee => 13,
            Self::TooManySignatures => 14,
            Self::NoSignatures => 15,
            Self::InvalidRequest => 18,
            Self::RedundantTx => 24,
            Self::InvalidTxType => 29,
            Self::TxTimeoutHeight => 30,
            Self::UnknownExtensionOptions => 31,
            Self::InvalidSequence => 32,
            Self::NotSupported => 37,
            Self::InvalidSigner => 38,
            Self::InvalidGasLimit => 41,
            Self::InvalidChainId => 42,
            Self::CreateDisabled => 10,
            Self::CallDisabled => 11,
            Self::InvalidGasCap => 18,
            Self::InvalidBaseFee => 19,
            Self::TxTypeNotSupported => 30,
            Self::InsufficientFundsAndRewards => 2,
            Self::InsufficientUnlockedVestingCoins => 3,
        }
    }
}

/// A typed rejection: a stable [`ErrorKind`] plus a free-form reason.
///
/// Renders as `"{reason}: {kind}"`, or just the kind when no reason was given.
#[derive(Clone, PartialEq, Eq)]
pub struct AnteError {
    kind: ErrorKind,
    reason: String,
}

impl AnteError {
    pub fn new(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Prefix the reason with additional context, keeping the kind.
    pub fn wrap(self, context: impl fmt::Display) -> Self {
        let reason = if self.reason.is_empty() {
            context.to_string()
        } else {
            format!("{context}: {}", self.reason)
        };
        Self {
            kind: self.kind,
            reason,
        }
    }
}

impl From<ErrorKind> for AnteError {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            reason: String::new(),
        }
    }
}

impl From<tollgate_math::MathError> for AnteError {
    fn from(err: tollgate_math::MathError) -> Self {
        Self::new(ErrorKind::InvalidRequest, err.to_string())
    }
}

impl fmt::Display for AnteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.reason, self.kind)
        }
    }
}

impl fmt::Debug for AnteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnteError {{ kind: {:?} ({}/{}), reason: {:?} }}",
            self.kind,
            self.kind.codespace(),
            self.kind.code(),
            self.reason
        )
    }
}

impl std::error::Error for AnteError {}

pub type AnteResult<T> = Result<T, AnteError>;

/// Build an [`AnteError`] from a kind and a `format!`-style reason.
#[macro_export]
macro_rules! ante_err {
    ($kind:ident, $($arg:tt)+) => {
        $crate::error::AnteError::new($crate::error::ErrorKind::$kind, format!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: &[ErrorKind] = &[
        ErrorKind::Internal,
        ErrorKind::InvalidTxType,
        ErrorKind::InvalidRequest,
        ErrorKind::UnknownAddress,
        ErrorKind::InvalidSequence,
        ErrorKind::InsufficientFee,
        ErrorKind::InsufficientFunds,
        ErrorKind::InsufficientFundsAndRewards,
        ErrorKind::InsufficientUnlockedVestingCoins,
        ErrorKind::InvalidSigner,
        ErrorKind::NotSupported,
        ErrorKind::OutOfGas,
        ErrorKind::CreateDisabled,
        ErrorKind::CallDisabled,
        ErrorKind::InvalidGasLimit,
        ErrorKind::UnknownExtensionOptions,
        ErrorKind::TxTimeoutHeight,
        ErrorKind::MemoTooLarge,
        ErrorKind::InvalidPubKey,
        ErrorKind::Unauthorized,
        ErrorKind::NoSignatures,
        ErrorKind::TooManySignatures,
        ErrorKind::InvalidBaseFee,
        ErrorKind::TxTypeNotSupported,
        ErrorKind::InvalidGasCap,
        ErrorKind::InvalidChainId,
        ErrorKind::RedundantTx,
    ];

    #[test]
    fn no_duplicate_codes_within_codespace() {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for kind in ALL {
            if !seen.insert((kind.codespace(), kind.code())) {
                duplicates.push(*kind);
            }
        }
        assert!(
            duplicates.is_empty(),
            "Found duplicate error codes: {duplicates:?}"
        );
    }

    #[test]
    fn display_renders_reason_then_kind() {
        let err = AnteError::new(ErrorKind::InsufficientFee, "gas prices too low");
        assert_eq!(err.to_string(), "gas prices too low: insufficient fee");

        let bare: AnteError = ErrorKind::OutOfGas.into();
        assert_eq!(bare.to_string(), "out of gas");
    }

    #[test]
    fn wrap_keeps_kind() {
        let err = AnteError::new(ErrorKind::InsufficientFunds, "0 < 10")
            .wrap("failed to deduct transaction costs from user balance");
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(
            err.reason(),
            "failed to deduct transaction costs from user balance: 0 < 10"
        );
    }

    #[test]
    fn ante_err_macro_formats() {
        let err = ante_err!(InvalidSequence, "invalid nonce; got {}, expected {}", 3, 2);
        assert_eq!(err.kind(), ErrorKind::InvalidSequence);
        assert_eq!(err.reason(), "invalid nonce; got 3, expected 2");
    }
}
