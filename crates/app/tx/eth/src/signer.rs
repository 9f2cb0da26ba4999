//! Fork-aware sender recovery.

use alloy_primitives::Address;

use crate::envelope::tx_type;
use crate::error::SignerError;
use crate::ethereum::recover_sender_from_signature_hash;
use crate::forks::ForkSchedule;
use crate::traits::TypedTransaction;

/// The set of rules used to recover a sender at a given height.
///
/// Mirrors Ethereum's signer progression: London accepts every supported
/// type, Berlin drops dynamic-fee transactions, and anything older accepts
/// legacy transactions only. Replay-protected transactions must name this
/// chain's EIP-155 id; unprotected legacy transactions fall back to the
/// pre-EIP-155 signing hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthSigner {
    chain_id: u64,
    eip155: bool,
    berlin: bool,
    london: bool,
}

impl EthSigner {
    /// Build the signer in effect at `height`.
    pub fn for_height(forks: &ForkSchedule, chain_id: u64, height: u64) -> Self {
        Self {
            chain_id,
            eip155: forks.is_eip155(height),
            berlin: forks.is_berlin(height),
            london: forks.is_london(height),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn accepts_type(&self, ty: u8) -> bool {
        match ty {
            tx_type::LEGACY => true,
            tx_type::EIP2930 => self.berlin,
            tx_type::EIP1559 => self.london,
            _ => false,
        }
    }

    /// Recover the sender of `tx` under these rules.
    pub fn sender<T: TypedTransaction + ?Sized>(&self, tx: &T) -> Result<Address, SignerError> {
        let ty = tx.tx_type();
        if !self.accepts_type(ty) {
            return Err(SignerError::UnsupportedTxType(ty));
        }
        if let Some(got) = tx.chain_id() {
            if ty == tx_type::LEGACY && !self.eip155 {
                return Err(SignerError::ProtectionNotActive);
            }
            if got != self.chain_id {
                return Err(SignerError::ChainIdMismatch {
                    expected: self.chain_id,
                    got,
                });
            }
        }
        recover_sender_from_signature_hash(tx.signature_hash(), tx.signature())
    }
}
