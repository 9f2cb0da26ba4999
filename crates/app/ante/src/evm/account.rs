use std::sync::Arc;

use alloy_primitives::U256;
use tollgate_core::{ante_err, AnteResult};
use tollgate_tx::Tx;
use tollgate_tx_eth::{EthTxData, TypedTransaction};
use tracing::debug;

use crate::context::Context;
use crate::decorator::{AnteDecorator, Next};
use crate::keepers::{AccountKeeper, EvmKeeper};

use super::verified_sender;

fn check_sender_balance(balance: U256, data: &EthTxData) -> AnteResult<()> {
    let cost = data.cost();
    if balance < cost {
        return Err(ante_err!(
            InsufficientFunds,
            "sender balance < tx cost ({balance} < {cost})"
        ));
    }
    Ok(())
}

/// Check-mode only: the sender must be an externally owned account able to
/// cover the message's full cost. Unknown senders get a fresh account.
pub struct EthAccountVerification {
    accounts: Arc<dyn AccountKeeper>,
    evm: Arc<dyn EvmKeeper>,
}

impl EthAccountVerification {
    pub fn new(accounts: Arc<dyn AccountKeeper>, evm: Arc<dyn EvmKeeper>) -> Self {
        Self { accounts, evm }
    }
}

impl AnteDecorator for EthAccountVerification {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        if !ctx.is_check_tx() {
            return next.run(ctx, tx, simulate);
        }

        for msg in tx.ethereum_msgs() {
            let from = verified_sender(msg)?;
            let balance = match self.evm.get_account(from) {
                Some(account) if account.is_contract() => {
                    return Err(ante_err!(
                        InvalidTxType,
                        "the sender is not EOA: address {from}, codeHash <{}>",
                        account.code_hash
                    ));
                }
                Some(account) => account.balance,
                None => {
                    debug!(%from, "creating account for new ethereum sender");
                    let account = self.accounts.new_account_with_address(from);
                    self.accounts.set_account(account);
                    U256::ZERO
                }
            };
            check_sender_balance(balance, msg.data())
                .map_err(|err| err.wrap("failed to check sender balance"))?;
        }

        next.run(ctx, tx, simulate)
    }
}

/// Verifies each message's nonce against its sender's sequence and bumps
/// the sequence. Several messages from one sender must carry consecutive
/// nonces.
pub struct EthIncrementSenderSequence {
    accounts: Arc<dyn AccountKeeper>,
}

impl EthIncrementSenderSequence {
    pub fn new(accounts: Arc<dyn AccountKeeper>) -> Self {
        Self { accounts }
    }
}

impl AnteDecorator for EthIncrementSenderSequence {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context> {
        for msg in tx.ethereum_msgs() {
            let from = verified_sender(msg)?;
            let Some(mut account) = self.accounts.get_account(from) else {
                return Err(ante_err!(UnknownAddress, "account {from} is nil"));
            };
            let nonce = msg.data().nonce();
            if nonce != account.sequence {
                return Err(ante_err!(
                    InvalidSequence,
                    "invalid nonce; got {nonce}, expected {}",
                    account.sequence
                ));
            }
            account.sequence += 1;
            self.accounts.set_account(account);
        }

        next.run(ctx, tx, simulate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::ExecMode;
    use crate::decorator::AnteChain;
    use crate::evm::fixtures::{envelope, MockEvm, Signer, CHAIN_ID};
    use crate::keepers::{Account, EvmAccount};
    use alloy_primitives::{Address, B256};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tollgate_core::ErrorKind;
    use tollgate_tx_eth::{EthSigner, EthereumMsg, ForkSchedule};

    #[derive(Default)]
    struct MockAccounts(Mutex<HashMap<Address, Account>>);

    impl AccountKeeper for MockAccounts {
        fn get_account(&self, address: Address) -> Option<Account> {
            self.0.lock().unwrap().get(&address).cloned()
        }

        fn set_account(&self, account: Account) {
            self.0.lock().unwrap().insert(account.address, account);
        }

        fn new_account_with_address(&self, address: Address) -> Account {
            Account {
                address,
                account_number: self.0.lock().unwrap().len() as u64,
                sequence: 0,
                pubkey: None,
                vesting: None,
            }
        }

        fn module_address(&self, _: &str) -> Option<Address> {
            None
        }
    }

    fn verified(mut msg: EthereumMsg) -> EthereumMsg {
        msg.verify_sender(&EthSigner::for_height(&ForkSchedule::default(), CHAIN_ID, 1))
            .unwrap();
        msg
    }

    fn ctx(mode: ExecMode) -> Context {
        Context::new("haqq_11235-1", 1, 0, mode)
    }

    #[test]
    fn test_unknown_sender_gets_account_but_needs_funds() {
        let signer = Signer::random();
        let accounts = Arc::new(MockAccounts::default());
        let chain = AnteChain::new(
            "acct",
            vec![Box::new(EthAccountVerification::new(
                accounts.clone(),
                Arc::new(MockEvm::default()),
            ))],
        );

        let mut free = envelope(vec![verified(signer.legacy(0, 0, 21_000, 0))], "aISLM");
        chain.run(ctx(ExecMode::Check), &mut free, false).unwrap();
        assert!(accounts.get_account(signer.address).is_some());

        let mut paid = envelope(vec![verified(signer.legacy(0, 1, 21_000, 0))], "aISLM");
        let err = chain.run(ctx(ExecMode::Check), &mut paid, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert!(chain.run(ctx(ExecMode::Deliver), &mut paid, false).is_ok());
    }

    #[test]
    fn test_contract_sender_is_rejected() {
        let signer = Signer::random();
        let evm = MockEvm::default();
        evm.accounts.lock().unwrap().insert(
            signer.address,
            EvmAccount {
                balance: U256::from(u64::MAX),
                code_hash: B256::repeat_byte(7),
                ..Default::default()
            },
        );
        let chain = AnteChain::new(
            "acct",
            vec![Box::new(EthAccountVerification::new(
                Arc::new(MockAccounts::default()),
                Arc::new(evm),
            ))],
        );
        let mut tx = envelope(vec![verified(signer.legacy(0, 1, 21_000, 0))], "aISLM");
        let err = chain.run(ctx(ExecMode::Check), &mut tx, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTxType);
    }

    #[test]
    fn test_balance_covers_fee_plus_value() {
        let signer = Signer::random();
        let evm = MockEvm::default();
        evm.fund(signer.address, 21_000 + 5);
        let chain = AnteChain::new(
            "acct",
            vec![Box::new(EthAccountVerification::new(
                Arc::new(MockAccounts::default()),
                Arc::new(evm),
            ))],
        );
        let mut exact = envelope(vec![verified(signer.legacy(0, 1, 21_000, 5))], "aISLM");
        assert!(chain.run(ctx(ExecMode::Check), &mut exact, false).is_ok());
        let mut over = envelope(vec![verified(signer.legacy(0, 1, 21_000, 6))], "aISLM");
        assert!(chain.run(ctx(ExecMode::Check), &mut over, false).is_err());
    }

    #[test]
    fn test_consecutive_nonces_in_one_tx() {
        let signer = Signer::random();
        let accounts = Arc::new(MockAccounts::default());
        accounts.set_account(accounts.new_account_with_address(signer.address));
        let chain = AnteChain::new(
            "seq",
            vec![Box::new(EthIncrementSenderSequence::new(accounts.clone()))],
        );

        let mut tx = envelope(
            vec![
                verified(signer.legacy(0, 1, 21_000, 0)),
                verified(signer.legacy(1, 1, 21_000, 0)),
            ],
            "aISLM",
        );
        chain.run(ctx(ExecMode::Deliver), &mut tx, false).unwrap();
        assert_eq!(accounts.get_account(signer.address).unwrap().sequence, 2);

        let mut stale = envelope(vec![verified(signer.legacy(1, 1, 21_000, 0))], "aISLM");
        let err = chain.run(ctx(ExecMode::Deliver), &mut stale, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSequence);
        assert_eq!(err.reason(), "invalid nonce; got 1, expected 2");
    }

    #[test]
    fn test_missing_account_is_unknown() {
        let signer = Signer::random();
        let chain = AnteChain::new(
            "seq",
            vec![Box::new(EthIncrementSenderSequence::new(Arc::new(
                MockAccounts::default(),
            )))],
        );
        let mut tx = envelope(vec![verified(signer.legacy(0, 1, 21_000, 0))], "aISLM");
        let err = chain.run(ctx(ExecMode::Deliver), &mut tx, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAddress);
    }
}
