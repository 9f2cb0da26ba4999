//! Native and legacy EIP-712 chains against the in-memory ledger.

use alloy_primitives::{Address, Bytes, U256};
use tollgate_ante::{
    AccountKeeper, AnteHandler, BankKeeper, ChainPolicy, ExecMode, HandlerOptions, Keepers,
    FEE_COLLECTOR,
};
use tollgate_core::events::{ATTRIBUTE_KEY_FEE_PAYER, EVENT_TYPE_TX};
use tollgate_core::{Coins, ErrorKind};
use tollgate_testing::{
    context, EthMsgBuilder, MemoryLedger, NativeTxBuilder, Signer, TestKey, TEST_DENOM,
    TEST_EIP155_CHAIN_ID,
};
use tollgate_tx::{ExtensionOption, Message, NativeMsg, SignMode, Tx, Web3TxOption};

fn handler(keepers: Keepers) -> AnteHandler {
    AnteHandler::new(HandlerOptions::new(keepers, ChainPolicy::default())).unwrap()
}

fn send(from: Address) -> Message {
    NativeMsg::Send {
        from,
        to: Address::repeat_byte(0xaa),
        amount: Coins::single(TEST_DENOM, 100u64),
    }
    .into()
}

fn account(ledger: &MemoryLedger, key: &TestKey, amount: u64) -> u64 {
    let account = ledger.create_account(key.address());
    ledger.fund(key.address(), amount);
    account.account_number
}

fn balance(ledger: &MemoryLedger, address: Address) -> U256 {
    ledger.balance(address, TEST_DENOM)
}

#[test]
fn test_direct_signed_send_is_admitted() {
    let ledger = MemoryLedger::shared();
    let key = TestKey::random();
    let number = account(&ledger, &key, 1_000_000);
    let handler = handler(ledger.keepers());

    let mut tx = NativeTxBuilder::new([send(key.address())])
        .fee(5_000u64, 200_000)
        .sign(SignMode::Direct, &[Signer::new(&key, number, 0)]);
    let ctx = handler
        .handle(context(ExecMode::Deliver), &mut tx, false)
        .unwrap();

    assert_eq!(balance(&ledger, key.address()), U256::from(995_000u64));
    assert_eq!(ledger.module_balance(FEE_COLLECTOR), U256::from(5_000u64));
    let stored = ledger.get_account(key.address()).unwrap();
    assert_eq!(stored.sequence, 1);
    assert_eq!(stored.pubkey, Some(key.pubkey()));
    assert!(!ctx.gas_meter.is_infinite());
    assert!(ctx.gas_meter.gas_consumed() >= 21_000);
}

#[test]
fn test_amino_signed_send_is_admitted() {
    let ledger = MemoryLedger::shared();
    let key = TestKey::random();
    let number = account(&ledger, &key, 1_000_000);
    let handler = handler(ledger.keepers());

    let mut tx = NativeTxBuilder::new([send(key.address())])
        .fee(5_000u64, 200_000)
        .memo("hello")
        .sign(SignMode::LegacyAminoJson, &[Signer::new(&key, number, 0)]);
    handler
        .handle(context(ExecMode::Check), &mut tx, false)
        .unwrap();
    assert_eq!(ledger.get_account(key.address()).unwrap().sequence, 1);
}

#[test]
fn test_signature_over_wrong_account_number_fails() {
    let ledger = MemoryLedger::shared();
    let key = TestKey::random();
    let number = account(&ledger, &key, 1_000_000);
    let handler = handler(ledger.keepers());

    let mut tx = NativeTxBuilder::new([send(key.address())])
        .fee(5_000u64, 200_000)
        .sign(SignMode::Direct, &[Signer::new(&key, number + 1, 0)]);
    let err = handler
        .handle(context(ExecMode::Deliver), &mut tx, false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(err.reason().starts_with("signature verification failed"));
}

#[test]
fn test_stale_sequence_is_rejected() {
    let ledger = MemoryLedger::shared();
    let key = TestKey::random();
    let number = account(&ledger, &key, 1_000_000);
    let handler = handler(ledger.keepers());

    let tx = NativeTxBuilder::new([send(key.address())])
        .fee(5_000u64, 200_000)
        .sign(SignMode::Direct, &[Signer::new(&key, number, 0)]);
    handler
        .handle(context(ExecMode::Deliver), &mut tx.clone(), false)
        .unwrap();
    let err = handler
        .handle(context(ExecMode::Deliver), &mut tx.clone(), false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSequence);
}

#[test]
fn test_ethereum_message_needs_ethereum_option() {
    let ledger = MemoryLedger::shared();
    let key = TestKey::random();
    account(&ledger, &key, 1_000_000);
    let handler = handler(ledger.keepers());

    let mut tx = NativeTxBuilder::new([EthMsgBuilder::new().sign(&key).into()]).unsigned();
    let err = handler
        .handle(context(ExecMode::Check), &mut tx, false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTxType);
}

#[test]
fn test_expired_timeout_height_is_rejected() {
    let ledger = MemoryLedger::shared();
    let key = TestKey::random();
    let number = account(&ledger, &key, 1_000_000);
    let handler = handler(ledger.keepers());

    let mut tx = NativeTxBuilder::new([send(key.address())])
        .fee(5_000u64, 200_000)
        .timeout_height(10)
        .sign(SignMode::Direct, &[Signer::new(&key, number, 0)]);
    let err = handler
        .handle(context(ExecMode::Check), &mut tx, false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TxTimeoutHeight);
}

#[test]
fn test_rewards_cover_native_fee() {
    let ledger = MemoryLedger::shared();
    let key = TestKey::random();
    let number = account(&ledger, &key, 1_000);
    ledger.delegate(key.address(), Address::repeat_byte(0x10), 3_000u64);
    ledger.delegate(key.address(), Address::repeat_byte(0x20), 3_000u64);
    let handler = handler(ledger.keepers());

    let mut tx = NativeTxBuilder::new([send(key.address())])
        .fee(5_000u64, 200_000)
        .sign(SignMode::Direct, &[Signer::new(&key, number, 0)]);
    handler
        .handle(context(ExecMode::Deliver), &mut tx, false)
        .unwrap();

    // both delegations are drained, lowest validator address first
    assert_eq!(balance(&ledger, key.address()), U256::from(2_000u64));
    assert_eq!(ledger.module_balance(FEE_COLLECTOR), U256::from(5_000u64));
}

#[test]
fn test_fee_beyond_balance_and_rewards_is_rejected() {
    let ledger = MemoryLedger::shared();
    let key = TestKey::random();
    let number = account(&ledger, &key, 1_000);
    ledger.delegate(key.address(), Address::repeat_byte(0x10), 1_000u64);
    let handler = handler(ledger.keepers());

    let mut tx = NativeTxBuilder::new([send(key.address())])
        .fee(5_000u64, 200_000)
        .sign(SignMode::Direct, &[Signer::new(&key, number, 0)]);
    let err = handler
        .handle(context(ExecMode::Deliver), &mut tx, false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFundsAndRewards);
    assert_eq!(balance(&ledger, key.address()), U256::from(1_000u64));
}

mod fee_payer {
    use super::*;

    #[test]
    fn test_cosigning_payer_is_charged() {
        let ledger = MemoryLedger::shared();
        let sender = TestKey::random();
        let sender_number = account(&ledger, &sender, 1_000);
        let payer = TestKey::random();
        let payer_number = account(&ledger, &payer, 1_000_000);
        let handler = handler(ledger.keepers());

        let mut tx = NativeTxBuilder::new([send(sender.address())])
            .fee(5_000u64, 200_000)
            .payer(payer.address())
            .sign(
                SignMode::Direct,
                &[
                    Signer::new(&sender, sender_number, 0),
                    Signer::new(&payer, payer_number, 0),
                ],
            );
        let ctx = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap();

        assert_eq!(balance(&ledger, payer.address()), U256::from(995_000u64));
        assert_eq!(balance(&ledger, sender.address()), U256::from(1_000u64));
        assert_eq!(ledger.get_account(sender.address()).unwrap().sequence, 1);
        assert_eq!(ledger.get_account(payer.address()).unwrap().sequence, 1);
        let fee_payer = ctx
            .events_of(EVENT_TYPE_TX)
            .find_map(|event| event.attribute(ATTRIBUTE_KEY_FEE_PAYER))
            .unwrap();
        assert_eq!(fee_payer, payer.address().to_string());
    }

    #[test]
    fn test_payer_must_sign() {
        let ledger = MemoryLedger::shared();
        let sender = TestKey::random();
        let sender_number = account(&ledger, &sender, 1_000_000);
        let victim = TestKey::random();
        account(&ledger, &victim, 1_000_000);
        let handler = handler(ledger.keepers());

        let mut tx = NativeTxBuilder::new([send(sender.address())])
            .fee(900_000u64, 200_000)
            .payer(victim.address())
            .sign(SignMode::Direct, &[Signer::new(&sender, sender_number, 0)]);
        let err = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(balance(&ledger, victim.address()), U256::from(1_000_000u64));
        assert!(ledger.module_balance(FEE_COLLECTOR).is_zero());
    }

    #[test]
    fn test_payer_slot_signed_by_sender_is_rejected() {
        let ledger = MemoryLedger::shared();
        let sender = TestKey::random();
        let sender_number = account(&ledger, &sender, 1_000_000);
        let victim = TestKey::random();
        account(&ledger, &victim, 1_000_000);
        let handler = handler(ledger.keepers());

        let mut tx = NativeTxBuilder::new([send(sender.address())])
            .fee(900_000u64, 200_000)
            .payer(victim.address())
            .sign(
                SignMode::Direct,
                &[
                    Signer::new(&sender, sender_number, 0),
                    Signer::new(&sender, sender_number, 0),
                ],
            );
        let err = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap_err();
        // The fee is taken before keys are bound; the caller discards the
        // state of a rejected transaction.
        assert_eq!(err.kind(), ErrorKind::InvalidPubKey);
        assert!(err.reason().contains(&victim.address().to_string()));
        assert_eq!(ledger.get_account(sender.address()).unwrap().sequence, 0);
    }
}

mod fee_grants {
    use super::*;

    fn granted_tx(signer: &TestKey, number: u64, granter: Address) -> Tx {
        NativeTxBuilder::new([send(signer.address())])
            .fee(5_000u64, 200_000)
            .granter(granter)
            .sign(SignMode::Direct, &[Signer::new(signer, number, 0)])
    }

    #[test]
    fn test_granter_pays_within_allowance() {
        let ledger = MemoryLedger::shared();
        let signer = TestKey::random();
        let number = account(&ledger, &signer, 0);
        let granter = TestKey::random();
        account(&ledger, &granter, 1_000_000);
        ledger.grant_allowance(
            granter.address(),
            signer.address(),
            Some(Coins::single(TEST_DENOM, 8_000u64)),
        );
        let handler = handler(ledger.keepers());

        let mut tx = granted_tx(&signer, number, granter.address());
        let ctx = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap();

        assert_eq!(balance(&ledger, granter.address()), U256::from(995_000u64));
        assert_eq!(
            ledger.allowance(granter.address(), signer.address()),
            Some(Some(Coins::single(TEST_DENOM, 3_000u64)))
        );
        let payer = ctx
            .events_of(EVENT_TYPE_TX)
            .find_map(|event| event.attribute(ATTRIBUTE_KEY_FEE_PAYER))
            .unwrap();
        assert_eq!(payer, granter.address().to_string());
    }

    #[test]
    fn test_missing_allowance_names_both_parties() {
        let ledger = MemoryLedger::shared();
        let signer = TestKey::random();
        let number = account(&ledger, &signer, 0);
        let granter = TestKey::random();
        account(&ledger, &granter, 1_000_000);
        let handler = handler(ledger.keepers());

        let mut tx = granted_tx(&signer, number, granter.address());
        let err = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSigner);
        assert!(err.reason().contains(&granter.address().to_string()));
        assert!(err.reason().contains(&signer.address().to_string()));
        assert_eq!(balance(&ledger, granter.address()), U256::from(1_000_000u64));
    }

    #[test]
    fn test_exhausted_allowance_is_rejected() {
        let ledger = MemoryLedger::shared();
        let signer = TestKey::random();
        let number = account(&ledger, &signer, 0);
        let granter = TestKey::random();
        account(&ledger, &granter, 1_000_000);
        ledger.grant_allowance(
            granter.address(),
            signer.address(),
            Some(Coins::single(TEST_DENOM, 4_999u64)),
        );
        let handler = handler(ledger.keepers());

        let mut tx = granted_tx(&signer, number, granter.address());
        let err = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSigner);
    }

    #[test]
    fn test_disabled_fee_grants_are_distinct() {
        let ledger = MemoryLedger::shared();
        let signer = TestKey::random();
        let number = account(&ledger, &signer, 0);
        let granter = TestKey::random();
        account(&ledger, &granter, 1_000_000);
        ledger.grant_allowance(granter.address(), signer.address(), None);
        let mut keepers = ledger.keepers();
        keepers.fee_grant = None;
        let handler = handler(keepers);

        let mut tx = granted_tx(&signer, number, granter.address());
        let err = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(err.reason().contains("fee grants are not enabled"));
    }
}

mod legacy_eip712 {
    use super::*;

    #[test]
    fn test_wallet_signed_send_is_admitted() {
        let ledger = MemoryLedger::shared();
        let key = TestKey::random();
        let number = account(&ledger, &key, 1_000_000);
        let handler = handler(ledger.keepers());

        let mut tx = NativeTxBuilder::new([send(key.address())])
            .fee(5_000u64, 200_000)
            .sign_eip712(Signer::new(&key, number, 0), TEST_EIP155_CHAIN_ID);
        handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap();

        assert_eq!(balance(&ledger, key.address()), U256::from(995_000u64));
        let stored = ledger.get_account(key.address()).unwrap();
        assert_eq!(stored.sequence, 1);
        assert_eq!(stored.pubkey, Some(key.pubkey()));
    }

    #[test]
    fn test_typed_data_chain_id_must_match() {
        let ledger = MemoryLedger::shared();
        let key = TestKey::random();
        let number = account(&ledger, &key, 1_000_000);
        let handler = handler(ledger.keepers());

        let mut tx = NativeTxBuilder::new([send(key.address())])
            .fee(5_000u64, 200_000)
            .sign_eip712(Signer::new(&key, number, 0), 1);
        let err = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(err.reason().contains("invalid chain-id"));
    }

    #[test]
    fn test_tampered_fee_is_detected() {
        let ledger = MemoryLedger::shared();
        let key = TestKey::random();
        let number = account(&ledger, &key, 1_000_000);
        let handler = handler(ledger.keepers());

        let mut tx = NativeTxBuilder::new([send(key.address())])
            .fee(5_000u64, 200_000)
            .sign_eip712(Signer::new(&key, number, 0), TEST_EIP155_CHAIN_ID);
        tx.auth_info.fee.amount = Coins::single(TEST_DENOM, 4_000u64);
        let err = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_native_signature_must_stay_empty() {
        let ledger = MemoryLedger::shared();
        let key = TestKey::random();
        let number = account(&ledger, &key, 1_000_000);
        let handler = handler(ledger.keepers());

        let mut tx = NativeTxBuilder::new([send(key.address())])
            .fee(5_000u64, 200_000)
            .sign_eip712(Signer::new(&key, number, 0), TEST_EIP155_CHAIN_ID);
        tx.signatures = vec![Bytes::from(vec![1u8; 65])];
        let err = handler
            .handle(context(ExecMode::Deliver), &mut tx, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(err.reason().contains("cosmos transaction signature empty"));
    }

    #[test]
    fn test_web3_option_is_refused_on_native_chain_shape() {
        let ledger = MemoryLedger::shared();
        let key = TestKey::random();
        let number = account(&ledger, &key, 1_000_000);
        let handler = handler(ledger.keepers());

        // a dynamic fee option first routes to the native chain, which
        // refuses the trailing web3 option
        let mut tx = NativeTxBuilder::new([send(key.address())])
            .fee(5_000u64, 200_000)
            .extension_option(ExtensionOption::DynamicFeeTx {
                max_priority_price: U256::from(1u64),
            })
            .extension_option(ExtensionOption::Web3Tx(Web3TxOption {
                typed_data_chain_id: TEST_EIP155_CHAIN_ID,
                fee_payer: key.address(),
                fee_payer_sig: Bytes::new(),
            }))
            .sign(SignMode::Direct, &[Signer::new(&key, number, 0)]);
        let err = handler
            .handle(context(ExecMode::Check), &mut tx, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownExtensionOptions);
    }
}
