//! End-to-end cash-out flow against a mock ledger.

use alloy_consensus::SignableTransaction;
use alloy_primitives::{Address, Bytes, Log, U256, hex};
use alloy_sol_types::SolEvent;
use assert_matches::assert_matches;
use vertex_swarm_chequebook::{
    CashOut, CashOutConfig, CashOutStage, Cheque, ChequeError, ChequeSigner, LedgerClient,
    SignedCheque, build_transaction_skeleton, contract::SimpleSwapDeployed,
    decode_cash_out_call_data, find_deployed_chequebook,
};
use vertex_swarm_test_utils::{
    FailPoint, MockLedger, MockLedgerError, RefusingSigner, test_key, test_signer,
};

const ISSUER: u8 = 0x11;
const BENEFICIARY: u8 = 0x22;

fn chequebook() -> Address {
    Address::repeat_byte(0xcb)
}

fn recipient() -> Address {
    "0xAd4F6Efc6594fE9305bF9A69BAb8bd942aDAECDB".parse().unwrap()
}

fn config() -> CashOutConfig {
    CashOutConfig {
        recipient: Some(recipient()),
        chain_id: Some(100),
        ..Default::default()
    }
}

fn cheque(payout: u64) -> Cheque {
    Cheque::new(chequebook(), test_key(BENEFICIARY).address(), payout)
}

#[tokio::test]
async fn issue_and_cash_to_configured_recipient() {
    let beneficiary = test_key(BENEFICIARY).address();
    let ledger = MockLedger::new()
        .with_nonce(beneficiary, 4)
        .with_fee_price(2_000_000_000);
    let pipeline = CashOut::new(test_signer(&[ISSUER, BENEFICIARY]), ledger, config());

    let issuer = test_key(ISSUER).address();
    let (signed, receipt) = pipeline.issue_and_cash(issuer, cheque(100)).await.unwrap();

    assert!(receipt.succeeded());
    signed.verify(issuer).unwrap();
}

#[tokio::test]
async fn transaction_carries_cash_out_call() {
    let issuer = test_key(ISSUER).address();
    let beneficiary = test_key(BENEFICIARY).address();
    let ledger = MockLedger::new().with_nonce(beneficiary, 4).with_fee_price(7);
    let pipeline = CashOut::new(test_signer(&[ISSUER, BENEFICIARY]), ledger, config());

    let signed = pipeline.sign_cheque(issuer, cheque(100)).await.unwrap();
    let tx = pipeline.prepare(&signed).await.unwrap();

    let legacy = tx.tx();
    assert_eq!(legacy.nonce, 4);
    assert_eq!(legacy.gas_price, 7);
    assert_eq!(legacy.gas_limit, 1_000_000);
    assert_eq!(legacy.value, U256::ZERO);
    assert_eq!(legacy.chain_id, Some(100));
    assert_eq!(legacy.to.to(), Some(&chequebook()));

    // selector, recipient word, payout word, then the dynamic signature
    let input = &legacy.input;
    assert_eq!(&input[..4], &hex!("0d5f2659"));
    assert_eq!(&input[4..16], &[0u8; 12]);
    assert_eq!(&input[16..36], recipient().as_slice());
    assert_eq!(&input[36..68], &U256::from(100u64).to_be_bytes::<32>());
    assert_eq!(&input[68..100], &U256::from(0x60u64).to_be_bytes::<32>());

    let request = decode_cash_out_call_data(input).unwrap();
    assert_eq!(request.recipient, recipient());
    assert_eq!(request.cumulative_payout, 100);
    assert_eq!(&request.issuer_signature, signed.signature());

    // submitted by the beneficiary
    let sender = tx
        .signature()
        .recover_address_from_prehash(&legacy.signature_hash())
        .unwrap();
    assert_eq!(sender, beneficiary);
}

#[tokio::test]
async fn recipient_defaults_to_beneficiary() {
    let issuer = test_key(ISSUER).address();
    let beneficiary = test_key(BENEFICIARY).address();
    let pipeline = CashOut::new(
        test_signer(&[ISSUER, BENEFICIARY]),
        MockLedger::new(),
        CashOutConfig::default(),
    );

    let signed = pipeline.sign_cheque(issuer, cheque(5)).await.unwrap();
    let tx = pipeline.prepare(&signed).await.unwrap();

    let request = decode_cash_out_call_data(&tx.tx().input).unwrap();
    assert_eq!(request.recipient, beneficiary);
    assert_eq!(tx.tx().chain_id, None);
}

#[tokio::test]
async fn mock_ledger_sees_one_submission() {
    let beneficiary = test_key(BENEFICIARY).address();
    let ledger = MockLedger::new();
    let signer = test_signer(&[ISSUER, BENEFICIARY]);

    let pipeline = CashOut::new(&signer, &ledger, config());
    pipeline
        .issue_and_cash(test_key(ISSUER).address(), cheque(1))
        .await
        .unwrap();

    assert_eq!(ledger.nonce_queries(), vec![beneficiary]);
    assert_eq!(ledger.submitted().len(), 1);
}

#[tokio::test]
async fn lower_payout_is_still_submitted() {
    let ledger = MockLedger::new();
    let signer = test_signer(&[ISSUER, BENEFICIARY]);
    let pipeline = CashOut::new(&signer, &ledger, config());
    let issuer = test_key(ISSUER).address();

    pipeline.issue_and_cash(issuer, cheque(500)).await.unwrap();
    pipeline.issue_and_cash(issuer, cheque(100)).await.unwrap();

    assert_eq!(ledger.submitted().len(), 2);
}

#[tokio::test]
async fn revert_is_reported_with_receipt() {
    let ledger = MockLedger::new().reverting();
    let signer = test_signer(&[ISSUER, BENEFICIARY]);
    let pipeline = CashOut::new(&signer, &ledger, config());

    let err = pipeline
        .issue_and_cash(test_key(ISSUER).address(), cheque(100))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(CashOutStage::Mined));
    assert_matches!(
        err,
        ChequeError::CashOutReverted { chequebook: cb, cumulative_payout: 100, receipt }
            if cb == chequebook() && !receipt.status && receipt.tx_hash == *ledger.submitted()[0].hash()
    );
}

#[tokio::test]
async fn ledger_failures_carry_their_stage() {
    let cases = [
        (FailPoint::PendingNonce, CashOutStage::TransactionBuilt),
        (FailPoint::FeePrice, CashOutStage::TransactionBuilt),
        (FailPoint::Send, CashOutStage::Submitted),
        (FailPoint::WaitMined, CashOutStage::Mined),
    ];

    for (point, expected) in cases {
        let ledger = MockLedger::new().failing_at(point);
        let pipeline = CashOut::new(test_signer(&[ISSUER, BENEFICIARY]), ledger, config());

        let err = pipeline
            .issue_and_cash(test_key(ISSUER).address(), cheque(100))
            .await
            .unwrap_err();

        assert_matches!(
            &err,
            ChequeError::UpstreamQuery { stage, source }
                if *stage == expected
                    && source.downcast_ref::<MockLedgerError>().map(|e| e.0) == Some(point)
        );
    }
}

#[tokio::test]
async fn refused_signature_is_rejected() {
    let ledger = MockLedger::new();
    let pipeline = CashOut::new(RefusingSigner, &ledger, config());

    let err = pipeline
        .sign_cheque(test_key(ISSUER).address(), cheque(100))
        .await
        .unwrap_err();

    assert_matches!(err, ChequeError::SignatureRejected { stage: CashOutStage::Signed, .. });
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn issuer_without_key_is_rejected() {
    let pipeline = CashOut::new(test_signer(&[BENEFICIARY]), MockLedger::new(), config());

    let err = pipeline
        .sign_cheque(test_key(ISSUER).address(), cheque(100))
        .await
        .unwrap_err();

    assert_matches!(err, ChequeError::SignatureRejected { stage: CashOutStage::Signed, .. });
}

#[tokio::test]
async fn beneficiary_without_key_cannot_submit() {
    let signer = test_signer(&[ISSUER]);
    let ledger = MockLedger::new();
    let pipeline = CashOut::new(&signer, &ledger, config());

    let signed = pipeline
        .sign_cheque(test_key(ISSUER).address(), cheque(100))
        .await
        .unwrap();
    let err = pipeline.cash(&signed).await.unwrap_err();

    assert_matches!(
        err,
        ChequeError::SignatureRejected { stage: CashOutStage::TransactionBuilt, .. }
    );
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn malformed_signature_never_reaches_ledger() {
    let ledger = MockLedger::new();
    let pipeline = CashOut::new(test_signer(&[BENEFICIARY]), &ledger, config());

    let signed = SignedCheque::new(cheque(100), Bytes::from(vec![0u8; 10]));
    let err = pipeline.cash(&signed).await.unwrap_err();

    assert_matches!(err, ChequeError::SignatureRejected { stage: CashOutStage::Signed, .. });
    assert!(ledger.nonce_queries().is_empty());
}

#[tokio::test]
async fn cheque_from_deployment_receipt() {
    let factory = Address::repeat_byte(0xfa);
    let issuer = test_key(ISSUER).address();
    let ledger = MockLedger::new().with_logs(vec![Log {
        address: factory,
        data: SimpleSwapDeployed {
            contractAddress: chequebook(),
        }
        .encode_log_data(),
    }]);
    let signer = test_signer(&[ISSUER, BENEFICIARY]);
    assert_eq!(signer.identities().len(), 2);

    // issuer deploys through the factory and reads the address off the receipt
    let deploy = signer
        .sign_transaction(
            issuer,
            build_transaction_skeleton(Bytes::new(), factory, 0, 1),
            None,
        )
        .await
        .unwrap();
    let tx_ref = ledger.send_transaction(deploy).await.unwrap();
    let receipt = ledger.wait_mined(tx_ref).await.unwrap();

    let deployed = find_deployed_chequebook(factory, &receipt.logs).unwrap();
    assert_eq!(deployed, chequebook());

    let pipeline = CashOut::new(&signer, &ledger, config());
    let cheque = Cheque::new(deployed, test_key(BENEFICIARY).address(), 100);
    pipeline.issue_and_cash(issuer, cheque).await.unwrap();

    assert_eq!(ledger.submitted().len(), 2);
}
