// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Arc, time::Duration};

use alloy_primitives::{address, b256, Address};
use awesome_nft_ethereum::{
    common::{EthereumServiceError, MintEvent},
    contract::NftContract,
    test_utils::{mint_event_data, uint_word, MockProvider},
};
use serde_json::json;

const CONTRACT: Address = address!("a560c9c9A3646e5209eE5B1d9BAc98D724606D6e");
const MINTER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

fn contract(provider: &Arc<MockProvider>) -> NftContract<MockProvider> {
    NftContract::new(provider.clone(), CONTRACT, Duration::from_millis(1))
}

#[tokio::test]
async fn minted_so_far_decodes_the_return_word() -> anyhow::Result<()> {
    let provider = Arc::new(MockProvider::new());
    provider.script_result("eth_call", json!(uint_word(17)));
    let contract = contract(&provider);

    let minted = contract.minted_so_far(Some(MINTER)).await?;
    assert_eq!(minted, 17);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "eth_call");
    let call = &requests[0].params[0];
    assert_eq!(call["to"], json!(CONTRACT));
    assert_eq!(call["from"], json!(MINTER));
    // a zero-argument method call is just the four-byte selector
    assert_eq!(call["data"].as_str().unwrap().len(), 2 + 8);
    assert_eq!(requests[0].params[1], json!("latest"));
    Ok(())
}

#[tokio::test]
async fn truncated_call_answers_are_rejected() {
    let provider = Arc::new(MockProvider::new());
    provider.script_result("eth_call", json!("0x17"));
    let contract = contract(&provider);

    assert!(matches!(
        contract.minted_so_far(None).await,
        Err(EthereumServiceError::EthereumParsingError)
    ));
}

#[tokio::test]
async fn mint_returns_the_transaction_handle() -> anyhow::Result<()> {
    let hash = b256!("1111111111111111111111111111111111111111111111111111111111111111");
    let provider = Arc::new(MockProvider::new());
    provider.script_result("eth_sendTransaction", json!(hash));
    let contract = contract(&provider);

    let pending = contract.mint(MINTER).await?;
    assert_eq!(pending.hash, hash);

    let requests = provider.requests();
    assert_eq!(requests[0].method, "eth_sendTransaction");
    assert_eq!(requests[0].params[0]["from"], json!(MINTER));
    Ok(())
}

#[tokio::test]
async fn declined_submission_is_mint_rejected() {
    let provider = Arc::new(MockProvider::new());
    provider.script_error("eth_sendTransaction", 4001, "User denied transaction.");
    let contract = contract(&provider);

    match contract.mint(MINTER).await {
        Err(EthereumServiceError::MintRejected(message)) => {
            assert_eq!(message, "User denied transaction.");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn confirmation_polls_until_the_receipt_appears() -> anyhow::Result<()> {
    let hash = b256!("2222222222222222222222222222222222222222222222222222222222222222");
    let provider = Arc::new(MockProvider::new());
    provider.script_result("eth_sendTransaction", json!(hash));
    provider.script_result("eth_getTransactionReceipt", json!(null));
    provider.script_result("eth_getTransactionReceipt", json!(null));
    provider.script_result(
        "eth_getTransactionReceipt",
        json!({ "transactionHash": hash, "status": "0x1", "blockNumber": "0x10" }),
    );
    let contract = contract(&provider);

    let pending = contract.mint(MINTER).await?;
    let receipt = contract.await_confirmation(&pending).await?;
    assert_eq!(receipt.transaction_hash, hash);
    assert_eq!(provider.request_count("eth_getTransactionReceipt"), 3);
    Ok(())
}

#[tokio::test]
async fn reverted_transactions_fail_confirmation() {
    let hash = b256!("3333333333333333333333333333333333333333333333333333333333333333");
    let provider = Arc::new(MockProvider::new());
    provider.script_result(
        "eth_getTransactionReceipt",
        json!({ "transactionHash": hash, "status": "0x0" }),
    );
    let contract = contract(&provider);

    let pending = awesome_nft_ethereum::contract::PendingMint { hash };
    assert!(matches!(
        contract.await_confirmation(&pending).await,
        Err(EthereumServiceError::ConfirmationFailed(failed)) if failed == hash
    ));
}

#[tokio::test]
async fn mint_events_are_filtered_and_decoded() -> anyhow::Result<()> {
    let provider = Arc::new(MockProvider::new());
    provider.script_result(
        "eth_getLogs",
        json!([
            {
                "data": mint_event_data(MINTER, 5),
                "blockNumber": "0x20",
                "removed": false,
            },
            {
                // a log reorged away must not surface
                "data": mint_event_data(MINTER, 6),
                "blockNumber": "0x21",
                "removed": true,
            },
        ]),
    );
    let contract = contract(&provider);

    let events = contract.mint_events(0x1f).await?;
    assert_eq!(
        events,
        [MintEvent {
            minter: MINTER,
            token_id: 5,
            block_number: 0x20,
        }]
    );

    let requests = provider.requests();
    let filter = &requests[0].params[0];
    assert_eq!(filter["address"], json!(CONTRACT));
    assert_eq!(filter["fromBlock"], json!("0x1f"));
    assert_eq!(filter["topics"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn block_number_is_a_quantity() -> anyhow::Result<()> {
    let provider = Arc::new(MockProvider::new());
    provider.script_result("eth_blockNumber", json!("0x2a"));
    let contract = contract(&provider);
    assert_eq!(contract.block_number().await?, 42);
    Ok(())
}
