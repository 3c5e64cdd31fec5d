// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Arc, time::Duration};

use alloy_primitives::{address, Address};
use awesome_nft_client::listener;
use awesome_nft_ethereum::{
    contract::NftContract,
    test_utils::{mint_event_data, MockProvider},
};
use serde_json::json;
use tokio::sync::mpsc;

const CONTRACT: Address = address!("a560c9c9A3646e5209eE5B1d9BAc98D724606D6e");
const MINTER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

#[test_log::test(tokio::test)]
async fn events_are_delivered_once_and_the_cursor_advances() {
    let provider = Arc::new(MockProvider::new());
    provider.script_result(
        "eth_getLogs",
        json!([{ "data": mint_event_data(MINTER, 5), "blockNumber": "0x20" }]),
    );
    provider.script_default("eth_getLogs", json!([]));
    let contract = NftContract::new(provider.clone(), CONTRACT, Duration::from_millis(1));

    let (sender, mut receiver) = mpsc::unbounded_channel();
    let subscription = listener::subscribe(contract, 0x10, Duration::from_millis(5), sender);

    let event = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("an event should arrive")
        .expect("the channel should stay open");
    assert_eq!(event.minter, MINTER);
    assert_eq!(event.token_id, 5);
    assert_eq!(event.block_number, 0x20);

    // give the listener a few more polling rounds: the same event must not
    // be delivered again
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(receiver.try_recv().is_err());

    let last_filter = provider
        .requests()
        .into_iter()
        .filter(|request| request.method == "eth_getLogs")
        .next_back()
        .expect("the listener polled at least once");
    assert_eq!(last_filter.params[0]["fromBlock"], json!("0x21"));

    // dropping the subscription aborts the polling task, which closes the
    // channel
    drop(subscription);
    let closed = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await;
    assert!(matches!(closed, Ok(None)));
}
