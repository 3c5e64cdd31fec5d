// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use awesome_nft_ethereum::{
    client::JsonRpcClient,
    common::{EthereumServiceError, MintEvent},
    contract::NftContract,
};
use tokio::{sync::mpsc::UnboundedSender, task::AbortHandle};
use tracing::{trace, warn};

/// Handle to a running mint-event subscription. Dropping it aborts the
/// polling task, so a listener cannot outlive the view that created it.
pub struct EventSubscription {
    abort: AbortHandle,
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Polls the contract for mint events from `start_block` onwards and forwards
/// them over `sender`. The polling cursor advances past every delivered
/// event's block, so an event is delivered at most once.
pub fn subscribe<P>(
    contract: NftContract<P>,
    start_block: u64,
    interval: Duration,
    sender: UnboundedSender<MintEvent>,
) -> EventSubscription
where
    P: JsonRpcClient<Error = EthereumServiceError> + 'static,
{
    let handle = tokio::spawn(async move {
        let mut cursor = start_block;
        loop {
            match contract.mint_events(cursor).await {
                Ok(events) => {
                    for event in events {
                        cursor = cursor.max(event.block_number + 1);
                        trace!(token_id = event.token_id, "forwarding mint event");
                        if sender.send(event).is_err() {
                            // the receiving side is gone, stop polling
                            return;
                        }
                    }
                }
                Err(error) => warn!(%error, "failed to poll for mint events"),
            }
            tokio::time::sleep(interval).await;
        }
    });
    EventSubscription {
        abort: handle.abort_handle(),
    }
}
