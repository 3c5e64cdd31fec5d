// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Arc, time::Duration};

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{
    client::{JsonRpcClient, JsonRpcError},
    common::{mint_event_topic, parse_mint_event, parse_quantity, EthereumServiceError, MintEvent},
};

const MINTED_SO_FAR: &str = "mintedSoFar()";
const MAKE_AN_AWESOME_NFT: &str = "makeAnAwesomeNFT()";

/// The four-byte ABI selector of a zero-argument contract method.
fn selector_data(signature: &str) -> Bytes {
    Bytes::copy_from_slice(&keccak256(signature.as_bytes())[..4])
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<Address>,
    to: Address,
    data: Bytes,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
}

impl TransactionReceipt {
    /// Pre-Byzantium receipts carry no status field; they are treated as
    /// successful.
    fn succeeded(&self) -> bool {
        match self.status.as_deref().map(parse_quantity) {
            None => true,
            Some(Ok(status)) => status == 1,
            Some(Err(_)) => false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    data: Bytes,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    removed: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogFilter {
    address: Address,
    from_block: String,
    topics: Vec<B256>,
}

/// A submitted mint transaction that has not been mined yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingMint {
    pub hash: B256,
}

/// The collection contract as seen through the wallet provider.
pub struct NftContract<P> {
    provider: Arc<P>,
    address: Address,
    receipt_poll_interval: Duration,
}

impl<P> Clone for NftContract<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            address: self.address,
            receipt_poll_interval: self.receipt_poll_interval,
        }
    }
}

impl<P> NftContract<P>
where
    P: JsonRpcClient<Error = EthereumServiceError>,
{
    pub fn new(provider: Arc<P>, address: Address, receipt_poll_interval: Duration) -> Self {
        Self {
            provider,
            address,
            receipt_poll_interval,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Reads the number of tokens minted so far.
    pub async fn minted_so_far(&self, from: Option<Address>) -> Result<u64, EthereumServiceError> {
        let call = CallRequest {
            from,
            to: self.address,
            data: selector_data(MINTED_SO_FAR),
        };
        let answer: Bytes = self.provider.request("eth_call", (call, "latest")).await?;
        if answer.len() != 32 {
            return Err(EthereumServiceError::EthereumParsingError);
        }
        let minted = U256::from_be_slice(&answer);
        u64::try_from(minted).map_err(|_| EthereumServiceError::EthereumParsingError)
    }

    /// Submits a mint transaction on behalf of `from` and returns its handle
    /// as soon as the wallet accepts it. Mining happens later; see
    /// [`Self::await_confirmation`].
    pub async fn mint(&self, from: Address) -> Result<PendingMint, EthereumServiceError> {
        let call = CallRequest {
            from: Some(from),
            to: self.address,
            data: selector_data(MAKE_AN_AWESOME_NFT),
        };
        match self.provider.request("eth_sendTransaction", (call,)).await {
            Ok(hash) => Ok(PendingMint { hash }),
            Err(EthereumServiceError::Provider(JsonRpcError { message, .. })) => {
                Err(EthereumServiceError::MintRejected(message))
            }
            Err(error) => Err(error),
        }
    }

    /// Suspends until the transaction is included in a block. There is no
    /// timeout: mining takes as long as it takes.
    pub async fn await_confirmation(
        &self,
        pending: &PendingMint,
    ) -> Result<TransactionReceipt, EthereumServiceError> {
        loop {
            let receipt: Option<TransactionReceipt> = self
                .provider
                .request("eth_getTransactionReceipt", (pending.hash,))
                .await?;
            if let Some(receipt) = receipt {
                if receipt.succeeded() {
                    return Ok(receipt);
                }
                return Err(EthereumServiceError::ConfirmationFailed(pending.hash));
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }

    /// The current head of the chain, used to anchor event polling.
    pub async fn block_number(&self) -> Result<u64, EthereumServiceError> {
        let quantity: String = self.provider.request("eth_blockNumber", [(); 0]).await?;
        Ok(parse_quantity(&quantity)?)
    }

    /// Returns the mint events the contract emitted from `from_block`
    /// onwards.
    pub async fn mint_events(
        &self,
        from_block: u64,
    ) -> Result<Vec<MintEvent>, EthereumServiceError> {
        let filter = LogFilter {
            address: self.address,
            from_block: format!("0x{:x}", from_block),
            topics: vec![mint_event_topic()],
        };
        let logs: Vec<RpcLog> = self.provider.request("eth_getLogs", (filter,)).await?;
        logs.into_iter()
            .filter(|log| !log.removed)
            .map(|log| {
                let block_number = log
                    .block_number
                    .as_deref()
                    .map(parse_quantity)
                    .transpose()?
                    .unwrap_or_default();
                parse_mint_event(&log.data, block_number)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_selectors_are_distinct_four_byte_prefixes() {
        let minted = selector_data(MINTED_SO_FAR);
        let mint = selector_data(MAKE_AN_AWESOME_NFT);
        assert_eq!(minted.len(), 4);
        assert_eq!(mint.len(), 4);
        assert_ne!(minted, mint);
        assert_eq!(
            minted,
            Bytes::copy_from_slice(&keccak256(b"mintedSoFar()")[..4])
        );
    }

    #[test]
    fn receipt_status_decides_success() {
        let receipt = |status: Option<&str>| TransactionReceipt {
            transaction_hash: B256::ZERO,
            status: status.map(str::to_owned),
            block_number: None,
        };
        assert!(receipt(Some("0x1")).succeeded());
        assert!(!receipt(Some("0x0")).succeeded());
        assert!(receipt(None).succeeded());
        assert!(!receipt(Some("bogus")).succeeded());
    }
}
