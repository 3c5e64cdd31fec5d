// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use alloy_primitives::{address, Address, B256};
use awesome_nft_ethereum::common::ChainId;
use serde::{Deserialize, Serialize};
use url::Url;

/// Everything the front-end is wired to at startup. No hidden globals: the
/// configuration is injected into the wallet gateway and the contract client
/// when the front-end is built.
#[derive(Clone, Debug, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DappConfig {
    /// JSON-RPC endpoint of the wallet provider. Leaving this unset models a
    /// browser without any wallet extension installed.
    #[arg(long, env = "AWESOME_NFT_PROVIDER_URL")]
    pub provider_url: Option<Url>,

    /// Address the collection contract is deployed at.
    #[arg(
        long,
        default_value = "0xa560c9c9A3646e5209eE5B1d9BAc98D724606D6e",
        env = "AWESOME_NFT_CONTRACT_ADDRESS"
    )]
    pub contract_address: Address,

    /// The chain the collection lives on, as a hexadecimal quantity.
    #[arg(long, default_value = "0x4", env = "AWESOME_NFT_CHAIN_ID")]
    pub target_chain_id: ChainId,

    /// Human-readable name of the target chain, used in notices.
    #[arg(long, default_value = "Rinkeby")]
    pub chain_name: String,

    /// Base URL of the block explorer transactions are linked to.
    #[arg(long, default_value = "https://rinkeby.etherscan.io")]
    pub explorer_url: String,

    /// Base URL of the marketplace minted tokens are linked to.
    #[arg(long, default_value = "https://testnets.opensea.io")]
    pub marketplace_url: String,

    /// Marketplace page of the whole collection.
    #[arg(
        long,
        default_value = "https://testnets.opensea.io/collection/3-awesome-words-v2"
    )]
    pub collection_url: String,

    /// Total number of tokens the collection can hold.
    #[arg(long, default_value = "50")]
    pub collection_size: u64,

    /// How often to poll for the receipt of a submitted transaction.
    #[arg(long, default_value = "1000")]
    pub receipt_poll_ms: u64,

    /// How often to poll the contract for new mint events.
    #[arg(long, default_value = "2000")]
    pub event_poll_ms: u64,
}

impl Default for DappConfig {
    fn default() -> Self {
        Self {
            provider_url: None,
            contract_address: address!("a560c9c9A3646e5209eE5B1d9BAc98D724606D6e"),
            target_chain_id: ChainId(4),
            chain_name: "Rinkeby".to_owned(),
            explorer_url: "https://rinkeby.etherscan.io".to_owned(),
            marketplace_url: "https://testnets.opensea.io".to_owned(),
            collection_url: "https://testnets.opensea.io/collection/3-awesome-words-v2".to_owned(),
            collection_size: 50,
            receipt_poll_ms: 1000,
            event_poll_ms: 2000,
        }
    }
}

impl DappConfig {
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn event_poll_interval(&self) -> Duration {
        Duration::from_millis(self.event_poll_ms)
    }

    /// Block-explorer page of a transaction.
    pub fn transaction_url(&self, hash: B256) -> String {
        format!("{}/tx/{}", self.explorer_url, hash)
    }

    /// Marketplace page of a minted token.
    pub fn asset_url(&self, token_id: u64) -> String {
        format!(
            "{}/assets/{}/{}",
            self.marketplace_url, self.contract_address, token_id
        )
    }
}
