// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use alloy_primitives::Address;
use async_lock::Mutex;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use url::Url;

use crate::{
    client::{JsonRpcClient, JsonRpcError},
    common::{ChainId, EthereumServiceError},
};

/// EIP-1193 code for a request the user rejected.
pub const CODE_USER_REJECTED: i64 = 4001;
/// EIP-3326 code for a chain the wallet has no configuration for.
pub const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

/// The wallet provider endpoint used for accessing the user's wallet.
pub struct HttpWalletProvider {
    pub url: Url,
    pub id: Mutex<u64>,
}

#[async_trait]
impl JsonRpcClient for HttpWalletProvider {
    type Error = EthereumServiceError;

    async fn get_id(&self) -> u64 {
        let mut id = self.id.lock().await;
        *id += 1;
        *id
    }

    async fn request_inner(&self, payload: Vec<u8>) -> Result<Vec<u8>, Self::Error> {
        // No request timeout: a wallet prompt stays open until the user
        // answers it, however long that takes.
        let response = reqwest::Client::new()
            .post(self.url.clone())
            .body(payload)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let body = response.bytes().await?;
        Ok(body.as_ref().to_vec())
    }
}

impl HttpWalletProvider {
    /// Connects to the wallet provider listening at `url`.
    pub fn new(url: Url) -> Self {
        let id = Mutex::new(0);
        Self { url, id }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchChainParams {
    chain_id: ChainId,
}

/// Entry point to the user's wallet. The inner provider is optional: an
/// absent provider models a browser without any wallet extension installed.
pub struct WalletGateway<P> {
    provider: Option<Arc<P>>,
}

impl<P> WalletGateway<P> {
    pub fn new(provider: Option<Arc<P>>) -> Self {
        Self { provider }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Result<&Arc<P>, EthereumServiceError> {
        self.provider
            .as_ref()
            .ok_or(EthereumServiceError::ProviderUnavailable)
    }
}

impl<P> WalletGateway<P>
where
    P: JsonRpcClient<Error = EthereumServiceError>,
{
    /// Returns the accounts the wallet has already authorized for this page,
    /// without prompting. Without a provider there is nothing to ask: the
    /// result is empty.
    pub async fn get_accounts(&self) -> Result<Vec<Address>, EthereumServiceError> {
        let Some(provider) = &self.provider else {
            return Ok(Vec::new());
        };
        provider.request("eth_accounts", [(); 0]).await
    }

    /// Opens the wallet's connection prompt and returns the authorized
    /// accounts.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, EthereumServiceError> {
        let provider = self.provider()?;
        match provider.request("eth_requestAccounts", [(); 0]).await {
            Err(EthereumServiceError::Provider(JsonRpcError { code, .. }))
                if code == CODE_USER_REJECTED =>
            {
                Err(EthereumServiceError::UserRejected)
            }
            other => other,
        }
    }

    /// Returns the identifier of the chain the wallet is currently pointed
    /// at.
    pub async fn get_chain_id(&self) -> Result<ChainId, EthereumServiceError> {
        let provider = self.provider()?;
        let quantity: String = provider.request("eth_chainId", [(); 0]).await?;
        Ok(quantity.parse()?)
    }

    /// Asks the wallet to switch to the `target` chain.
    pub async fn switch_chain(&self, target: ChainId) -> Result<(), EthereumServiceError> {
        let provider = self.provider()?;
        let params = (SwitchChainParams { chain_id: target },);
        let result: Result<Option<serde_json::Value>, _> =
            provider.request("wallet_switchEthereumChain", params).await;
        match result {
            Ok(_) => Ok(()),
            Err(EthereumServiceError::Provider(JsonRpcError { code, .. }))
                if code == CODE_UNRECOGNIZED_CHAIN =>
            {
                Err(EthereumServiceError::SwitchUnsupported(target))
            }
            Err(EthereumServiceError::Provider(_)) => Err(EthereumServiceError::SwitchRejected),
            Err(error) => Err(error),
        }
    }
}
