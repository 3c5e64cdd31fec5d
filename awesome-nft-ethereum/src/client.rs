// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::common::EthereumQueryError;

pub const JSON_RPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: T,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: u64,
    #[serde(default)]
    result: Option<Box<RawValue>>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// The error object of a JSON-RPC 2.0 response. Wallet providers use
/// well-known codes to signal user decisions, e.g. 4001 for a rejected
/// prompt.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// A client for requests made against a JSON-RPC 2.0 endpoint. Both the
/// injected wallet provider and the node behind it speak this protocol, so
/// the wallet gateway and the contract client are built on the same trait.
#[async_trait]
pub trait JsonRpcClient: Send + Sync {
    type Error: From<serde_json::Error> + From<EthereumQueryError> + From<JsonRpcError> + Send;

    /// Returns a fresh id for the next request.
    async fn get_id(&self) -> u64;

    /// Sends the serialized request envelope and returns the raw response
    /// bytes.
    async fn request_inner(&self, payload: Vec<u8>) -> Result<Vec<u8>, Self::Error>;

    /// Sends a typed request and decodes the typed response. The response is
    /// checked against the request id and the protocol version; an error
    /// object from the provider is surfaced with its code and message.
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let id = self.get_id().await;
        let payload = serde_json::to_vec(&JsonRpcRequest {
            jsonrpc: JSON_RPC_VERSION,
            id,
            method,
            params,
        })?;
        let body = self.request_inner(payload).await?;
        let response: JsonRpcResponse = serde_json::from_slice(&body)?;
        if response.jsonrpc != JSON_RPC_VERSION {
            return Err(EthereumQueryError::WrongJsonRpcVersion.into());
        }
        if response.id != id {
            return Err(EthereumQueryError::IdIsNotMatching.into());
        }
        if let Some(error) = response.error {
            return Err(error.into());
        }
        // An absent `result` is decoded as JSON `null`, which several node
        // methods legitimately return (e.g. a receipt that is not yet mined).
        let result = response.result.as_deref().map_or("null", RawValue::get);
        Ok(serde_json::from_str(result)?)
    }
}
