// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use alloy_primitives::{hex, Address};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{client::JsonRpcClient, common::EthereumServiceError};

/// A scripted response the mock provider will hand out for one request.
#[derive(Clone, Debug)]
pub enum ScriptedResponse {
    Result(Value),
    Error { code: i64, message: String },
}

/// One request as the mock provider saw it on the wire.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub params: Value,
}

/// A wallet provider whose answers are scripted by the test. Responses are
/// queued per method and consumed in order; a sticky default per method
/// serves methods that are polled repeatedly. Every request is recorded so
/// tests can assert on what was (or was not) sent.
#[derive(Default)]
pub struct MockProvider {
    id: Mutex<u64>,
    responses: Mutex<HashMap<String, VecDeque<ScriptedResponse>>>,
    defaults: Mutex<HashMap<String, ScriptedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` as the answer to the next `method` request.
    pub fn script(&self, method: &str, response: ScriptedResponse) {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_owned())
            .or_default()
            .push_back(response);
    }

    pub fn script_result(&self, method: &str, value: Value) {
        self.script(method, ScriptedResponse::Result(value));
    }

    pub fn script_error(&self, method: &str, code: i64, message: &str) {
        self.script(
            method,
            ScriptedResponse::Error {
                code,
                message: message.to_owned(),
            },
        );
    }

    /// Serves `value` whenever the queue for `method` is empty.
    pub fn script_default(&self, method: &str, value: Value) {
        self.defaults
            .lock()
            .unwrap()
            .insert(method.to_owned(), ScriptedResponse::Result(value));
    }

    /// All requests recorded so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// How many times `method` was requested.
    pub fn request_count(&self, method: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.method == method)
            .count()
    }

    fn next_response(&self, method: &str) -> Option<ScriptedResponse> {
        let scripted = self
            .responses
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front);
        scripted.or_else(|| self.defaults.lock().unwrap().get(method).cloned())
    }
}

#[async_trait]
impl JsonRpcClient for MockProvider {
    type Error = EthereumServiceError;

    async fn get_id(&self) -> u64 {
        let mut id = self.id.lock().unwrap();
        *id += 1;
        *id
    }

    async fn request_inner(&self, payload: Vec<u8>) -> Result<Vec<u8>, Self::Error> {
        let request: Value = serde_json::from_slice(&payload)?;
        let method = request["method"].as_str().unwrap_or_default().to_owned();
        let id = request["id"].clone();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.clone(),
            params: request["params"].clone(),
        });
        let response = match self.next_response(&method) {
            Some(ScriptedResponse::Result(value)) => {
                json!({ "jsonrpc": "2.0", "id": id, "result": value })
            }
            Some(ScriptedResponse::Error { code, message }) => {
                json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
            }
            None => panic!("no scripted response for method {method}"),
        };
        Ok(serde_json::to_vec(&response)?)
    }
}

/// Encodes a `u64` as a 32-byte ABI return word, as `eth_call` answers it.
pub fn uint_word(value: u64) -> String {
    format!("0x{:064x}", value)
}

/// Encodes the data words of a mint event log for `minter` and `token_id`.
pub fn mint_event_data(minter: Address, token_id: u64) -> String {
    format!("0x{:0>64}{:064x}", hex::encode(minter.as_slice()), token_id)
}
