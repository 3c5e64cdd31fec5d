// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, num::ParseIntError, str::FromStr};

use alloy_primitives::{keccak256, Address, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::JsonRpcError;

#[derive(Debug, Error)]
pub enum EthereumQueryError {
    /// The response id should match the request id
    #[error("the response id should match the request id")]
    IdIsNotMatching,

    /// wrong jsonrpc version
    #[error("wrong jsonrpc version")]
    WrongJsonRpcVersion,
}

#[derive(Debug, Error)]
pub enum EthereumServiceError {
    #[error(transparent)]
    EthereumQueryError(#[from] EthereumQueryError),

    /// No wallet provider was configured
    #[error("no wallet provider is available")]
    ProviderUnavailable,

    /// The user declined the connection prompt
    #[error("the user rejected the connection request")]
    UserRejected,

    /// The wallet declined to switch chains
    #[error("the wallet rejected the chain switch")]
    SwitchRejected,

    /// The target chain is not registered with the wallet
    #[error("chain {0} is not known to the wallet")]
    SwitchUnsupported(ChainId),

    /// The mint transaction was declined at submission
    #[error("mint transaction was not accepted: {0}")]
    MintRejected(String),

    /// The mint transaction was mined but reverted
    #[error("transaction {0} was reverted or dropped")]
    ConfirmationFailed(B256),

    /// The provider answered with a JSON-RPC error object
    #[error("provider returned error {}: {}", .0.code, .0.message)]
    Provider(JsonRpcError),

    /// Event parsing error
    #[error("event parsing error")]
    EventParsingError,

    /// Ethereum parsing error
    #[error("Ethereum parsing error")]
    EthereumParsingError,

    /// Parsing error
    #[error(transparent)]
    ParseIntError(#[from] ParseIntError),

    /// `serde_json` error
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Hex parsing error
    #[error(transparent)]
    FromHexError(#[from] alloy_primitives::hex::FromHexError),

    /// URL parsing error
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    /// Reqwest error
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
}

impl From<JsonRpcError> for EthereumServiceError {
    fn from(error: JsonRpcError) -> Self {
        Self::Provider(error)
    }
}

/// Identifier of the network a wallet is currently pointed at, exchanged on
/// the wire as a `0x`-prefixed hexadecimal quantity (e.g. `"0x4"`).
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ChainId(parse_quantity(s)?))
    }
}

impl Serialize for ChainId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let quantity = String::deserialize(deserializer)?;
        quantity.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a `0x`-prefixed hexadecimal quantity. A missing prefix is accepted
/// and treated as hexadecimal as well.
pub fn parse_quantity(quantity: &str) -> Result<u64, ParseIntError> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .unwrap_or(quantity);
    u64::from_str_radix(digits, 16)
}

/// Solidity signature of the collection contract's mint notification.
pub const MINT_EVENT_SIGNATURE: &str = "NewAwesomeNFTMinted(address,uint256)";

/// The topic under which the collection contract logs its mint events.
pub fn mint_event_topic() -> B256 {
    keccak256(MINT_EVENT_SIGNATURE.as_bytes())
}

/// A mint event emitted by the collection contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEvent {
    /// The address the token was minted to.
    pub minter: Address,
    /// The token's index in the collection.
    pub token_id: u64,
    pub block_number: u64,
}

/// Decodes the data words of a `NewAwesomeNFTMinted(address,uint256)` log.
/// Neither entry is indexed, so both arrive as consecutive 32-byte words.
pub fn parse_mint_event(
    data: &[u8],
    block_number: u64,
) -> Result<MintEvent, EthereumServiceError> {
    if data.len() != 64 {
        return Err(EthereumServiceError::EventParsingError);
    }
    let minter = Address::from_word(B256::from_slice(&data[..32]));
    let token_id = U256::from_be_slice(&data[32..]);
    let token_id =
        u64::try_from(token_id).map_err(|_| EthereumServiceError::EventParsingError)?;
    Ok(MintEvent {
        minter,
        token_id,
        block_number,
    })
}
