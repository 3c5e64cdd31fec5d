// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use awesome_nft_ethereum::common::EthereumServiceError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ethereum service error: {0}")]
    Ethereum(#[from] EthereumServiceError),
    #[error("no account is connected")]
    NotConnected,
    #[error("the wallet authorized no account")]
    NoAccountAuthorized,
    #[error("a mint transaction is already pending")]
    MintAlreadyPending,
    #[error("the wallet is not on the target chain")]
    WrongChain,
}
