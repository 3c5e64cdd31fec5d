// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This crate provides functionalities for accessing a user's Ethereum wallet
//! provider and the Awesome NFT collection contract behind it.

pub mod client;
pub mod common;
pub mod contract;
pub mod provider;

/// Helper types for tests.
pub mod test_utils;
