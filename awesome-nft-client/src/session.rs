// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::Address;
use awesome_nft_ethereum::common::ChainId;
use tracing::debug;

/// Connection lifecycle of the wallet session.
///
/// There is deliberately no disconnected terminal state: the page never
/// observes the wallet going away, it only ever learns about accounts and
/// chains when it asks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    /// An account is connected but the wallet points at another chain; the
    /// mint action is blocked until a switch succeeds.
    WrongChain { account: Address, chain_id: ChainId },
    RightChain { account: Address },
}

impl SessionState {
    pub fn account(&self) -> Option<Address> {
        match self {
            SessionState::Disconnected | SessionState::Connecting => None,
            SessionState::WrongChain { account, .. } | SessionState::RightChain { account } => {
                Some(*account)
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account().is_some()
    }

    /// Whether the mint action may be offered.
    pub fn may_mint(&self) -> bool {
        matches!(self, SessionState::RightChain { .. })
    }

    /// Enters `Connecting` from `Disconnected`; connected states are left
    /// untouched so a re-check does not drop an established session.
    pub fn begin_connecting(&mut self) {
        if matches!(self, SessionState::Disconnected) {
            *self = SessionState::Connecting;
        }
    }

    /// Leaves `Connecting` once an account and its chain are known,
    /// classifying the session by comparing against the `target` chain.
    /// Also reclassifies an already connected session after a fresh chain
    /// read.
    pub fn connected(&mut self, account: Address, chain_id: ChainId, target: ChainId) {
        let next = if chain_id == target {
            SessionState::RightChain { account }
        } else {
            SessionState::WrongChain { account, chain_id }
        };
        debug!(?next, "session state transition");
        *self = next;
    }

    /// Records a successful chain switch.
    pub fn chain_switched(&mut self, target: ChainId) {
        if let SessionState::WrongChain { account, .. } = self {
            *self = SessionState::RightChain { account: *account };
            debug!(chain_id = %target, "switched to the target chain");
        }
    }

    /// Abandons a connection attempt that did not produce an account.
    pub fn connection_failed(&mut self) {
        if matches!(self, SessionState::Connecting) {
            *self = SessionState::Disconnected;
        }
    }
}
