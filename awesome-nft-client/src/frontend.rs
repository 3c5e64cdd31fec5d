// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The action layer behind the page: everything a button press or the
//! page-load check may trigger, and the view state it leaves behind.

use alloy_primitives::{Address, B256};
use awesome_nft_ethereum::{
    client::JsonRpcClient,
    common::{EthereumServiceError, MintEvent},
    contract::NftContract,
    provider::WalletGateway,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::{
    config::DappConfig,
    listener::{self, EventSubscription},
    notifier::{NoticeEvent, Notifier},
    session::SessionState,
    Error,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Mined,
    Failed,
}

/// The one transaction the page tracks. There is no queue: a new mint is
/// refused while this record is pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    pub hash: B256,
    pub status: TransactionStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintedToken {
    pub token_id: u64,
}

/// What the page renders from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub minted: u64,
    pub last_transaction: Option<TransactionRecord>,
    pub minted_token: Option<MintedToken>,
}

/// The front-end: wallet gateway, contract access, session and view state,
/// and the notices they produce. Actions are `&mut self` and run to
/// completion one at a time; the mint-event listener is the only concurrent
/// piece and only communicates through the event channel returned by
/// [`Frontend::new`].
pub struct Frontend<P> {
    config: DappConfig,
    gateway: WalletGateway<P>,
    notifier: Notifier,
    session: SessionState,
    view: ViewState,
    subscription: Option<EventSubscription>,
    event_sender: UnboundedSender<MintEvent>,
}

impl<P> Frontend<P>
where
    P: JsonRpcClient<Error = EthereumServiceError> + 'static,
{
    /// Builds the front-end and hands back the channels the presentation
    /// layer renders from: one for notices, one for mint events observed by
    /// the listener.
    pub fn new(
        config: DappConfig,
        gateway: WalletGateway<P>,
    ) -> (
        Self,
        UnboundedReceiver<NoticeEvent>,
        UnboundedReceiver<MintEvent>,
    ) {
        let (notifier, notices) = Notifier::new();
        let (event_sender, events) = mpsc::unbounded_channel();
        let frontend = Frontend {
            config,
            gateway,
            notifier,
            session: SessionState::default(),
            view: ViewState::default(),
            subscription: None,
            event_sender,
        };
        (frontend, notices, events)
    }

    pub fn config(&self) -> &DappConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn account(&self) -> Option<Address> {
        self.session.account()
    }

    fn contract(&self) -> Result<NftContract<P>, Error> {
        let provider = self.gateway.provider()?;
        Ok(NftContract::new(
            provider.clone(),
            self.config.contract_address,
            self.config.receipt_poll_interval(),
        ))
    }

    /// The page-load check: adopts a pre-authorized account without ever
    /// prompting. Finding no provider or no account is not an error, the
    /// page just stays disconnected.
    pub async fn check_existing_session(&mut self) -> Result<(), Error> {
        if !self.gateway.has_provider() {
            info!("no wallet provider is available");
            return Ok(());
        }
        let accounts = self.gateway.get_accounts().await?;
        let Some(account) = accounts.first().copied() else {
            info!("no pre-authorized account found");
            return Ok(());
        };
        info!(%account, "found a pre-authorized account");
        self.notifier.success_for(format!("Connected with {account}"));
        self.adopt_account(account).await
    }

    /// Opens the wallet's connection prompt and adopts the authorized
    /// account.
    pub async fn connect_wallet(&mut self) -> Result<(), Error> {
        if !self.gateway.has_provider() {
            self.notifier.error_for("Please install a wallet to connect!");
            return Err(Error::Ethereum(EthereumServiceError::ProviderUnavailable));
        }
        self.session.begin_connecting();
        let notice = self.notifier.loading("Connecting wallet...");
        match self.gateway.request_accounts().await {
            Ok(accounts) => {
                let Some(account) = accounts.first().copied() else {
                    self.session.connection_failed();
                    self.notifier.error(notice, "Failed to connect wallet.");
                    return Err(Error::NoAccountAuthorized);
                };
                info!(%account, "wallet connected");
                self.notifier.success(notice, "Nice! Wallet connected!");
                self.adopt_account(account).await
            }
            Err(EthereumServiceError::UserRejected) => {
                self.session.connection_failed();
                self.notifier.error(notice, "User rejected the connection!");
                Err(Error::Ethereum(EthereumServiceError::UserRejected))
            }
            Err(error) => {
                self.session.connection_failed();
                error!(%error, "failed to connect wallet");
                self.notifier.error(notice, "Failed to connect wallet.");
                Err(error.into())
            }
        }
    }

    /// Classifies the fresh account by chain, tries to reach the target
    /// chain, and on the right chain primes the view: one mint-count fetch
    /// and the event listener.
    async fn adopt_account(&mut self, account: Address) -> Result<(), Error> {
        self.session.begin_connecting();
        let chain_id = self.gateway.get_chain_id().await?;
        self.session
            .connected(account, chain_id, self.config.target_chain_id);
        if !self.session.may_mint() {
            // A failed switch is not a connection failure: the session stays
            // on the wrong chain and minting stays blocked.
            let _ = self.ensure_target_chain().await;
        }
        if self.session.may_mint() {
            self.refresh_minted().await?;
            self.start_listener().await?;
        }
        Ok(())
    }

    /// Reads the wallet's current chain and switches it to the target chain
    /// if needed. Refreshes the mint counter after a successful switch.
    pub async fn ensure_target_chain(&mut self) -> Result<(), Error> {
        let target = self.config.target_chain_id;
        let chain_id = self.gateway.get_chain_id().await?;
        debug!(%chain_id, "currently connected chain");
        if let Some(account) = self.session.account() {
            self.session.connected(account, chain_id, target);
        }
        if chain_id == target {
            return Ok(());
        }
        let notice = self.notifier.loading(format!(
            "Please connect to the {} network...",
            self.config.chain_name
        ));
        match self.gateway.switch_chain(target).await {
            Ok(()) => {
                info!(%target, "switched to the target chain");
                self.notifier.success(
                    notice,
                    format!("Successfully connected to {}!", self.config.chain_name),
                );
                self.session.chain_switched(target);
                self.refresh_minted().await?;
                Ok(())
            }
            Err(error) => {
                warn!(%error, "failed to switch chains");
                self.notifier.error(
                    notice,
                    format!("Failed to connect to {}.", self.config.chain_name),
                );
                Err(error.into())
            }
        }
    }

    /// Re-reads the mint counter from the contract.
    pub async fn refresh_minted(&mut self) -> Result<(), Error> {
        let contract = self.contract()?;
        let minted = contract.minted_so_far(self.account()).await?;
        self.view.minted = minted;
        debug!(minted, "mint count updated");
        Ok(())
    }

    /// Starts (or restarts) the mint-event listener from the current block.
    /// Replacing the subscription drops the previous polling task.
    async fn start_listener(&mut self) -> Result<(), Error> {
        let contract = self.contract()?;
        let start_block = contract.block_number().await?;
        let subscription = listener::subscribe(
            contract,
            start_block,
            self.config.event_poll_interval(),
            self.event_sender.clone(),
        );
        self.subscription = Some(subscription);
        debug!(start_block, "mint-event listener started");
        Ok(())
    }

    /// Applies a mint event observed by the listener: the counter always
    /// refreshes, the displayed token only changes when the event is the
    /// connected account's own.
    pub async fn apply_mint_event(&mut self, event: MintEvent) -> Result<(), Error> {
        info!(minter = %event.minter, token_id = event.token_id, "mint event received");
        if self.account() == Some(event.minter) {
            self.view.minted_token = Some(MintedToken {
                token_id: event.token_id,
            });
            self.notifier.success_for(format!(
                "Your NFT was minted! See it at {}",
                self.config.asset_url(event.token_id)
            ));
        }
        self.refresh_minted().await
    }

    /// The mint action. Guards run in order: provider present, no pending
    /// transaction, wallet on the target chain. Only then is the
    /// transaction submitted, and no contract call is issued when the chain
    /// check fails.
    pub async fn mint(&mut self) -> Result<TransactionRecord, Error> {
        if !self.gateway.has_provider() {
            self.notifier.error_for("Please install a wallet to mint!");
            return Err(Error::Ethereum(EthereumServiceError::ProviderUnavailable));
        }
        if matches!(
            self.view.last_transaction,
            Some(TransactionRecord {
                status: TransactionStatus::Pending,
                ..
            })
        ) {
            return Err(Error::MintAlreadyPending);
        }
        if self.ensure_target_chain().await.is_err() {
            info!("not on the target chain, mint aborted");
            return Err(Error::WrongChain);
        }
        match self.run_mint().await {
            Ok(record) => Ok(record),
            Err(error) => {
                error!(%error, "mint failed");
                self.notifier.clear();
                self.notifier
                    .error_for("Error occurred while minting, check the logs.");
                Err(error)
            }
        }
    }

    async fn run_mint(&mut self) -> Result<TransactionRecord, Error> {
        let account = self.session.account().ok_or(Error::NotConnected)?;
        let contract = self.contract()?;

        let notice = self
            .notifier
            .loading("Please approve the transaction in your wallet...");
        info!("prompting the wallet to pay gas");
        let pending = contract.mint(account).await?;

        let mut record = TransactionRecord {
            hash: pending.hash,
            status: TransactionStatus::Pending,
        };
        self.view.last_transaction = Some(record.clone());
        self.notifier.progress(notice, "Transaction is being mined...");
        info!(hash = %pending.hash, "mining, please wait");

        match contract.await_confirmation(&pending).await {
            Ok(_receipt) => {
                record.status = TransactionStatus::Mined;
                self.view.last_transaction = Some(record.clone());
                self.notifier.success(notice, "Mined successfully!");
                info!(
                    transaction = %self.config.transaction_url(record.hash),
                    "mint transaction mined"
                );
                self.refresh_minted().await?;
                Ok(record)
            }
            Err(error) => {
                record.status = TransactionStatus::Failed;
                self.view.last_transaction = Some(record);
                Err(error.into())
            }
        }
    }
}
