// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The terminal rendition of the Awesome NFT minting page: one command at a
//! time, with toast-style notices and live mint events in between.

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use anyhow::Result;
use awesome_nft_client::{
    config::DappConfig,
    frontend::{Frontend, TransactionStatus},
    notifier::{NoticeEvent, NoticeId, NoticeStatus},
};
use awesome_nft_ethereum::provider::{HttpWalletProvider, WalletGateway};
use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::UnboundedReceiver,
};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "awesome-nft-service",
    about = "Run the terminal front-end for the Awesome NFT collection"
)]
struct ServiceOptions {
    /// Configuration of the page: wallet provider, contract and links.
    #[command(flatten)]
    config: DappConfig,
}

/// Renders notices the way the page's toasts behave: an outcome carrying the
/// id of an earlier loading notice reuses its slot.
#[derive(Default)]
struct NoticeBoard {
    slots: HashMap<NoticeId, usize>,
    next_slot: usize,
}

impl NoticeBoard {
    fn render(&mut self, event: NoticeEvent) {
        match event {
            NoticeEvent::Update(notice) => {
                let next = self.next_slot + 1;
                let slot = match self.slots.entry(notice.id) {
                    Entry::Occupied(entry) => *entry.get(),
                    Entry::Vacant(entry) => {
                        self.next_slot = next;
                        *entry.insert(next)
                    }
                };
                let glyph = match notice.status {
                    NoticeStatus::Loading => "…",
                    NoticeStatus::Success => "✓",
                    NoticeStatus::Error => "✗",
                };
                println!("  [{slot}] {glyph} {}", notice.message);
            }
            NoticeEvent::Clear => {
                self.slots.clear();
            }
        }
    }
}

fn drain_notices(notices: &mut UnboundedReceiver<NoticeEvent>, board: &mut NoticeBoard) {
    while let Ok(event) = notices.try_recv() {
        board.render(event);
    }
}

fn render(frontend: &Frontend<HttpWalletProvider>) {
    let config = frontend.config();
    let view = frontend.view();
    println!();
    println!("== Awesome NFT Collection ==");
    println!("Each unique. Each beautifully crafted. Discover your NFT today.");
    println!("View the collection at {}", config.collection_url);
    match frontend.account() {
        None => println!("No wallet connected. Type `connect` to connect one."),
        Some(account) => {
            println!("({} OF {} MINTED)", view.minted, config.collection_size);
            println!("Connected with {account}");
            if frontend.session().may_mint() {
                println!("Type `mint` to mint your NFT.");
            } else {
                println!(
                    "The wallet is not on {}; minting is blocked.",
                    config.chain_name
                );
            }
        }
    }
    if let Some(record) = &view.last_transaction {
        let status = match record.status {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Mined => "mined",
            TransactionStatus::Failed => "failed",
        };
        println!(
            "Last transaction ({status}): {}",
            config.transaction_url(record.hash)
        );
    }
    if let Some(token) = &view.minted_token {
        println!("View your NFT at {}", config.asset_url(token.token_id));
    }
}

fn prompt() {
    use std::io::Write as _;
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Runs one command to completion. Failures inside the front-end have
/// already been logged and surfaced as notices.
async fn handle_command(command: &str, frontend: &mut Frontend<HttpWalletProvider>) -> bool {
    match command {
        "" | "status" => {}
        "connect" => {
            frontend.connect_wallet().await.ok();
        }
        "mint" => {
            frontend.mint().await.ok();
        }
        "refresh" => {
            if let Err(error) = frontend.refresh_minted().await {
                warn!(%error, "could not refresh the mint count");
            }
        }
        "quit" | "exit" | "q" => return true,
        other => println!("unknown command: {other:?}"),
    }
    false
}

#[tokio::main]
async fn main() -> Result<()> {
    use is_terminal::IsTerminal as _;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let options = ServiceOptions::parse();
    let config = options.config;
    let provider = config
        .provider_url
        .clone()
        .map(|url| Arc::new(HttpWalletProvider::new(url)));
    let gateway = WalletGateway::new(provider);
    let (mut frontend, mut notices, mut events) = Frontend::new(config, gateway);

    if let Err(error) = frontend.check_existing_session().await {
        warn!(%error, "could not check for an existing session");
    }

    let mut board = NoticeBoard::default();
    drain_notices(&mut notices, &mut board);
    render(&frontend);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    prompt();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let quit = handle_command(line.trim(), &mut frontend).await;
                drain_notices(&mut notices, &mut board);
                if quit {
                    break;
                }
                render(&frontend);
                prompt();
            }
            Some(event) = events.recv() => {
                if let Err(error) = frontend.apply_mint_event(event).await {
                    warn!(%error, "failed to apply a mint event");
                }
                drain_notices(&mut notices, &mut board);
                render(&frontend);
                prompt();
            }
            Some(event) = notices.recv() => {
                board.render(event);
            }
        }
    }

    Ok(())
}
