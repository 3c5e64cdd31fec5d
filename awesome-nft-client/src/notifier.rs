// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// Identifier of a transient notice. An outcome notice carrying the same id
/// as an earlier loading notice replaces it in place, so "connecting…" can
/// turn into "connected!" without stacking up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeStatus {
    Loading,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub status: NoticeStatus,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeEvent {
    Update(Notice),
    /// Dismiss every pending notice.
    Clear,
}

/// The `Notifier` feeds transient status messages to whoever renders them.
/// Senders never block and never fail: with no renderer attached the notices
/// are simply dropped.
pub struct Notifier {
    sender: UnboundedSender<NoticeEvent>,
    next_id: AtomicU64,
}

impl Notifier {
    pub fn new() -> (Self, UnboundedReceiver<NoticeEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let notifier = Notifier {
            sender,
            next_id: AtomicU64::new(0),
        };
        (notifier, receiver)
    }

    fn allocate(&self) -> NoticeId {
        NoticeId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn send(&self, event: NoticeEvent) {
        if self.sender.send(event).is_err() {
            trace!("notice dropped, no renderer is listening");
        }
    }

    fn notice(&self, id: NoticeId, status: NoticeStatus, message: impl Into<String>) {
        self.send(NoticeEvent::Update(Notice {
            id,
            status,
            message: message.into(),
        }));
    }

    /// Shows a loading notice and returns its id so the outcome can replace
    /// it.
    pub fn loading(&self, message: impl Into<String>) -> NoticeId {
        let id = self.allocate();
        self.notice(id, NoticeStatus::Loading, message);
        id
    }

    /// Updates a loading notice in place, keeping it spinning.
    pub fn progress(&self, id: NoticeId, message: impl Into<String>) {
        self.notice(id, NoticeStatus::Loading, message);
    }

    pub fn success(&self, id: NoticeId, message: impl Into<String>) {
        self.notice(id, NoticeStatus::Success, message);
    }

    pub fn error(&self, id: NoticeId, message: impl Into<String>) {
        self.notice(id, NoticeStatus::Error, message);
    }

    /// A success notice that is not the outcome of an earlier loading one.
    pub fn success_for(&self, message: impl Into<String>) -> NoticeId {
        let id = self.allocate();
        self.notice(id, NoticeStatus::Success, message);
        id
    }

    /// An error notice that is not the outcome of an earlier loading one.
    pub fn error_for(&self, message: impl Into<String>) -> NoticeId {
        let id = self.allocate();
        self.notice(id, NoticeStatus::Error, message);
        id
    }

    /// Dismisses all pending notices.
    pub fn clear(&self) {
        self.send(NoticeEvent::Clear);
    }
}
