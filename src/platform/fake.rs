use super::{RenameError, ReplyBody, Responder, RoomRenamer};
use crate::types::{ChannelId, CommandContext, RoomId};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Notify, Semaphore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Rename { room: RoomId, name: String, reason: String },
    Confirm(CommandContext),
    Deny(CommandContext),
    Reply(CommandContext, ReplyBody),
    Notify(ChannelId, String),
}

#[derive(Default)]
pub struct FakePlatform {
    calls: StdMutex<Vec<Recorded>>,
    room_names: StdMutex<HashMap<RoomId, String>>,
    scripted: StdMutex<VecDeque<Result<(), RenameError>>>,
    gate: StdMutex<Option<Arc<Semaphore>>>,
    recorded: Notify,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_rename(&self, error: RenameError) {
        self.scripted.lock().unwrap().push_back(Err(error));
    }

    pub fn hold_renames(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_renames(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.add_permits(1024);
        }
    }

    pub async fn wait_for_renames(&self, count: usize) {
        self.wait_until(|| self.renames().len() >= count).await;
    }

    pub async fn wait_for_calls(&self, count: usize) {
        self.wait_until(|| self.calls().len() >= count).await;
    }

    async fn wait_until(&self, ready: impl Fn() -> bool) {
        loop {
            let notified = self.recorded.notified();
            if ready() {
                return;
            }
            notified.await;
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn room_name(&self, room: RoomId) -> Option<String> {
        self.room_names.lock().unwrap().get(&room).cloned()
    }

    pub fn renames(&self) -> Vec<(RoomId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Recorded::Rename { room, name, .. } => Some((room, name)),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<(ChannelId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Recorded::Notify(channel, text) => Some((channel, text)),
                _ => None,
            })
            .collect()
    }

    pub fn replies(&self) -> Vec<ReplyBody> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Recorded::Reply(_, body) => Some(body),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Recorded) {
        self.calls.lock().unwrap().push(call);
        self.recorded.notify_waiters();
    }
}

#[async_trait]
impl RoomRenamer for FakePlatform {
    async fn rename_room(&self, room: RoomId, name: &str, reason: &str) -> Result<(), RenameError> {
        self.record(Recorded::Rename {
            room,
            name: name.to_string(),
            reason: reason.to_string(),
        });
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.unwrap();
        }
        let outcome = self.scripted.lock().unwrap().pop_front().unwrap_or(Ok(()));
        if outcome.is_ok() {
            self.room_names.lock().unwrap().insert(room, name.to_string());
        }
        outcome
    }
}

#[async_trait]
impl Responder for FakePlatform {
    async fn confirm(&self, context: &CommandContext) {
        self.record(Recorded::Confirm(*context));
    }

    async fn deny(&self, context: &CommandContext) {
        self.record(Recorded::Deny(*context));
    }

    async fn reply(&self, context: &CommandContext, body: &ReplyBody) {
        self.record(Recorded::Reply(*context, body.clone()));
    }

    async fn notify(&self, channel: ChannelId, text: &str) {
        self.record(Recorded::Notify(channel, text.to_string()));
    }
}
