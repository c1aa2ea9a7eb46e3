use crate::platform::{RenameError, Responder, RoomRenamer, REASON_TITLE_REMOVED};
use crate::title::{Title, TitleRegistry};
use crate::types::{MemberId, RoomId};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameObservation {
    Untracked,
    Echo,
    Abandoned(Title),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    Ignored,
    NotOwner,
    OwnerRemoved { remaining: usize },
    Reclaimed,
    ReclaimFailed(RenameError),
}

#[derive(Clone)]
pub struct OwnershipLifecycle {
    registry: Arc<TitleRegistry>,
    renamer: Arc<dyn RoomRenamer>,
    responder: Arc<dyn Responder>,
}

impl OwnershipLifecycle {
    pub fn new(
        registry: Arc<TitleRegistry>,
        renamer: Arc<dyn RoomRenamer>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            registry,
            renamer,
            responder,
        }
    }

    pub async fn room_deleted(&self, room: RoomId) -> Option<Title> {
        let removed = self.registry.remove(room).await;
        if removed.is_some() {
            tracing::info!(room_id = %room, "room deleted, dropping title");
        }
        removed
    }

    pub async fn room_renamed(&self, room: RoomId, new_name: &str) -> RenameObservation {
        let mut entry = self.registry.entry(room).await;
        let Some(title) = entry.get() else {
            return RenameObservation::Untracked;
        };
        if title.titled_name() == new_name {
            return RenameObservation::Echo;
        }
        match entry.take() {
            Some(title) => RenameObservation::Abandoned(title),
            None => RenameObservation::Untracked,
        }
    }

    pub async fn presence_changed(
        &self,
        member: MemberId,
        previous: Option<RoomId>,
        current: Option<RoomId>,
    ) -> Departure {
        let Some(room) = previous else {
            return Departure::Ignored;
        };
        if current == Some(room) {
            return Departure::Ignored;
        }

        let mut entry = self.registry.entry(room).await;
        let Some(title) = entry.get_mut() else {
            return Departure::Ignored;
        };
        if !title.remove_owner(member) {
            return Departure::NotOwner;
        }
        if !title.owners().is_empty() {
            return Departure::OwnerRemoved {
                remaining: title.owners().len(),
            };
        }

        let default_name = title.default_name().to_string();
        let titled_name = title.titled_name();
        let request_channel = title.request_channel();
        match self
            .renamer
            .rename_room(room, &default_name, REASON_TITLE_REMOVED)
            .await
        {
            Ok(()) => {
                entry.take();
                tracing::info!(
                    room_id = %room,
                    default_name = %default_name,
                    "last owner left, room name restored"
                );
                Departure::Reclaimed
            }
            Err(error) => {
                if let Some(title) = entry.get_mut() {
                    title.mark_stuck();
                }
                drop(entry);
                tracing::warn!(
                    room_id = %room,
                    channel_id = %request_channel,
                    permission_denied = error.is_permission_denied(),
                    ?error,
                    "failed to restore room name"
                );
                let text = format!("`{titled_name}` → `{default_name}` restore failed: {error}");
                self.responder.notify(request_channel, &text).await;
                Departure::ReclaimFailed(error)
            }
        }
    }
}
