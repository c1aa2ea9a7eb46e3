use super::Title;
use crate::types::RoomId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slot = Arc<Mutex<Option<Title>>>;

// Every read-modify-write goes through `entry`, which serializes callers per
// room and may be held across the rename call. Different rooms never contend.
#[derive(Debug, Default)]
pub struct TitleRegistry {
    slots: DashMap<RoomId, Slot>,
}

#[derive(Debug)]
pub struct TitleEntry<'a> {
    slots: &'a DashMap<RoomId, Slot>,
    room_id: RoomId,
    guard: OwnedMutexGuard<Option<Title>>,
}

impl TitleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entry(&self, room_id: RoomId) -> TitleEntry<'_> {
        let slot = self.slots.entry(room_id).or_default().clone();
        let guard = slot.lock_owned().await;
        TitleEntry {
            slots: &self.slots,
            room_id,
            guard,
        }
    }

    pub async fn get(&self, room_id: RoomId) -> Option<Title> {
        let slot = self.slots.get(&room_id).map(|slot| Arc::clone(slot.value()))?;
        let title = slot.lock().await.clone();
        title
    }

    pub async fn remove(&self, room_id: RoomId) -> Option<Title> {
        if !self.slots.contains_key(&room_id) {
            return None;
        }
        self.entry(room_id).await.take()
    }

    pub async fn titles(&self) -> Vec<Title> {
        let slots = self
            .slots
            .iter()
            .map(|slot| Arc::clone(slot.value()))
            .collect::<Vec<_>>();
        let mut titles = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(title) = slot.lock().await.clone() {
                titles.push(title);
            }
        }
        titles.sort_by_key(Title::room_id);
        titles
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl TitleEntry<'_> {
    pub fn get(&self) -> Option<&Title> {
        (*self.guard).as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Title> {
        (*self.guard).as_mut()
    }

    pub fn insert(&mut self, title: Title) {
        *self.guard = Some(title);
    }

    pub fn take(&mut self) -> Option<Title> {
        (*self.guard).take()
    }
}

impl Drop for TitleEntry<'_> {
    fn drop(&mut self) {
        if self.guard.is_some() {
            return;
        }
        // Two references means the map and this guard: nobody is queued on the slot, and new
        // callers clone under the shard lock that `remove_if` holds.
        self.slots
            .remove_if(&self.room_id, |_, slot| Arc::strong_count(slot) == 2);
    }
}
