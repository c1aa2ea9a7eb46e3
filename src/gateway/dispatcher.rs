use super::GatewayEvent;
use crate::service::TitleService;
use crate::types::RoomId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

// One lane per room with queued or running events: a queue drained by a single task, so a
// room sees its events in arrival order while other rooms keep going during a slow rename.
pub struct Dispatcher {
    service: Arc<TitleService>,
    lanes: Arc<DashMap<RoomId, Lane>>,
    next_lane: AtomicU64,
}

struct Lane {
    id: u64,
    sender: UnboundedSender<GatewayEvent>,
}

impl Dispatcher {
    pub fn new(service: Arc<TitleService>) -> Self {
        Self {
            service,
            lanes: Arc::new(DashMap::new()),
            next_lane: AtomicU64::new(0),
        }
    }

    pub fn service(&self) -> &Arc<TitleService> {
        &self.service
    }

    pub fn dispatch(&self, event: GatewayEvent) {
        let Some(room) = event.room() else {
            let service = Arc::clone(&self.service);
            tokio::spawn(async move { service.handle(event).await });
            return;
        };

        match self.lanes.entry(room) {
            Entry::Occupied(mut lane) => {
                if let Err(mpsc::error::SendError(event)) = lane.get().sender.send(event) {
                    tracing::warn!(room_id = %room, "room lane closed, restarting it");
                    lane.insert(self.spawn_lane(room, event));
                }
            }
            Entry::Vacant(lane) => {
                lane.insert(self.spawn_lane(room, event));
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    fn spawn_lane(&self, room: RoomId, first: GatewayEvent) -> Lane {
        let (sender, receiver) = mpsc::unbounded_channel::<GatewayEvent>();
        let _ = sender.send(first);
        let id = self.next_lane.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(drain_lane(
            Arc::clone(&self.service),
            Arc::clone(&self.lanes),
            room,
            id,
            receiver,
        ));
        Lane { id, sender }
    }
}

async fn drain_lane(
    service: Arc<TitleService>,
    lanes: Arc<DashMap<RoomId, Lane>>,
    room: RoomId,
    id: u64,
    mut receiver: UnboundedReceiver<GatewayEvent>,
) {
    loop {
        while let Ok(event) = receiver.try_recv() {
            service.handle(event).await;
        }
        // `dispatch` only sends under the shard lock `remove_if` holds, so an empty queue
        // seen here stays empty until the lane is gone from the map.
        let mut next = None;
        lanes.remove_if(&room, |_, lane| {
            if lane.id != id {
                return false;
            }
            match receiver.try_recv() {
                Ok(event) => {
                    next = Some(event);
                    false
                }
                Err(_) => true,
            }
        });
        match next {
            Some(event) => service.handle(event).await,
            None => break,
        }
    }
    tracing::debug!(room_id = %room, "room lane idle, retired");
}
