use crate::command::{CommandEngine, CommandOutcome, CommandRequest, Verdict};
use crate::gateway::GatewayEvent;
use crate::lifecycle::{OwnershipLifecycle, RenameObservation};
use crate::platform::{Responder, RoomRenamer};
use crate::title::TitleRegistry;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub struct TitleService {
    registry: Arc<TitleRegistry>,
    lifecycle: OwnershipLifecycle,
    commands: CommandEngine,
    responder: Arc<dyn Responder>,
}

impl TitleService {
    pub fn new(
        renamer: Arc<dyn RoomRenamer>,
        responder: Arc<dyn Responder>,
        max_name_length: usize,
    ) -> Self {
        let registry = Arc::new(TitleRegistry::new());
        Self {
            lifecycle: OwnershipLifecycle::new(
                Arc::clone(&registry),
                Arc::clone(&renamer),
                Arc::clone(&responder),
            ),
            commands: CommandEngine::new(Arc::clone(&registry), renamer, max_name_length),
            registry,
            responder,
        }
    }

    pub fn registry(&self) -> &TitleRegistry {
        &self.registry
    }

    pub async fn handle(&self, event: GatewayEvent) {
        let span = tracing::info_span!("event", event_id = %Uuid::new_v4(), kind = event.kind());
        async move {
            match event {
                GatewayEvent::Command(request) => {
                    self.run_command(&request).await;
                }
                GatewayEvent::Presence {
                    member,
                    previous_room,
                    new_room,
                } => {
                    let departure = self
                        .lifecycle
                        .presence_changed(member, previous_room, new_room)
                        .await;
                    tracing::debug!(member_id = %member, ?departure, "presence handled");
                }
                GatewayEvent::RoomDeleted { room_id } => {
                    self.lifecycle.room_deleted(room_id).await;
                }
                GatewayEvent::RoomRenamed { room_id, new_name } => {
                    match self.lifecycle.room_renamed(room_id, &new_name).await {
                        RenameObservation::Abandoned(title) => tracing::info!(
                            room_id = %room_id,
                            new_name = %new_name,
                            label = title.label(),
                            "room renamed externally, title abandoned"
                        ),
                        observation => {
                            tracing::debug!(room_id = %room_id, ?observation, "rename observed")
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn run_command(&self, request: &CommandRequest) -> CommandOutcome {
        let outcome = self.commands.execute(request).await;
        for reply in &outcome.replies {
            self.responder.reply(&request.context, reply).await;
        }
        match outcome.verdict {
            Some(Verdict::Accept) => self.responder.confirm(&request.context).await,
            Some(Verdict::Deny) => self.responder.deny(&request.context).await,
            None => {}
        }
        outcome
    }
}
