mod dispatcher;

pub use dispatcher::Dispatcher;

use crate::command::CommandRequest;
use crate::types::{MemberId, RoomId};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum GatewayEvent {
    #[serde(rename = "command")]
    Command(CommandRequest),
    #[serde(rename = "presence")]
    Presence {
        member: MemberId,
        #[serde(rename = "previousRoom", default)]
        previous_room: Option<RoomId>,
        #[serde(rename = "newRoom", default)]
        new_room: Option<RoomId>,
    },
    #[serde(rename = "roomDeleted")]
    RoomDeleted {
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    #[serde(rename = "roomRenamed")]
    RoomRenamed {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        #[serde(rename = "newName")]
        new_name: String,
    },
}

impl GatewayEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::Presence { .. } => "presence",
            Self::RoomDeleted { .. } => "roomDeleted",
            Self::RoomRenamed { .. } => "roomRenamed",
        }
    }

    // The room whose title this event may touch. Events without one touch no title.
    pub fn room(&self) -> Option<RoomId> {
        match self {
            Self::Command(request) => request.room.as_ref().map(|room| room.id),
            Self::Presence {
                previous_room,
                new_room,
                ..
            } => previous_room.filter(|previous| Some(*previous) != *new_room),
            Self::RoomDeleted { room_id } | Self::RoomRenamed { room_id, .. } => Some(*room_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_command_frames() {
        let frame = r#"{
            "type": "command",
            "channelId": 10,
            "messageId": 11,
            "author": { "id": 1, "displayName": "ana", "tag": "ana#0001" },
            "room": { "id": 5, "name": "General", "members": [{ "id": 1, "displayName": "ana" }] },
            "argument": "join",
            "mentions": []
        }"#;
        let event: GatewayEvent = serde_json::from_str(frame).expect("frame should decode");
        let GatewayEvent::Command(request) = &event else {
            panic!("expected a command, got {event:?}");
        };
        assert!(request.in_guild);
        assert_eq!(request.context.message.0, 11);
        assert_eq!(event.room(), Some(RoomId(5)));
    }

    #[test]
    fn presence_lane_is_the_room_being_left() {
        let event: GatewayEvent =
            serde_json::from_str(r#"{"type":"presence","member":1,"previousRoom":5,"newRoom":6}"#)
                .expect("frame should decode");
        assert_eq!(event.room(), Some(RoomId(5)));

        let join: GatewayEvent =
            serde_json::from_str(r#"{"type":"presence","member":1,"newRoom":6}"#)
                .expect("frame should decode");
        assert_eq!(join.room(), None);

        let same_room: GatewayEvent =
            serde_json::from_str(r#"{"type":"presence","member":1,"previousRoom":5,"newRoom":5}"#)
                .expect("frame should decode");
        assert_eq!(same_room.room(), None);
    }

    #[test]
    fn rejects_unknown_event_types() {
        assert!(serde_json::from_str::<GatewayEvent>(r#"{"type":"typing","roomId":1}"#).is_err());
    }
}
