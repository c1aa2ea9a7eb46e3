use crate::command::CommandRequest;
use crate::gateway::GatewayEvent;
use crate::types::{ChannelId, CommandContext, Member, MemberId, MessageId, RoomId, RoomSnapshot};

pub const REQUEST_CHANNEL: ChannelId = ChannelId(900);

pub fn member(id: u64, name: &str) -> Member {
    Member {
        id: MemberId(id),
        display_name: name.to_string(),
        tag: None,
        bot: false,
    }
}

pub fn room(id: u64, name: &str, members: &[Member]) -> RoomSnapshot {
    RoomSnapshot {
        id: RoomId(id),
        name: name.to_string(),
        members: members.to_vec(),
    }
}

pub fn context() -> CommandContext {
    CommandContext {
        channel: REQUEST_CHANNEL,
        message: MessageId(1),
    }
}

pub fn request(author: Member, room: Option<RoomSnapshot>, argument: &str) -> CommandRequest {
    CommandRequest {
        context: context(),
        author,
        in_guild: true,
        room,
        argument: argument.to_string(),
        mentions: Vec::new(),
    }
}

pub fn command_event(author: Member, room: Option<RoomSnapshot>, argument: &str) -> GatewayEvent {
    GatewayEvent::Command(request(author, room, argument))
}

// Polls every runnable task up to its next pending await on the current-thread test runtime.
pub async fn run_pending() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
