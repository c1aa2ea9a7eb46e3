use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! snowflake_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake_id!(RoomId);
snowflake_id!(MemberId);
snowflake_id!(ChannelId);
snowflake_id!(MessageId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl Member {
    pub fn label(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{} ({tag})", self.display_name),
            None => self.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl RoomSnapshot {
    pub fn is_present(&self, member: MemberId) -> bool {
        self.members.iter().any(|present| present.id == member)
    }

    pub fn member(&self, member: MemberId) -> Option<&Member> {
        self.members.iter().find(|present| present.id == member)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandContext {
    #[serde(rename = "channelId")]
    pub channel: ChannelId,
    #[serde(rename = "messageId")]
    pub message: MessageId,
}
