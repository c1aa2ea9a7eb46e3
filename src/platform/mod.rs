mod rest;
#[cfg(test)]
pub mod fake;

pub use rest::RestPlatform;

use crate::types::{ChannelId, CommandContext, RoomId};
use async_trait::async_trait;
use serde::Serialize;

pub const REASON_TITLE_CREATED: &str = "VC Title Created";
pub const REASON_TITLE_REMOVED: &str = "VC Title Removed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenameError {
    #[error("the bot cannot access this room")]
    Forbidden,
    #[error("platform api error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("platform request failed: {0}")]
    Transport(String),
}

impl RenameError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Forbidden)
    }
}

#[async_trait]
pub trait RoomRenamer: Send + Sync {
    async fn rename_room(&self, room: RoomId, name: &str, reason: &str) -> Result<(), RenameError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Text(String),
    Embed(Embed),
}

impl ReplyBody {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

#[async_trait]
pub trait Responder: Send + Sync {
    async fn confirm(&self, context: &CommandContext);
    async fn deny(&self, context: &CommandContext);
    async fn reply(&self, context: &CommandContext, body: &ReplyBody);
    async fn notify(&self, channel: ChannelId, text: &str);
}
