use super::{RenameError, ReplyBody, Responder, RoomRenamer};
use crate::types::{ChannelId, CommandContext, RoomId};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};

const AUDIT_REASON_HEADER: &str = "X-Audit-Log-Reason";

#[derive(Clone)]
pub struct RestPlatform {
    http: reqwest::Client,
    token: String,
    base_url: String,
    confirm_emoji: String,
    deny_emoji: String,
}

impl RestPlatform {
    pub fn new(base_url: String, token: String, confirm_emoji: String, deny_emoji: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            base_url,
            confirm_emoji,
            deny_emoji,
        }
    }

    fn url(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid platform api url {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("platform api url cannot be a base"))?
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("Bot {}", self.token))
    }

    async fn create_message(&self, channel: ChannelId, body: &ReplyBody) -> anyhow::Result<()> {
        let payload = match body {
            ReplyBody::Text(content) => json!({ "content": content }),
            ReplyBody::Embed(embed) => json!({ "embeds": [embed] }),
        };
        let channel = channel.to_string();
        let url = self.url(&["channels", &channel, "messages"])?;
        let response = self
            .request(Method::POST, url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("failed to post message to channel {channel}"))?;
        ensure_success(response).await
    }

    async fn add_reaction(&self, context: &CommandContext, emoji: &str) -> anyhow::Result<()> {
        let channel = context.channel.to_string();
        let message = context.message.to_string();
        let url = self.url(&[
            "channels",
            &channel,
            "messages",
            &message,
            "reactions",
            emoji,
            "@me",
        ])?;
        let response = self
            .request(Method::PUT, url)
            .send()
            .await
            .with_context(|| format!("failed to react to message {message}"))?;
        ensure_success(response).await
    }

    async fn react_or_warn(&self, context: &CommandContext, emoji: &str) {
        if let Err(error) = self.add_reaction(context, emoji).await {
            tracing::warn!(
                ?error,
                channel_id = %context.channel,
                message_id = %context.message,
                "failed to add reaction"
            );
        }
    }
}

#[async_trait]
impl RoomRenamer for RestPlatform {
    async fn rename_room(&self, room: RoomId, name: &str, reason: &str) -> Result<(), RenameError> {
        let room_segment = room.to_string();
        let url = self
            .url(&["channels", &room_segment])
            .map_err(|error| RenameError::Transport(error.to_string()))?;
        let response = self
            .request(Method::PATCH, url)
            .header(AUDIT_REASON_HEADER, reason)
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(|error| RenameError::Transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}

#[async_trait]
impl Responder for RestPlatform {
    async fn confirm(&self, context: &CommandContext) {
        self.react_or_warn(context, &self.confirm_emoji).await;
    }

    async fn deny(&self, context: &CommandContext) {
        self.react_or_warn(context, &self.deny_emoji).await;
    }

    async fn reply(&self, context: &CommandContext, body: &ReplyBody) {
        if let Err(error) = self.create_message(context.channel, body).await {
            tracing::warn!(?error, channel_id = %context.channel, "failed to send reply");
        }
    }

    async fn notify(&self, channel: ChannelId, text: &str) {
        if let Err(error) = self.create_message(channel, &ReplyBody::text(text)).await {
            tracing::warn!(?error, channel_id = %channel, "failed to send notification");
        }
    }
}

fn classify_failure(status: StatusCode, body: &str) -> RenameError {
    if status == StatusCode::FORBIDDEN {
        return RenameError::Forbidden;
    }
    let message = serde_json::from_str::<PlatformErrorResponse>(body)
        .map(|error| format!("{} (code {})", error.message, error.code))
        .unwrap_or_else(|_| body.to_string());
    RenameError::Http {
        status: status.as_u16(),
        message,
    }
}

async fn ensure_success(response: reqwest::Response) -> anyhow::Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    if let Ok(error) = serde_json::from_str::<PlatformErrorResponse>(&body) {
        bail!(
            "platform api error {} {}: {}",
            status.as_u16(),
            error.code,
            error.message
        );
    }
    bail!("platform api error {}: {}", status.as_u16(), body);
}

#[derive(Debug, Deserialize)]
struct PlatformErrorResponse {
    #[serde(default)]
    code: Value,
    message: String,
}
