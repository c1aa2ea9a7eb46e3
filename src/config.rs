use crate::shared::names::MAX_ROOM_NAME_LENGTH;
use anyhow::{bail, Context};
use std::env;

const DEFAULT_PLATFORM_API_URL: &str = "https://discord.com/api/v10";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub platform_api_url: String,
    pub platform_token: String,
    pub gateway_secret: Option<String>,
    pub confirm_emoji: String,
    pub deny_emoji: String,
    pub max_room_name_length: usize,
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(8787),
            platform_api_url: env::var("PLATFORM_API_URL")
                .map(|value| value.trim().to_string())
                .ok()
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_PLATFORM_API_URL.to_string()),
            platform_token: env::var("PLATFORM_TOKEN").context("missing PLATFORM_TOKEN")?,
            gateway_secret: non_empty_env("GATEWAY_SECRET"),
            confirm_emoji: non_empty_env("CONFIRM_EMOJI").unwrap_or_else(|| "✅".to_string()),
            deny_emoji: non_empty_env("DENY_EMOJI").unwrap_or_else(|| "💥".to_string()),
            max_room_name_length: env::var("MAX_ROOM_NAME_LENGTH")
                .ok()
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(MAX_ROOM_NAME_LENGTH),
        }
        .validate()
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.platform_token.trim().is_empty() {
            bail!("PLATFORM_TOKEN must not be empty");
        }
        if self.max_room_name_length < 2 {
            bail!("MAX_ROOM_NAME_LENGTH must leave room for a symbol and a label");
        }
        Ok(self)
    }
}

fn non_empty_env(var_name: &str) -> Option<String> {
    env::var(var_name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
