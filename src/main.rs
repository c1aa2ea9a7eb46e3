use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod gateway;
mod lifecycle;
mod platform;
mod server;
mod service;
mod shared;
mod title;
mod transport;
mod types;

#[cfg(test)]
mod testing;

use config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServiceConfig::from_env()?;
    server::run(config).await
}
