mod bot;
mod config;
mod welcome;

use color_eyre::eyre::{Result, WrapErr};
use tracing::{error, instrument};

use crate::config::Config;

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let config = Config::from_env().map_err(|e| {
        error!("Fatal: {e}. All five of DISCORD_TOKEN, WELCOME_CHANNEL_ID, AUTO_ROLE_ID, RULES_CHANNEL_ID and GENERAL_CHANNEL_ID must be set.");
        e
    })?;

    bot::run(config).await.wrap_err("bot stopped")
}
