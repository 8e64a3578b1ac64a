use async_trait::async_trait;
use color_eyre::Result;
use poise::serenity_prelude as serenity;
use tracing::{error, info, instrument, warn};

use crate::config::Config;

pub mod gateway;
pub mod template;

/// The member whose arrival triggered the handler.
#[derive(Debug, Clone)]
pub struct Newcomer {
    pub id: serenity::UserId,
    pub tag: String,
}

/// A role as found in the guild's cache.
#[derive(Debug, Clone)]
pub struct CachedRole {
    pub id: serenity::RoleId,
    pub name: String,
    pub position: i64,
}

/// A fetched channel, reduced to what the greeting step cares about.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub name: String,
    pub accepts_text: bool,
}

/// The slice of a guild the join handler talks to.
#[async_trait]
pub trait GuildAccess: Send + Sync {
    /// Looks a role up in the local cache, without hitting the API.
    fn cached_role(&self, role: serenity::RoleId) -> Option<CachedRole>;

    /// Position of the bot's highest role in this guild.
    fn bot_highest_position(&self) -> i64;

    async fn add_role(&self, member: serenity::UserId, role: serenity::RoleId) -> Result<()>;

    /// `Ok(None)` when the channel doesn't exist in this guild.
    async fn fetch_channel(&self, channel: serenity::ChannelId) -> Result<Option<ChannelInfo>>;

    async fn send_message(&self, channel: serenity::ChannelId, content: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleOutcome {
    NotCached,
    Attempted { granted: bool, hierarchy_warning: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreetingOutcome {
    Sent,
    ChannelUnavailable,
    Failed,
}

/// What happened while welcoming a single member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinReport {
    pub role: RoleOutcome,
    pub greeting: GreetingOutcome,
}

/// Grants the auto role and posts the greeting. Both steps are best effort and run independently;
/// failures are logged and never returned.
#[instrument(skip_all, fields(member = %newcomer.tag))]
pub async fn greet<G: GuildAccess>(guild: &G, newcomer: &Newcomer, config: &Config) -> JoinReport {
    info!("Member joined: {} ({})", newcomer.tag, newcomer.id);

    let role = assign_role(guild, newcomer, config.auto_role).await;
    let greeting = send_greeting(guild, newcomer, config).await;

    JoinReport { role, greeting }
}

async fn assign_role<G: GuildAccess>(
    guild: &G,
    newcomer: &Newcomer,
    role_id: serenity::RoleId,
) -> RoleOutcome {
    let role = match guild.cached_role(role_id) {
        Some(role) => role,
        None => {
            error!("Role ID {role_id} not found in the guild's cache. Check the role ID.");
            return RoleOutcome::NotCached;
        }
    };

    let added = guild.add_role(newcomer.id, role.id).await;

    // Checked whether or not the add went through.
    let hierarchy_warning = guild.bot_highest_position() <= role.position;
    if hierarchy_warning {
        warn!(
            "The bot's highest role must sit above '{}' in Server Settings -> Roles, \
             otherwise it cannot be granted.",
            role.name
        );
    }

    let granted = match added {
        Ok(()) => {
            info!("Assigned role '{}' to {}", role.name, newcomer.tag);
            true
        }
        Err(e) => {
            error!("Failed to assign role '{}' to {}: {e}", role.name, newcomer.tag);
            false
        }
    };

    RoleOutcome::Attempted {
        granted,
        hierarchy_warning,
    }
}

async fn send_greeting<G: GuildAccess>(
    guild: &G,
    newcomer: &Newcomer,
    config: &Config,
) -> GreetingOutcome {
    let channel_id = config.welcome_channel;

    let channel = match guild.fetch_channel(channel_id).await {
        Ok(Some(channel)) if channel.accepts_text => channel,
        Ok(_) => {
            error!("Welcome channel ID {channel_id} is invalid or not a text channel.");
            return GreetingOutcome::ChannelUnavailable;
        }
        Err(e) => {
            error!("Failed to fetch welcome channel {channel_id}: {e}");
            return GreetingOutcome::ChannelUnavailable;
        }
    };

    let message = template::render(newcomer.id, config);
    match guild.send_message(channel_id, &message).await {
        Ok(()) => {
            info!("Sent welcome message for {} in #{}", newcomer.tag, channel.name);
            GreetingOutcome::Sent
        }
        Err(e) => {
            error!("Failed to send welcome message for {}: {e}", newcomer.tag);
            GreetingOutcome::Failed
        }
    }
}
