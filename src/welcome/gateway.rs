use std::collections::HashMap;

use async_trait::async_trait;
use color_eyre::Result;
use poise::serenity_prelude as serenity;

use super::{CachedRole, ChannelInfo, GuildAccess};

/// [`GuildAccess`] backed by the live gateway connection.
///
/// The guild is snapshotted from the cache once, when the member joins, so role lookups and the
/// hierarchy check see the same state.
pub struct GatewayGuild<'a> {
    ctx: &'a serenity::Context,
    guild_id: serenity::GuildId,
    snapshot: Option<serenity::Guild>,
}

impl<'a> GatewayGuild<'a> {
    pub fn new(ctx: &'a serenity::Context, guild_id: serenity::GuildId) -> Self {
        Self {
            ctx,
            guild_id,
            snapshot: ctx.cache.guild(guild_id),
        }
    }
}

#[async_trait]
impl GuildAccess for GatewayGuild<'_> {
    fn cached_role(&self, role: serenity::RoleId) -> Option<CachedRole> {
        let role = self.snapshot.as_ref()?.roles.get(&role)?;
        Some(CachedRole {
            id: role.id,
            name: role.name.clone(),
            position: role.position,
        })
    }

    fn bot_highest_position(&self) -> i64 {
        let Some(guild) = &self.snapshot else {
            return 0;
        };
        let bot_id = self.ctx.cache.current_user_id();
        guild
            .members
            .get(&bot_id)
            .map(|bot| highest_position(&guild.roles, &bot.roles))
            .unwrap_or(0)
    }

    async fn add_role(&self, member: serenity::UserId, role: serenity::RoleId) -> Result<()> {
        let mut member = self.guild_id.member(self.ctx, member).await?;
        member.add_role(&self.ctx.http, role).await?;
        Ok(())
    }

    async fn fetch_channel(&self, channel: serenity::ChannelId) -> Result<Option<ChannelInfo>> {
        Ok(match channel.to_channel(self.ctx).await? {
            serenity::Channel::Guild(channel) if channel.guild_id == self.guild_id => {
                Some(ChannelInfo {
                    accepts_text: accepts_text(channel.kind),
                    name: channel.name,
                })
            }
            serenity::Channel::Category(category) if category.guild_id == self.guild_id => {
                Some(ChannelInfo {
                    name: category.name,
                    accepts_text: false,
                })
            }
            _ => None,
        })
    }

    async fn send_message(&self, channel: serenity::ChannelId, content: &str) -> Result<()> {
        channel.say(&self.ctx.http, content).await?;
        Ok(())
    }
}

/// Highest position among `member_roles`. Members without roles only have `@everyone`, which
/// always sits at 0.
fn highest_position(
    roles: &HashMap<serenity::RoleId, serenity::Role>,
    member_roles: &[serenity::RoleId],
) -> i64 {
    member_roles
        .iter()
        .filter_map(|id| roles.get(id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

fn accepts_text(kind: serenity::ChannelType) -> bool {
    matches!(
        kind,
        serenity::ChannelType::Text
            | serenity::ChannelType::News
            | serenity::ChannelType::Voice
            | serenity::ChannelType::Stage
            | serenity::ChannelType::NewsThread
            | serenity::ChannelType::PublicThread
            | serenity::ChannelType::PrivateThread
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_like_channels_accept_messages() {
        assert!(accepts_text(serenity::ChannelType::Text));
        assert!(accepts_text(serenity::ChannelType::News));
        assert!(accepts_text(serenity::ChannelType::PublicThread));
        assert!(!accepts_text(serenity::ChannelType::Category));
        assert!(!accepts_text(serenity::ChannelType::Private));
    }

    #[test]
    fn member_without_roles_sits_at_everyone() {
        assert_eq!(highest_position(&HashMap::new(), &[]), 0);
        assert_eq!(highest_position(&HashMap::new(), &[serenity::RoleId(9)]), 0);
    }
}
