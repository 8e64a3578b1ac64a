use poise::serenity_prelude as serenity;

use crate::config::Config;

/// Renders the greeting posted for a new member.
pub fn render(member: serenity::UserId, config: &Config) -> String {
    let member = serenity::Mention::from(member);
    let role = serenity::Mention::from(config.auto_role);
    let rules = serenity::Mention::from(config.rules_channel);
    let general = serenity::Mention::from(config.general_channel);

    format!(
        "Hello {member}

                         🎉 WELCOME TO 🎉
                         Purrfect Universe             \x20


We're thrilled to have you join our UNIVERSE! You've been granted the {role} role.

To get started, please check out these channels:

| **{rules}** : Read this first! It covers our Universe guidelines.,

| **{general}** : Say hello to Universe member!

Enjoy your stay!
https://discord.gg/xYZHkQYt5H
      Arafat_Zahan
Founder & Universe Architect -
Purrfect Universe\x20
📧 arafat@purrfecthq.com  🌐 www.purrfecthq.com
Work Hard. Play Hard. Purr Loudest."
    )
}
