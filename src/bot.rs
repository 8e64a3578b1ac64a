use poise::serenity_prelude as serenity;

use color_eyre::{eyre::ErrReport, Result};
use tracing::{debug, info, instrument};

use crate::{
    config::Config,
    welcome::{self, gateway::GatewayGuild, Newcomer},
};

pub struct Bot {
    pub config: Config,
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &poise::Event<'_>,
    _framework: poise::FrameworkContext<'_, Bot, ErrReport>,
    bot: &Bot,
) -> Result<(), ErrReport> {
    match event {
        poise::Event::Ready {
            data_about_bot: ready,
        } => {
            info!("{} connected successfully", ready.user.name);
            info!("Ready to welcome and assign role ID: {}", bot.config.auto_role);
        }
        poise::Event::GuildMemberAddition { new_member } => {
            let newcomer = Newcomer {
                id: new_member.user.id,
                tag: new_member.user.tag(),
            };
            let guild = GatewayGuild::new(ctx, new_member.guild_id);
            let report = welcome::greet(&guild, &newcomer, &bot.config).await;
            debug!("Finished welcoming {}: {report:?}", newcomer.tag);
        }
        _ => {}
    }
    Ok(())
}

#[instrument(skip_all)]
pub async fn run(config: Config) -> Result<()> {
    let token = config.token.clone();
    let bot = Bot { config };

    // Member joins are only delivered with the privileged members intent.
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::GUILD_MEMBERS;
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            event_handler: |ctx, event, framework, bot| {
                Box::pin(event_handler(ctx, event, framework, bot))
            },
            ..Default::default()
        })
        .token(token)
        .intents(intents)
        .setup(move |_ctx, _ready, _framework| Box::pin(async move { Ok(bot) }));

    framework.run().await?;

    Ok(())
}
