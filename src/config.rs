use std::{env, fmt};

use color_eyre::{eyre::eyre, Result};
use poise::serenity_prelude as serenity;
use tracing::{info, instrument};

const TOKEN: &str = "DISCORD_TOKEN";
const WELCOME_CHANNEL: &str = "WELCOME_CHANNEL_ID";
const AUTO_ROLE: &str = "AUTO_ROLE_ID";
const RULES_CHANNEL: &str = "RULES_CHANNEL_ID";
const GENERAL_CHANNEL: &str = "GENERAL_CHANNEL_ID";

/// Everything the bot needs, read once at startup and never changed.
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub welcome_channel: serenity::ChannelId,
    pub auto_role: serenity::RoleId,
    pub rules_channel: serenity::ChannelId,
    pub general_channel: serenity::ChannelId,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("welcome_channel", &self.welcome_channel)
            .field("auto_role", &self.auto_role)
            .field("rules_channel", &self.rules_channel)
            .field("general_channel", &self.general_channel)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment, pulling in `.env` first if one exists.
    #[instrument]
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(e) => info!("No .env file loaded ({e})"),
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Every missing or empty variable is reported in a single error so the operator can fix them
    /// all at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let names = [TOKEN, WELCOME_CHANNEL, AUTO_ROLE, RULES_CHANNEL, GENERAL_CHANNEL];

        let mut missing = vec![];
        let mut values = vec![];
        for name in names {
            match lookup(name).map(|value| value.trim().to_owned()) {
                Some(value) if !value.is_empty() => values.push(value),
                _ => missing.push(name),
            }
        }

        if !missing.is_empty() {
            return Err(eyre!("missing configuration: {}", missing.join(", ")));
        }

        let [token, welcome_channel, auto_role, rules_channel, general_channel]: [String; 5] =
            values
                .try_into()
                .map_err(|_| eyre!("configuration lookup returned an unexpected shape"))?;

        Ok(Self {
            token,
            welcome_channel: serenity::ChannelId(snowflake(WELCOME_CHANNEL, &welcome_channel)?),
            auto_role: serenity::RoleId(snowflake(AUTO_ROLE, &auto_role)?),
            rules_channel: serenity::ChannelId(snowflake(RULES_CHANNEL, &rules_channel)?),
            general_channel: serenity::ChannelId(snowflake(GENERAL_CHANNEL, &general_channel)?),
        })
    }
}

fn snowflake(name: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(0) => Err(eyre!("${name} must not be zero")),
        Ok(id) => Ok(id),
        Err(e) => Err(eyre!("${name} is not a valid Discord ID ({value:?}: {e})")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (TOKEN, "secret-token".to_owned()),
            (WELCOME_CHANNEL, "100".to_owned()),
            (AUTO_ROLE, "200".to_owned()),
            (RULES_CHANNEL, "300".to_owned()),
            (GENERAL_CHANNEL, "400".to_owned()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config> {
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn loads_when_everything_is_set() {
        let config = load(&full_env()).unwrap();

        assert_eq!(config.token, "secret-token");
        assert_eq!(config.welcome_channel, serenity::ChannelId(100));
        assert_eq!(config.auto_role, serenity::RoleId(200));
        assert_eq!(config.rules_channel, serenity::ChannelId(300));
        assert_eq!(config.general_channel, serenity::ChannelId(400));
    }

    #[test]
    fn any_single_missing_value_is_fatal() {
        for name in [TOKEN, WELCOME_CHANNEL, AUTO_ROLE, RULES_CHANNEL, GENERAL_CHANNEL] {
            let mut vars = full_env();
            vars.remove(name);

            let err = load(&vars).unwrap_err().to_string();
            assert!(err.contains(name), "{name} not named in {err:?}");
        }
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut vars = full_env();
        vars.insert(AUTO_ROLE, "   ".to_owned());
        vars.insert(TOKEN, String::new());

        let err = load(&vars).unwrap_err().to_string();
        assert_eq!(err, "missing configuration: DISCORD_TOKEN, AUTO_ROLE_ID");
    }

    #[test]
    fn rejects_ids_that_are_not_snowflakes() {
        let mut vars = full_env();
        vars.insert(RULES_CHANNEL, "#rules".to_owned());
        assert!(load(&vars).unwrap_err().to_string().contains(RULES_CHANNEL));

        let mut vars = full_env();
        vars.insert(WELCOME_CHANNEL, "0".to_owned());
        assert!(load(&vars).unwrap_err().to_string().contains(WELCOME_CHANNEL));
    }

    #[test]
    fn debug_output_hides_the_token() {
        let config = load(&full_env()).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
