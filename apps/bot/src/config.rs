use std::{env::var, time::Duration};

use anyhow::{Context as _, Result, bail};

use crate::command::ChannelAllowList;

#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,
    pub version: String,
    pub poll_interval: Duration,
    pub allow_list: ChannelAllowList,
    pub prefix: String,
    pub cancel_pending_on_shutdown: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} not set"));

        let minutes: u64 = required("SLEEP_TIME")?
            .trim()
            .parse()
            .context("SLEEP_TIME must be a whole number of minutes")?;
        if minutes == 0 {
            bail!("SLEEP_TIME must be at least 1 minute");
        }
        let poll_ms = minutes
            .checked_mul(60 * 1000)
            .context("SLEEP_TIME is too large")?;

        let allow_list = ChannelAllowList::parse(&lookup("DISCORD_LISTEN").unwrap_or_default())
            .context("invalid DISCORD_LISTEN")?;

        let cancel_pending_on_shutdown = match lookup("CANCEL_PENDING_ON_SHUTDOWN") {
            Some(v) => v
                .trim()
                .parse()
                .context("CANCEL_PENDING_ON_SHUTDOWN must be true or false")?,
            None => false,
        };

        Ok(Self {
            discord_token: required("DISCORD_BOT_TOKEN")?,
            version: lookup("APP_VERSION").unwrap_or_else(|| "Unknown".to_string()),
            poll_interval: Duration::from_millis(poll_ms),
            allow_list,
            prefix: required("DISCORD_PREFIX")?,
            cancel_pending_on_shutdown,
        })
    }
}
