use std::collections::HashSet;

use anyhow::{Context as _, Result, bail};

/// Channels allowed to trigger commands. Empty means every channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelAllowList {
    entries: HashSet<(u64, u64)>,
}

impl ChannelAllowList {
    /// Parses comma-separated `guildId/channelId` tokens. An empty string
    /// yields the allow-all list.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut entries = HashSet::new();

        if raw.trim().is_empty() {
            return Ok(Self { entries });
        }

        for token in raw.split(',').map(str::trim) {
            let Some((guild, channel)) = token.split_once('/') else {
                bail!("allow-list entry `{token}` is not in guildId/channelId form");
            };
            let guild: u64 = guild
                .trim()
                .parse()
                .with_context(|| format!("invalid guild id in allow-list entry `{token}`"))?;
            let channel: u64 = channel
                .trim()
                .parse()
                .with_context(|| format!("invalid channel id in allow-list entry `{token}`"))?;
            entries.insert((guild, channel));
        }

        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn allows(&self, guild_id: Option<u64>, channel_id: u64) -> bool {
        if self.entries.is_empty() {
            return true;
        }

        match guild_id {
            Some(guild) => self.entries.contains(&(guild, channel_id)),
            None => false,
        }
    }
}
