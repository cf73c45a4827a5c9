use std::sync::Arc;

use command::Dispatcher;
use discord::DiscordMessenger;

pub mod command;
pub mod config;
pub mod discord;
pub mod ephemeral;
pub mod platform;
pub mod ticker;

pub struct Data {
    pub dispatcher: Arc<Dispatcher<DiscordMessenger>>,
}

pub type Error = anyhow::Error;
