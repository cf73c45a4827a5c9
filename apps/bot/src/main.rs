use std::sync::{Arc, OnceLock};

use anyhow::Result;
use bot::{
    Data, Error,
    command::Dispatcher,
    config::Config,
    discord::{self, DiscordMessenger, DiscordPresence},
    ephemeral::EphemeralReplies,
    ticker::PriceTicker,
};
use poise::{Framework, FrameworkOptions};
use price::{PriceClient, PriceState};
use serenity::all::{ClientBuilder, FullEvent, GatewayIntents};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let price_client = PriceClient::from_env()?;

    info!(
        version = %config.version,
        pair = price_client.currency_pair(),
        interval_ms = config.poll_interval.as_millis() as u64,
        allow_list_entries = config.allow_list.len(),
        "starting price bot"
    );

    let state = Arc::new(PriceState::new());
    // Filled in the ready hook so shutdown can reach pending deletions.
    let dispatcher_slot: Arc<OnceLock<Arc<Dispatcher<DiscordMessenger>>>> = Arc::default();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let framework = Framework::builder()
        .options(FrameworkOptions::<Data, Error> {
            event_handler: |_serenity_ctx, event, _framework_ctx, data| {
                Box::pin(async move {
                    if let FullEvent::Message { new_message } = event {
                        data.dispatcher
                            .handle(&discord::inbound_message(new_message))
                            .await;
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup({
            let dispatcher_slot = Arc::clone(&dispatcher_slot);
            let state = Arc::clone(&state);
            let prefix = config.prefix.clone();
            let allow_list = config.allow_list.clone();
            let interval = config.poll_interval;

            move |ctx, ready, _framework| {
                Box::pin(async move {
                    info!(
                        "{} [{}] connected successfully!",
                        ready.user.name, ready.user.id
                    );

                    // Shares the gateway client's Http and its rate limiter.
                    let dispatcher = Arc::new(Dispatcher::new(
                        prefix,
                        allow_list,
                        Arc::clone(&state),
                        EphemeralReplies::new(DiscordMessenger::new(Arc::clone(&ctx.http))),
                    ));
                    let _ = dispatcher_slot.set(Arc::clone(&dispatcher));

                    let ticker = PriceTicker::new(
                        price_client,
                        DiscordPresence::new(ctx.clone()),
                        state,
                        interval,
                    );
                    tokio::spawn(ticker.run());

                    Ok(Data { dispatcher })
                })
            }
        })
        .build();

    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    let mut client_task = tokio::spawn(async move { client.start().await });

    tokio::select! {
        res = &mut client_task => {
            match res {
                Ok(Ok(())) => info!("client stopped"),
                Ok(Err(why)) => {
                    error!("Client error: {why:?}");
                    return Err(why.into());
                }
                Err(e) => {
                    error!("client task failed: {e:?}");
                    return Err(e.into());
                }
            }
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    if config.cancel_pending_on_shutdown
        && let Some(dispatcher) = dispatcher_slot.get()
    {
        dispatcher.replies().cancel_all();
    }

    shard_manager.shutdown_all().await;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::{
            select,
            signal::unix::{SignalKind, signal},
        };
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
