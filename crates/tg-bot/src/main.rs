//! tg-bot - telegram-cli command router. Main entry point.

use anyhow::Context;
use std::sync::Arc;
use tg_bot::commands::*;
use tg_bot::config::Config;
use tg_bot::dispatch::Dispatcher;
use tg_bot::error::AppResult;
use tg_client::TgProcess;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting tg-bot...");

    // Spawn the telegram-cli subprocess; the bot cannot run without it.
    let process = TgProcess::spawn(&config.tg.binary, &config.tg.pubkey, &config.tg.script)?;
    let (receiver, sink, child) = process.split()?;
    let sink = Arc::new(sink);

    // Command registry. Declared order is both the help-listing order
    // and the match-priority order.
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(EchoCommand::new(sink.clone(), config.echo.clone())),
        Box::new(RosterCommand::new(sink.clone(), config.roster.clone())),
        Box::new(QuotesCommand::new(sink.clone(), config.quotes.clone())?),
        Box::new(TweetCommand::new(sink.clone(), config.tweet.clone())),
        Box::new(PicsCommand::new(sink.clone(), config.pics.clone())),
        Box::new(VoiceCommand::new(sink.clone(), config.voice.clone())),
    ];

    let enabled = commands.iter().filter(|c| c.enabled()).count();
    info!("Registered {} commands ({} enabled)", commands.len(), enabled);
    if let Some(chat) = &config.bot.monitored_chat {
        info!("Monitoring chat {}", chat);
    } else {
        info!("Monitoring all chats");
    }

    let dispatcher = Dispatcher::new(commands, config.bot.monitored_chat.clone(), sink);
    dispatcher.run_loop(receiver.stream()).await?;

    info!("Shutting down...");
    dispatcher.shutdown_all().await;

    let status = child.wait().await?;
    info!("telegram-cli exited with {}", status);

    info!("Bye!");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
