//! Courier — Telegram bot front end plus the scheduled notification
//! dispatcher. The bot glue is deliberately thin: greet on /start, canned
//! reply to anything else, service messages to the admin chat. The real
//! work happens in `courier-scheduler`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use rand::seq::SliceRandom;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use courier_channels::{TelegramChannel, TelegramConfig};
use courier_core::types::IncomingMessage;
use courier_core::CourierConfig;
use courier_scheduler::{DeliveryClient, NotificationScheduler, NotificationStore};

const GREETING: &str = "<b>Welcome to the learning space.</b>\n\n\
A free learning platform with courses on earning together with us.\n\n\
<b>Everything is available through the app button below.</b>";

#[derive(Parser, Debug)]
#[command(
    name = "courier",
    about = "Telegram bot with a file-backed scheduled notification dispatcher"
)]
struct Cli {
    /// Config file path (default: ~/.courier/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Notification queue file, overrides the configured path.
    #[arg(long)]
    queue: Option<PathBuf>,
    /// Run the scheduler only, without the interactive front end.
    #[arg(long)]
    no_polling: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => CourierConfig::load_from(path)?,
        None => CourierConfig::load()?,
    };
    if let Some(queue) = cli.queue {
        config.queue_path = queue;
    }
    if cli.no_polling {
        config.polling_enabled = false;
    }
    if config.bot_token.is_empty() {
        bail!("No bot token configured (set BOT_TOKEN or bot_token in the config file)");
    }

    let sender = Arc::new(TelegramChannel::new(TelegramConfig::new(&config.bot_token)));
    let me = sender
        .get_me()
        .await
        .context("Telegram credentials check failed")?;
    tracing::info!(
        "Bot online: @{} ({})",
        me.username.as_deref().unwrap_or("unknown"),
        me.first_name
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let store = NotificationStore::new(&config.queue_path);
    let scheduler = NotificationScheduler::new(store, DeliveryClient::new(sender.clone()))
        .with_cycle_interval(Duration::from_secs(config.cycle_interval_secs));
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx.clone()));

    if let Some(admin) = config.admin_chat_id {
        if let Err(e) = sender.send_message(admin, "🤖 Bot started").await {
            tracing::warn!("Failed to notify admin chat: {e}");
        }
    }

    let polling_task = if config.polling_enabled {
        // get_updates tracks its own offset, so the polling loop owns a
        // separate channel instance; the Arc'd one is send-only.
        let channel = TelegramChannel::new(TelegramConfig::new(&config.bot_token));
        Some(tokio::spawn(run_bot(
            channel,
            sender.clone(),
            config.clone(),
            shutdown_rx,
        )))
    } else {
        None
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    scheduler_task.await.ok();
    if let Some(task) = polling_task {
        task.await.ok();
    }

    if let Some(admin) = config.admin_chat_id {
        let _ = sender.send_message(admin, "🤖 Bot stopped").await;
    }
    Ok(())
}

/// Long-polling front end. Exits when the shutdown flag flips.
async fn run_bot(
    mut channel: TelegramChannel,
    sender: Arc<TelegramChannel>,
    config: CourierConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!("Bot polling loop started");
    loop {
        let updates = tokio::select! {
            _ = shutdown.changed() => break,
            result = channel.get_updates() => match result {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::error!("Polling error: {e}");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    continue;
                }
            }
        };
        for update in updates {
            if let Some(msg) = update.to_incoming() {
                handle_message(&sender, &config, &msg).await;
            }
        }
    }
    tracing::info!("Bot polling loop stopped");
}

async fn handle_message(sender: &TelegramChannel, config: &CourierConfig, msg: &IncomingMessage) {
    let name = msg.sender_name.as_deref().unwrap_or("someone");

    if let Some(payload) = msg.start_payload() {
        tracing::info!("{name} pressed start");
        if !payload.is_empty() {
            tracing::info!("Deep-link payload: {payload}");
        }
        if let Err(e) = sender.send_message(msg.chat_id, GREETING).await {
            tracing::error!("Failed to greet chat {}: {e}", msg.chat_id);
        }
        if let Some(admin) = config.admin_chat_id {
            let service = format!(
                "👤 @{} {name} pressed /start",
                msg.username.as_deref().unwrap_or("-")
            );
            if let Err(e) = sender.send_message(admin, &service).await {
                tracing::warn!("Service message failed: {e}");
            }
        }
        return;
    }

    tracing::info!("Fallback: {name} wrote: {}", msg.text);
    let reply = config
        .fallback_replies
        .choose(&mut rand::thread_rng())
        .cloned();
    if let Some(reply) = reply {
        if let Err(e) = sender.send_message(msg.chat_id, &reply).await {
            tracing::error!("Failed to reply to chat {}: {e}", msg.chat_id);
        }
    }
}
