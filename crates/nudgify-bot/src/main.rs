//! CLI binary for nudgify.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nudgify_core::Config;
use nudgify_core::app::{AppBuilder, SweepReport, keepalive};
use nudgify_core::impls::{InMemoryTaskStore, JsonFileStore, RecordingMessenger, TelegramClient};
use nudgify_core::ports::TaskStore;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Nudgify: register tasks over chat, get nudged the day before they are due.
#[derive(Parser)]
#[command(name = "nudgify", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the chat bot (long polling) and the keep-alive endpoint.
    Serve,

    /// Send reminders for tasks due tomorrow, then exit. Meant for cron.
    Sweep {
        /// Log the reminders that would be sent without sending or saving.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env は無くてもよい
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nudgify=info,nudgify_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Sweep { dry_run: false } => sweep(config).await,
        Command::Sweep { dry_run: true } => dry_run_sweep(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let telegram = Arc::new(TelegramClient::new(&config.telegram)?);
    let app = AppBuilder::new()
        .store(Arc::new(JsonFileStore::new(&config.store.path)))
        .messenger(telegram.clone())
        .updates(telegram)
        .zone(config.reminder.zone()?)
        .require_updates()
        .build()?;
    let bot = app
        .bot_loop()
        .context("bot loop requires an update source")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let keepalive_task = if config.keepalive.enabled {
        let listener = keepalive::bind(&config.keepalive).await.with_context(|| {
            format!(
                "cannot bind keep-alive server on {}:{}",
                config.keepalive.host, config.keepalive.port
            )
        })?;
        Some(tokio::spawn(keepalive::serve(listener, shutdown_rx)))
    } else {
        None
    };

    info!(store = %config.store.path.display(), "🤖 Nudgify Bot is running...");
    let handle = bot.spawn();

    tokio::signal::ctrl_c()
        .await
        .context("cannot listen for shutdown signal")?;
    info!("shutting down");

    handle.shutdown_and_join().await;
    let _ = shutdown_tx.send(true);
    if let Some(task) = keepalive_task {
        if let Err(e) = task.await? {
            warn!(error = %e, "keep-alive server stopped with an error");
        }
    }
    Ok(())
}

async fn sweep(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let app = AppBuilder::new()
        .store(Arc::new(JsonFileStore::new(&config.store.path)))
        .messenger(Arc::new(TelegramClient::new(&config.telegram)?))
        .zone(config.reminder.zone()?)
        .build()?;

    let report = app.sweep().run().await?;
    log_report(&report);
    Ok(())
}

/// ファイルを読むだけで、送信も保存もしない
async fn dry_run_sweep(config: Config) -> anyhow::Result<()> {
    let tasks = JsonFileStore::new(&config.store.path).load()?;
    let messenger = Arc::new(RecordingMessenger::new());

    let app = AppBuilder::new()
        .store(Arc::new(InMemoryTaskStore::with_tasks(tasks)))
        .messenger(messenger.clone())
        .zone(config.reminder.zone()?)
        .build()?;

    let report = app.sweep().run().await?;
    for message in messenger.sent() {
        info!(chat_id = %message.chat_id, text = %message.text, "dry run: would send");
    }
    log_report(&report);
    Ok(())
}

fn log_report(report: &SweepReport) {
    if report.sent == 0 {
        info!(
            due = report.due,
            failed = report.failed,
            invalid_dates = report.invalid_dates,
            "No reminders to send today."
        );
    } else {
        info!(
            sent = report.sent,
            failed = report.failed,
            invalid_dates = report.invalid_dates,
            persisted = report.persisted,
            "Reminders sent."
        );
    }
}
