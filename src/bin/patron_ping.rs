//! CLI binary for patron-ping.

use clap::{Parser, Subcommand};
use patreon_api::{CachedSource, PatreonClient, SnapshotSource};
use patron_ping::notify::{DiscordWebhookNotifier, LogOnlyNotifier};
use patron_ping::{Channel, Dispatcher, Monitor, Notification, Notifier, PingConfig, StateStore};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Announce Patreon patron milestones to Discord.
#[derive(Parser)]
#[command(name = "patron-ping", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve the cached snapshot and only log notifications.
    #[arg(long)]
    debug: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Poll until interrupted (default).
    Run,

    /// Run a single cycle and print what it did.
    Once,

    /// Print the persisted milestone state.
    ShowState,

    /// Send one message to a channel (`public` or `private`).
    Notify {
        /// Target channel.
        channel: String,
        /// Message text.
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `show-state` output stays clean JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("patron_ping=info,patreon_api=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = PingConfig::load(cli.config.as_deref())?;
    if cli.debug {
        config.monitor.debug = true;
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config, false).await,
        Command::Once => run(config, true).await,
        Command::ShowState => show_state(&config),
        Command::Notify { channel, text } => notify(&config, &channel, &text).await,
    }
}

async fn run(config: PingConfig, once: bool) -> anyhow::Result<()> {
    config.validate()?;

    let client = PatreonClient::new(config.patreon.clone())?;
    let store = StateStore::new(&config.monitor.state_path);

    if config.monitor.debug {
        info!(
            cache = %config.monitor.cache_path.display(),
            "debug mode: using snapshot cache, notifications are only logged"
        );
        let source = CachedSource::new(client, &config.monitor.cache_path);
        let dispatcher = Dispatcher::new(LogOnlyNotifier, Duration::ZERO);
        drive(Monitor::new(source, dispatcher, store)?, &config, once).await
    } else {
        let notifier = DiscordWebhookNotifier::new(&config.discord)?;
        let dispatcher = Dispatcher::new(notifier, config.discord.send_delay());
        drive(Monitor::new(client, dispatcher, store)?, &config, once).await
    }
}

async fn drive<S: SnapshotSource, N: Notifier>(
    monitor: Monitor<S, N>,
    config: &PingConfig,
    once: bool,
) -> anyhow::Result<()> {
    let mut monitor = monitor.with_poll_interval(config.monitor.poll_interval());

    if once {
        let report = monitor.run_cycle().await?;
        println!(
            "{} patrons, {} notifications ({} undelivered), {} state writes",
            report.patrons,
            report.notifications,
            report.delivery_failures,
            report.persisted_writes
        );
        return Ok(());
    }

    // Handle Ctrl+C
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down after the current cycle...");
            cancel_clone.cancel();
        }
    });

    monitor.run(cancel).await;
    Ok(())
}

fn show_state(config: &PingConfig) -> anyhow::Result<()> {
    let state = StateStore::new(&config.monitor.state_path).load()?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

async fn notify(config: &PingConfig, channel: &str, text: &str) -> anyhow::Result<()> {
    let notification = [Notification::new(channel.parse::<Channel>()?, text)];

    let failures = if config.monitor.debug {
        Dispatcher::new(LogOnlyNotifier, Duration::ZERO)
            .dispatch(&notification)
            .await
    } else {
        Dispatcher::new(DiscordWebhookNotifier::new(&config.discord)?, Duration::ZERO)
            .dispatch(&notification)
            .await
    };
    anyhow::ensure!(
        failures == 0,
        "message to {} was not delivered",
        notification[0].channel
    );

    println!("sent to {}", notification[0].channel);
    Ok(())
}
