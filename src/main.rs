//! Universal Bot - Main Entry Point
//!
//! Connects to the WhatsApp bridge, answers slash commands from any chat and
//! keeps a liveness endpoint up until asked to stop.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use universal_bot::bot::Bot;
use universal_bot::commands::CommandRouter;
use universal_bot::config::{BotSettings, BridgeConfig};
use universal_bot::health;
use universal_bot::messaging::{BridgeClient, Messenger, SessionEvent};
use universal_bot::scheduler::SendScheduler;
use universal_bot::session::BotSession;
use universal_bot::shutdown::{ShutdownReason, ShutdownRequester};

/// Command-driven WhatsApp responder bot.
#[derive(Parser, Debug)]
#[command(name = "universal_bot")]
#[command(about = "Answer slash commands in WhatsApp chats")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error). Overrides `RUST_LOG`.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables before logging so RUST_LOG from the file applies
    let env_loaded = dotenvy::from_filename(&args.env_file);

    let settings = BotSettings::from_env_with_defaults();
    init_logging(args.log_level.as_deref().unwrap_or(&settings.log_level));

    if let Err(e) = env_loaded {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let bridge_config =
        BridgeConfig::from_env().context("Failed to load bridge configuration from environment")?;

    let bridge = Arc::new(BridgeClient::new(bridge_config).context("Failed to create bridge client")?);
    let messenger: Arc<dyn Messenger> = bridge.clone();

    let mut events = bridge
        .connect()
        .await
        .context("Failed to start WhatsApp session")?;

    let port = settings.port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port).await {
            error!("Health endpoint failed: {}", e);
        }
    });

    let session = Arc::new(BotSession::new());
    let scheduler = Arc::new(SendScheduler::new(Arc::clone(&messenger)));
    let (shutdown, mut shutdown_rx) = ShutdownRequester::new(settings.shutdown_delay());

    let router = CommandRouter::new(
        Arc::clone(&messenger),
        Arc::clone(&session),
        Arc::clone(&scheduler),
        shutdown,
    );
    let bot = Arc::new(Bot::new(messenger, session, router));

    info!("Starting universal bot...");
    info!("Bot is running. Use Ctrl+C to stop.");

    let signal = wait_for_signal();
    tokio::pin!(signal);

    let reason = loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(SessionEvent::Message(message)) => {
                    let bot = Arc::clone(&bot);
                    tokio::spawn(async move {
                        bot.on_message(&message).await;
                    });
                }
                Some(event) => bot.handle_event(event).await,
                None => break ShutdownReason::StreamClosed,
            },
            Some(reason) = shutdown_rx.recv() => break reason,
            () = &mut signal => break ShutdownReason::Signal,
        }
    };

    // Cleanup
    info!("Shutting down ({})...", reason);
    scheduler.shutdown();
    if let Err(e) = bridge.destroy().await {
        error!("Failed to stop bridge session: {}", e);
    }

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C"),
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                error!("Could not register SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                info!("Received Ctrl+C");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C");
    }
}
