// ABOUTME: Main entry point for the vanir Discord bot
// ABOUTME: Initializes logging, config, the session store, and the Discord gateway client

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vanir::{config::Config, dispatch::Dispatcher, session::Session};

#[derive(Parser, Debug)]
#[command(name = "vanir")]
#[command(about = "Discord chat bot with a shared AI conversation and configurable presence")]
#[command(version)]
struct Cli {
    /// Path to config.toml (overrides VANIR_CONFIG_PATH and the default locations)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic hook to log panics before they crash the process
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("\n╔══════════════════════════════════════════════════════════╗");
        eprintln!("║ PANIC! Bot crashed with the following error:            ║");
        eprintln!("╚══════════════════════════════════════════════════════════╝\n");
        eprintln!("{}", panic_info);
        eprintln!("\nBacktrace:");
        eprintln!("{:?}", std::backtrace::Backtrace::force_capture());
    }));

    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,serenity=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting vanir");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load_from(cli.config.as_deref())?;

    tracing::info!(
        endpoint = %config.completion.endpoint,
        model = %config.completion.model,
        db_path = %config.storage.path,
        reply_floor_ms = config.conversation.reply_floor_ms,
        restore_on_start = config.presence.restore_on_start,
        "Configuration loaded"
    );

    let session = Arc::new(Session::from_config(&config)?);
    let dispatcher = Arc::new(Dispatcher::from_config(session, &config));

    run_platform(&config, dispatcher).await
}

#[cfg(feature = "discord")]
async fn run_platform(config: &Config, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let platform = vanir::platform::DiscordPlatform::new(config.discord.bot_token.clone(), dispatcher);
    platform.run().await
}

#[cfg(not(feature = "discord"))]
async fn run_platform(_config: &Config, _dispatcher: Arc<Dispatcher>) -> Result<()> {
    anyhow::bail!("vanir was built without a chat platform; enable the `discord` feature")
}
