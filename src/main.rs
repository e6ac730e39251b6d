use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spiegeld::{Config, MirrorEngine};

#[derive(Parser, Debug)]
#[command(name = "spiegeld", about = "Recurring directory mirror daemon")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "spiegeld.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spiegeld=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config).await?;
    config.ensure_roots().await?;

    info!(
        "Starting spiegeld: mirroring {:?} -> {:?} every {}s",
        config.source_root, config.dest_root, config.cycle_interval_secs
    );

    let engine = MirrorEngine::new(config)?;
    let token = CancellationToken::new();

    let signal_token = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown signal received");
        signal_token.cancel();
    });

    engine.run(token).await;
    info!("spiegeld stopped");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
