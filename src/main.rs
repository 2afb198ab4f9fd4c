use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hubgate::config::{Config, Overrides};
use hubgate::AppState;

#[derive(Parser, Debug)]
#[command(name = "hubgate")]
#[command(author, version, about = "GitHub App backend that proxies installation-scoped API calls", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hubgate.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// GitHub App ID
    #[arg(long, env = "GITHUB_APP_ID")]
    app_id: Option<String>,

    /// Path to the GitHub App private key (PEM)
    #[arg(long, env = "GITHUB_PRIVATE_KEY_PATH")]
    private_key: Option<PathBuf>,

    /// Secret used to verify webhook deliveries
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?.apply(Overrides {
        app_id: cli.app_id,
        private_key_path: cli.private_key,
        webhook_secret: cli.webhook_secret,
        port: cli.port,
    });

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting hubgate v{}", env!("CARGO_PKG_VERSION"));

    let state = Arc::new(AppState::from_config(config)?);
    let config = &state.config;

    tracing::info!(
        app_id = %state.github.app_id(),
        api = %config.github.api_base_url,
        "GitHub App credentials loaded"
    );
    if config.webhooks.github_secret.is_none() {
        tracing::warn!("No webhook secret configured; POST /webhook will reject all deliveries");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", addr);

    let app = hubgate::api::create_router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
