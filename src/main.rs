use clap::Parser;
use tracing_subscriber::EnvFilter;

use tradebook::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tradebook=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    // Initialize configuration (this loads the config singleton)
    let config = tradebook::config::config().clone();
    tracing::info!("Starting Tradebook in {:?} mode", config.environment);

    cli::run(cli, config).await
}
