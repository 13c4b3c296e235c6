pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "tradebook")]
#[command(about = "Tradebook - role-gated trade data API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on [env: TRADEBOOK_PORT, PORT; default 3000]")]
        port: Option<u16>,
    },

    #[command(about = "Import a CSV file straight into the trade store")]
    Import {
        #[arg(help = "Path to the CSV file")]
        path: PathBuf,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(config, port).await,
        Commands::Import { path } => commands::import::handle(config, path).await,
    }
}
