use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use laneboard::config::ServerConfig;
use laneboard::server;

#[derive(Parser)]
#[command(name = "laneboard")]
#[command(version, about = "Multi-tenant Kanban task tracker API server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,

        /// Development mode: bind on all interfaces and allow any CORS origin
        #[arg(long)]
        dev: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, db, dev } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(db) = db {
                config.db_path = db;
            }
            if dev {
                config.dev_mode = true;
            }
            server::start_server(config).await
        }
    }
}
