use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use agentweave_core::config::AppConfig;
use agentweave_gateway::{GatewayServer, Store};

#[derive(Parser)]
#[command(name = "agentweave", version, about = "Agent workflow pipeline service")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "agentweave.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve,
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        AppConfig::load(&cli.config)?
    } else {
        warn!(
            path = %cli.config.display(),
            "Config file not found, using defaults and environment"
        );
        AppConfig::from_env()
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Serve => serve(config).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let client = match &config.model.api_key {
        Some(_) => Some(agentweave_llm::create_client(&config.model)),
        None => {
            warn!("No provider credential configured; completion agents will report errors");
            None
        }
    };

    let store = Arc::new(Store::new());
    info!(
        agents = store.list_agents().len(),
        "Store seeded with default agents"
    );

    let server = GatewayServer::new(config, store, client);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    server.run(shutdown).await
}
