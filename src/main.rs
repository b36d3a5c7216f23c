//! Phonebook MCP Server - Main entry point
//!
//! Opens the configured phonebook store and serves it over MCP on stdio.

use anyhow::Result;
use phonebook_mcp_server::repositories::{PhonebookRepository, SqlitePhonebookRepository};
use phonebook_mcp_server::{Config, Metrics, Phonebook, PhonebookMcpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // Load configuration before logging so LOG_LEVEL can seed the filter
    let config = Config::from_env();
    let fallback_level = config
        .as_ref()
        .map(|cfg| cfg.log_level.clone())
        .unwrap_or_else(|_| "error".to_string());

    // Initialize logging (stderr only to avoid polluting stdout/MCP communication)
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match config {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize storage
    let repository = if config.is_in_memory() {
        info!("Using in-memory phonebook storage");
        SqlitePhonebookRepository::in_memory()?
    } else {
        info!("Using phonebook database at {}", config.db_path.display());
        SqlitePhonebookRepository::open(&config.db_path, config.busy_timeout())?
    };
    let repository = Arc::new(repository) as Arc<dyn PhonebookRepository>;

    // The phonebook must load completely before any request is served
    let phonebook = match Phonebook::open(repository, Metrics::new()).await {
        Ok(phonebook) => Arc::new(phonebook),
        Err(e) => {
            error!("Failed to initialize phonebook: {}", e);
            return Err(e.into());
        }
    };

    let server = PhonebookMcpServer::new(phonebook.clone());
    info!("Phonebook MCP Server initialized");

    // Run the server (this will block until the server exits)
    info!("Starting MCP server with stdio transport");
    phonebook_mcp_server::server::run_server(server).await?;

    info!("Storage metrics: {:?}", phonebook.metrics().summary());
    info!("Phonebook MCP Server shutdown complete");
    Ok(())
}
