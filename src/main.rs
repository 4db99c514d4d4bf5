use std::path::PathBuf;

use anyhow::{Context, Result};
use haiku::{AppState, DocumentStore, HaikuConfig, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config_arg(std::env::args().skip(1));
    let config = HaikuConfig::load_from_path(config_path)?;

    logging::init(&config.logging)?;

    if config.weather.api_key.is_none() {
        tracing::warn!("No weather API key configured; weather endpoints will report an error");
    }
    if config.suggestion.api_key.is_none() {
        tracing::warn!("No Gemini API key configured; suggestions will be placeholders");
    }

    let store = DocumentStore::open(&config.store.path)
        .with_context(|| format!("Failed to open document store at {}", config.store.path))?;
    tracing::info!("Document store opened at {}", config.store.path);

    let state = AppState::from_config(&config, store)?;
    web::run(&config.server, state).await
}

/// `--config <path>` or `--config=<path>`
fn config_arg(mut args: impl Iterator<Item = String>) -> Option<PathBuf> {
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}
