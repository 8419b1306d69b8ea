//! ICDAcquire - WHO ICD classification acquisition and dataset system.
//!
//! A tool for crawling WHO ICD classification releases and producing
//! per-language chapter, category, and postcoordination datasets.

mod cli;
mod client;
mod config;
mod crawler;
mod error;
mod models;
mod storage;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "icdacquire=debug"
    } else {
        "icdacquire=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
