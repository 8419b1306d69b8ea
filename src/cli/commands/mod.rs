//! CLI parser and command dispatch.

mod crawl;
mod languages;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ApiVersion, ClassificationVersion, Settings};

#[derive(Parser)]
#[command(name = "icda")]
#[command(about = "WHO ICD classification acquisition and dataset system")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to icdacquire.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a release and write per-language datasets
    Crawl {
        /// Languages: `all`, or comma-separated codes (e.g. en,es)
        #[arg(short, long)]
        lang: Option<String>,
        /// Release id (e.g. 2024-01), or `latest`
        #[arg(long)]
        release: Option<String>,
        /// Linearization name
        #[arg(long)]
        linearization: Option<String>,
        /// Classification version
        #[arg(long, value_enum)]
        classification_version: Option<ClassificationVersion>,
        /// API-Version header value
        #[arg(long, value_enum)]
        api_version: Option<ApiVersion>,
        /// Dataset output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List the languages a release is published in
    Languages {
        /// Release id (e.g. 2024-01), or `latest`
        #[arg(long)]
        release: Option<String>,
        /// Linearization name
        #[arg(long)]
        linearization: Option<String>,
        /// Classification version
        #[arg(long, value_enum)]
        classification_version: Option<ClassificationVersion>,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Crawl {
            lang,
            release,
            linearization,
            classification_version,
            api_version,
            output_dir,
        } => {
            if let Some(lang) = lang {
                settings.crawl.languages = lang;
            }
            if let Some(release) = release {
                settings.crawl.release = release;
            }
            if let Some(linearization) = linearization {
                settings.crawl.linearization = linearization;
            }
            if let Some(version) = classification_version {
                settings.crawl.classification_version = version;
            }
            if let Some(version) = api_version {
                settings.api.api_version = version;
            }
            if let Some(dir) = output_dir {
                settings.output.dir = dir;
            }
            crawl::cmd_crawl(&settings).await
        }
        Commands::Languages {
            release,
            linearization,
            classification_version,
        } => {
            if let Some(release) = release {
                settings.crawl.release = release;
            }
            if let Some(linearization) = linearization {
                settings.crawl.linearization = linearization;
            }
            if let Some(version) = classification_version {
                settings.crawl.classification_version = version;
            }
            languages::cmd_languages(&settings).await
        }
    }
}
