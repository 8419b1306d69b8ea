//! Release crawl command.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::client::{CredentialGate, IcdClient, TokenEndpoint};
use crate::config::{Credentials, LanguageSelection, Settings};
use crate::crawler::{CancelToken, ClassificationWalker, WalkEvent};
use crate::models::LanguageDatasets;
use crate::storage;

/// Crawl the configured release and write datasets for each language.
pub async fn cmd_crawl(settings: &Settings) -> anyhow::Result<()> {
    let walker = connect(settings).await?;
    println!("{} Connected to {}", style("✓").green(), walker.root_uri());

    let languages = match settings.language_selection() {
        LanguageSelection::All => walker.available_languages().await?,
        LanguageSelection::Explicit(codes) => codes,
    };
    if languages.is_empty() {
        anyhow::bail!("No languages selected");
    }
    println!(
        "{} Crawling {} language(s): {}",
        style("→").cyan(),
        languages.len(),
        languages.join(", ")
    );

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nStopping after the current fetch...");
                cancel.cancel();
            }
        });
    }

    let started = std::time::Instant::now();
    let mut interrupted = false;

    for language in &languages {
        let (tx, mut rx) = mpsc::channel(64);

        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        bar.set_message(format!("Processing chapters ({language})..."));

        let ui_bar = bar.clone();
        let ui = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    WalkEvent::RootExpanded { children } => ui_bar.set_length(children as u64),
                    WalkEvent::TopLevelCompleted => ui_bar.inc(1),
                }
            }
        });

        let mut datasets = LanguageDatasets::new(language.as_str());
        let result = walker
            .walk_into(language, &mut datasets, &cancel, Some(&tx))
            .await;
        drop(tx);
        let _ = ui.await;
        bar.finish_and_clear();

        match result {
            Ok(()) => {
                storage::write_language_datasets(&settings.output.dir, &datasets)?;
                println!(
                    "  {} {}: {} chapters, {} categories, {} postcoordination",
                    style("✓").green(),
                    language,
                    datasets.chapters.len(),
                    datasets.categories.len(),
                    datasets.postcoordination.len()
                );
            }
            Err(e) if e.is_cancellation() => {
                storage::write_language_datasets(&settings.output.dir, &datasets)?;
                println!(
                    "  {} {}: interrupted, partial datasets written ({} rows)",
                    style("!").yellow(),
                    language,
                    datasets.row_count()
                );
                interrupted = true;
                break;
            }
            Err(e) => {
                println!("  {} {}: {}", style("✗").red(), language, e);
                return Err(e.into());
            }
        }
    }

    let verb = if interrupted { "stopped" } else { "finished" };
    println!(
        "{} Crawl {} after {}s, datasets under {}",
        style("✓").green(),
        verb,
        started.elapsed().as_secs(),
        settings.output.dir.display()
    );

    Ok(())
}

/// Build the production walker from settings and environment credentials.
pub(super) async fn connect(
    settings: &Settings,
) -> anyhow::Result<ClassificationWalker<IcdClient, TokenEndpoint>> {
    let credentials = Credentials::from_env()?;
    let provider = TokenEndpoint::new(
        settings.api.token_endpoint.clone(),
        credentials.client_id,
        credentials.client_secret,
        settings.timeout(),
    );
    let gate = CredentialGate::new(provider, settings.refresh_after(), settings.cooldown());
    let client = IcdClient::new(
        settings.api.api_version,
        settings.timeout(),
        settings.request_delay(),
    );

    let walker = ClassificationWalker::connect(client, gate, &settings.target()).await?;
    Ok(walker)
}
