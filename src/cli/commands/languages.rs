//! Language listing command.

use console::style;

use crate::config::Settings;

/// Print the languages the configured release is published in.
pub async fn cmd_languages(settings: &Settings) -> anyhow::Result<()> {
    let walker = super::crawl::connect(settings).await?;
    let languages = walker.available_languages().await?;

    println!(
        "{} {} advertises {} language(s):",
        style("✓").green(),
        walker.root_uri(),
        languages.len()
    );
    for language in languages {
        println!("  {language}");
    }

    Ok(())
}
