//! Dataset persistence as JSON Lines on disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::models::LanguageDatasets;

/// Chapters table name.
pub const CHAPTERS_TABLE: &str = "chapters";
/// Categories table name.
pub const CATEGORIES_TABLE: &str = "categories";
/// Postcoordination table name.
pub const POSTCOORDINATION_TABLE: &str = "postcoordination";

/// Construct the file path for one table in one language:
/// `{output_dir}/{table}/{language}.jsonl`
pub fn dataset_path(output_dir: &Path, table: &str, language: &str) -> PathBuf {
    output_dir.join(table).join(format!("{language}.jsonl"))
}

/// Write rows as JSON Lines, creating parent directories as needed.
///
/// Zero rows still produce the (empty) file, so a completed language is
/// distinguishable from an unattempted one.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(())
}

/// Persist all three tables for one crawled language.
///
/// Returns the written paths in table order.
pub fn write_language_datasets(
    output_dir: &Path,
    datasets: &LanguageDatasets,
) -> anyhow::Result<Vec<PathBuf>> {
    let chapters = dataset_path(output_dir, CHAPTERS_TABLE, &datasets.language);
    write_rows(&chapters, &datasets.chapters)?;

    let categories = dataset_path(output_dir, CATEGORIES_TABLE, &datasets.language);
    write_rows(&categories, &datasets.categories)?;

    let postcoordination = dataset_path(output_dir, POSTCOORDINATION_TABLE, &datasets.language);
    write_rows(&postcoordination, &datasets.postcoordination)?;

    info!(
        "Wrote {} rows for language {} under {}",
        datasets.row_count(),
        datasets.language,
        output_dir.display()
    );

    Ok(vec![chapters, categories, postcoordination])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryRecord, ChapterRecord};
    use tempfile::tempdir;

    #[test]
    fn test_dataset_path() {
        let path = dataset_path(Path::new("/data"), CHAPTERS_TABLE, "en");
        assert_eq!(path, PathBuf::from("/data/chapters/en.jsonl"));
    }

    #[test]
    fn test_write_rows_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dataset_path(dir.path(), CHAPTERS_TABLE, "en");

        let rows = vec![
            ChapterRecord {
                code: "01".to_string(),
                title: Some("Certain infectious or parasitic diseases".to_string()),
                uri: "https://id.who.int/icd/release/11/2024-01/mms/1".to_string(),
                ..Default::default()
            },
            ChapterRecord {
                code: "02".to_string(),
                uri: "https://id.who.int/icd/release/11/2024-01/mms/2".to_string(),
                ..Default::default()
            },
        ];
        write_rows(&path, &rows).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ChapterRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, rows[0]);
    }

    #[test]
    fn test_empty_table_still_creates_file() {
        let dir = tempdir().unwrap();
        let path = dataset_path(dir.path(), POSTCOORDINATION_TABLE, "ar");

        let rows: Vec<CategoryRecord> = vec![];
        write_rows(&path, &rows).unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_write_language_datasets() {
        let dir = tempdir().unwrap();
        let mut datasets = LanguageDatasets::new("es");
        datasets.chapters.push(ChapterRecord {
            code: "01".to_string(),
            uri: "u".to_string(),
            ..Default::default()
        });

        let paths = write_language_datasets(dir.path(), &datasets).unwrap();
        assert_eq!(paths.len(), 3);
        for path in &paths {
            assert!(path.exists());
        }
        assert_eq!(paths[0], dataset_path(dir.path(), CHAPTERS_TABLE, "es"));
    }
}
