//! Dataset row types produced by the crawl.
//!
//! Rows keep the absent-vs-empty distinction from the wire models: a field
//! the API never sent serializes as `null`, while a present-but-empty list
//! serializes as `[]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fields enriched from a node's foundation entity.
///
/// All `None` (and `f_uri` absent) when the linearization node carries no
/// `source` URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundationFields {
    /// Fully specified name.
    pub fully_specified_name: Option<String>,
    /// Synonym labels.
    pub synonym: Option<Vec<String>>,
    /// Inclusion labels.
    pub inclusion: Option<Vec<String>>,
    /// Exclusion labels.
    pub exclusion: Option<Vec<String>>,
    /// Related perinatal-chapter entity labels.
    pub related_in_perinatal: Option<Vec<String>>,
    /// Basenames of the foundation entity's children.
    pub f_child: Option<Vec<String>>,
}

/// One row of the chapters dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// Chapter code (e.g. `01`).
    pub code: String,
    /// Chapter title.
    pub title: Option<String>,
    /// Short definition.
    pub definition: Option<String>,
    /// Extended definition.
    pub long_definition: Option<String>,
    /// Basenames of parent entity URIs.
    pub parent: Option<Vec<String>>,
    /// Index term labels.
    pub index_terms: Option<Vec<String>>,
    /// Foundation-child-elsewhere labels.
    pub foundation_child_elsewhere: Option<Vec<String>>,
    /// Foundation enrichment.
    #[serde(flatten)]
    pub foundation: FoundationFields,
    /// Foundation entity URI this row was enriched from.
    pub f_uri: Option<String>,
    /// Linearization entity URI.
    pub uri: String,
}

/// One row of the categories dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Category code (e.g. `1A00.0`).
    pub code: String,
    /// Category title.
    pub title: Option<String>,
    /// Short definition.
    pub definition: Option<String>,
    /// Extended definition.
    pub long_definition: Option<String>,
    /// Basenames of parent entity URIs.
    pub parent: Option<Vec<String>>,
    /// Index term labels.
    pub index_terms: Option<Vec<String>>,
    /// Foundation-child-elsewhere labels.
    pub foundation_child_elsewhere: Option<Vec<String>>,
    /// Foundation enrichment.
    #[serde(flatten)]
    pub foundation: FoundationFields,
    /// Foundation entity URI this row was enriched from.
    pub f_uri: Option<String>,
    /// Linearization entity URI.
    pub uri: String,
    /// Code of the owning chapter.
    pub chapter: String,
}

impl CategoryRecord {
    /// Attach the owning chapter code to a base row.
    pub fn from_record(record: ChapterRecord, chapter: String) -> Self {
        Self {
            code: record.code,
            title: record.title,
            definition: record.definition,
            long_definition: record.long_definition,
            parent: record.parent,
            index_terms: record.index_terms,
            foundation_child_elsewhere: record.foundation_child_elsewhere,
            foundation: record.foundation,
            f_uri: record.f_uri,
            uri: record.uri,
            chapter,
        }
    }
}

/// One row of the postcoordination dataset.
///
/// Emitted only for categories that declare at least one axis. Axis names
/// are URI basenames (e.g. `severity`); values are the permitted entity
/// URIs, `None` when the API declared the axis without a scale list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcoordinationRecord {
    /// Category code the axes apply to.
    pub code: String,
    /// Axis name to permitted scale entity URIs.
    #[serde(flatten)]
    pub axes: BTreeMap<String, Option<Vec<String>>>,
}

/// Accumulated datasets for one crawled language.
///
/// The walker appends into a caller-owned instance so rows gathered before
/// an error or cancellation are preserved.
#[derive(Debug, Clone, Default)]
pub struct LanguageDatasets {
    /// Language code these rows were crawled in.
    pub language: String,
    /// Chapter rows, pre-order.
    pub chapters: Vec<ChapterRecord>,
    /// Category rows, pre-order.
    pub categories: Vec<CategoryRecord>,
    /// Postcoordination rows, pre-order.
    pub postcoordination: Vec<PostcoordinationRecord>,
}

impl LanguageDatasets {
    /// Create an empty dataset set for a language.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    /// Total row count across all three tables.
    pub fn row_count(&self) -> usize {
        self.chapters.len() + self.categories.len() + self.postcoordination.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_record_serializes_absent_as_null() {
        let record = ChapterRecord {
            code: "01".to_string(),
            title: Some("Certain infectious or parasitic diseases".to_string()),
            uri: "http://id.who.int/icd/release/11/2024-01/mms/1".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["code"], "01");
        assert!(value["definition"].is_null());
        assert!(value["synonym"].is_null());
    }

    #[test]
    fn test_empty_list_survives_roundtrip() {
        let record = ChapterRecord {
            code: "01".to_string(),
            index_terms: Some(vec![]),
            uri: "u".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ChapterRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.index_terms, Some(vec![]));
        assert_eq!(back.foundation_child_elsewhere, None);
    }

    #[test]
    fn test_postcoordination_axes_flatten() {
        let mut axes = BTreeMap::new();
        axes.insert("severity".to_string(), None);
        axes.insert(
            "course".to_string(),
            Some(vec!["http://id.who.int/icd/entity/5".to_string()]),
        );
        let record = PostcoordinationRecord {
            code: "1A00".to_string(),
            axes,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["code"], "1A00");
        assert!(value["severity"].is_null());
        assert_eq!(value["course"][0], "http://id.who.int/icd/entity/5");
    }

    #[test]
    fn test_row_count() {
        let mut datasets = LanguageDatasets::new("en");
        assert_eq!(datasets.row_count(), 0);
        datasets.chapters.push(ChapterRecord::default());
        datasets.categories.push(CategoryRecord::default());
        assert_eq!(datasets.row_count(), 2);
    }
}
