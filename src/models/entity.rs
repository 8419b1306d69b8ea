//! Wire models for WHO ICD API entities.
//!
//! Entities arrive as JSON-LD-flavored documents. Fields that the API may
//! omit entirely are modeled as `Option` so that an absent list and a
//! present-but-empty list stay distinguishable downstream.

use serde::{Deserialize, Serialize};

/// A language-tagged value, e.g. `{"@language": "en", "@value": "Cholera"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageText {
    /// The text content.
    #[serde(rename = "@value")]
    pub value: String,
    /// BCP-47 language tag, when the API includes one.
    #[serde(rename = "@language", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl LanguageText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
        }
    }
}

/// An entry in a labeled list field such as `indexTerm` or `exclusion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledTerm {
    /// The term's display label.
    pub label: LanguageText,
}

impl LabeledTerm {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            label: LanguageText::new(value),
        }
    }
}

/// One postcoordination axis declared by a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcoordinationScale {
    /// Axis URI; its basename names the axis (e.g. `severity`).
    #[serde(rename = "@id")]
    pub id: String,
    /// Entity URIs permitted on this axis. Absent when the API omits it.
    #[serde(rename = "scaleEntity", default, skip_serializing_if = "Option::is_none")]
    pub scale_entity: Option<Vec<String>>,
}

/// Discriminator for entity kinds in the linearization tree.
///
/// The API grows new kinds over time (blocks, windows); anything we do not
/// recognize folds into `Other` and is treated as a pass-through node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Chapter,
    Category,
    #[serde(other)]
    Other,
}

/// A single entity response from the classification API.
///
/// The same shape covers release discovery, the release root, linearization
/// nodes, and foundation entities; each use reads the subset of fields it
/// needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityNode {
    /// Canonical entity URI. Required on every response.
    #[serde(rename = "@id")]
    pub id: String,
    /// Node kind within a linearization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_kind: Option<ClassKind>,
    /// Classification code (e.g. `1A00`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Entity title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LanguageText>,
    /// Short definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<LanguageText>,
    /// Extended definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_definition: Option<LanguageText>,
    /// Fully specified name (foundation entities).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_specified_name: Option<LanguageText>,
    /// Parent entity URIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Vec<String>>,
    /// Child entity URIs, in API order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Vec<String>>,
    /// URI of the foundation entity this linearization node was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Index terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_term: Option<Vec<LabeledTerm>>,
    /// Foundation children coded elsewhere in the linearization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foundation_child_elsewhere: Option<Vec<LabeledTerm>>,
    /// Synonyms (foundation entities).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonym: Option<Vec<LabeledTerm>>,
    /// Inclusion notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<Vec<LabeledTerm>>,
    /// Exclusion notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion: Option<Vec<LabeledTerm>>,
    /// Related entities in the perinatal chapter (foundation entities).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_entities_in_perinatal_chapter: Option<Vec<LabeledTerm>>,
    /// Postcoordination axes declared by this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcoordination_scale: Option<Vec<PostcoordinationScale>>,
    /// Languages the release is published in (root entity only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_languages: Option<Vec<String>>,
    /// Latest release URI (discovery entity only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_release: Option<String>,
}

impl EntityNode {
    /// Child URIs in API order, or an empty slice when none are present.
    pub fn children(&self) -> &[String] {
        self.child.as_deref().unwrap_or(&[])
    }

    /// Whether this node declares at least one postcoordination axis.
    pub fn has_postcoordination(&self) -> bool {
        self.postcoordination_scale
            .as_ref()
            .is_some_and(|scales| !scales.is_empty())
    }
}
