//! Field extraction from wire entities into dataset values.
//!
//! All helpers preserve the absent-vs-empty distinction: an absent input
//! stays `None`, a present-but-empty list stays `Some(vec![])`.

use std::collections::BTreeMap;

use crate::models::{LabeledTerm, LanguageText, PostcoordinationScale};

/// Extract the text of a language-tagged value.
pub fn label_value(value: Option<&LanguageText>) -> Option<String> {
    value.map(|v| v.value.clone())
}

/// Extract the labels of a labeled-term list.
pub fn label_list(terms: Option<&Vec<LabeledTerm>>) -> Option<Vec<String>> {
    terms.map(|list| list.iter().map(|t| t.label.value.clone()).collect())
}

/// Last path segment of a URI.
///
/// `http://id.who.int/icd/entity/455013390` becomes `455013390`.
pub fn uri_basename(uri: &str) -> String {
    uri.rsplit('/').next().unwrap_or(uri).to_string()
}

/// Basenames of a URI list.
pub fn basename_list(uris: Option<&Vec<String>>) -> Option<Vec<String>> {
    uris.map(|list| list.iter().map(|u| uri_basename(u)).collect())
}

/// Postcoordination axes keyed by axis basename.
///
/// A declared axis without a `scaleEntity` list maps to `None`.
pub fn postcoordination_axes(
    scales: &[PostcoordinationScale],
) -> BTreeMap<String, Option<Vec<String>>> {
    scales
        .iter()
        .map(|scale| (uri_basename(&scale.id), scale.scale_entity.clone()))
        .collect()
}
