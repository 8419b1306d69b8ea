//! Data models for ICDAcquire.

mod entity;
mod record;

pub use entity::{ClassKind, EntityNode, LabeledTerm, LanguageText, PostcoordinationScale};
pub use record::{
    CategoryRecord, ChapterRecord, FoundationFields, LanguageDatasets, PostcoordinationRecord,
};
