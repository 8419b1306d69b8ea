//! Depth-first traversal of a classification release.
//!
//! The walker visits the release tree in pre-order, one request at a time,
//! preserving sibling order as returned by the API. Chapter context is
//! threaded explicitly through recursion so every category row knows its
//! owning chapter.

pub mod extract;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::client::{sanitize_uri, CrawlTarget, CredentialGate, CredentialProvider, EntitySource};
use crate::error::CrawlError;
use crate::models::{
    CategoryRecord, ChapterRecord, ClassKind, EntityNode, FoundationFields, LanguageDatasets,
    PostcoordinationRecord,
};

use extract::{basename_list, label_list, label_value, postcoordination_axes};

/// Language used for release discovery and language listing.
const DISCOVERY_LANGUAGE: &str = "en";

/// Cooperative cancellation flag shared between the walker and its driver.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the walk stop before its next fetch.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress notifications emitted during a walk.
///
/// Sent best-effort over an mpsc channel; traversal never blocks on a full
/// or closed receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    /// The release root was fetched and has this many direct children.
    RootExpanded { children: usize },
    /// One direct child subtree of the root finished.
    TopLevelCompleted,
}

/// Chapter scope a subtree is visited under.
#[derive(Debug, Clone)]
struct ChapterContext {
    code: String,
}

/// Walks one classification release and accumulates dataset rows.
pub struct ClassificationWalker<S, P> {
    source: S,
    gate: CredentialGate<P>,
    root_uri: String,
}

impl<S, P> std::fmt::Debug for ClassificationWalker<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationWalker")
            .field("root_uri", &self.root_uri)
            .finish_non_exhaustive()
    }
}

impl<S: EntitySource, P: CredentialProvider> ClassificationWalker<S, P> {
    /// Issue the initial token and resolve the release root URI.
    pub async fn connect(
        source: S,
        gate: CredentialGate<P>,
        target: &CrawlTarget,
    ) -> Result<Self, CrawlError> {
        let root_uri = if target.wants_latest() {
            let token = gate.acquire().await?;
            let discovery = target.discovery_uri();
            let node = source
                .fetch_entity(&discovery, DISCOVERY_LANGUAGE, &token)
                .await?;
            let latest = node.latest_release.ok_or(CrawlError::MissingField {
                uri: discovery,
                field: "latestRelease",
            })?;
            sanitize_uri(&latest)
        } else {
            target.release_uri()
        };

        info!("Release root: {}", root_uri);
        Ok(Self {
            source,
            gate,
            root_uri,
        })
    }

    /// The resolved release root URI.
    pub fn root_uri(&self) -> &str {
        &self.root_uri
    }

    /// Languages the release advertises.
    pub async fn available_languages(&self) -> Result<Vec<String>, CrawlError> {
        let token = self.gate.acquire().await?;
        let root = self
            .source
            .fetch_entity(&self.root_uri, DISCOVERY_LANGUAGE, &token)
            .await?;
        root.available_languages.ok_or(CrawlError::MissingField {
            uri: self.root_uri.clone(),
            field: "availableLanguages",
        })
    }

    /// Walk the release in one language, returning the gathered datasets.
    pub async fn walk(
        &self,
        language: &str,
        cancel: &CancelToken,
        events: Option<&mpsc::Sender<WalkEvent>>,
    ) -> Result<LanguageDatasets, CrawlError> {
        let mut out = LanguageDatasets::new(language);
        self.walk_into(language, &mut out, cancel, events).await?;
        Ok(out)
    }

    /// Walk the release in one language, appending into `out`.
    ///
    /// Rows gathered before an error or cancellation remain in `out`.
    pub async fn walk_into(
        &self,
        language: &str,
        out: &mut LanguageDatasets,
        cancel: &CancelToken,
        events: Option<&mpsc::Sender<WalkEvent>>,
    ) -> Result<(), CrawlError> {
        let root = self.fetch(&self.root_uri, language, cancel).await?;
        let children = root.children().to_vec();
        emit(
            events,
            WalkEvent::RootExpanded {
                children: children.len(),
            },
        );

        for child in children {
            self.visit(child, language, None, out, cancel).await?;
            emit(events, WalkEvent::TopLevelCompleted);
        }

        Ok(())
    }

    /// Fetch one entity, honoring cancellation and the credential gate.
    async fn fetch(
        &self,
        uri: &str,
        language: &str,
        cancel: &CancelToken,
    ) -> Result<EntityNode, CrawlError> {
        if cancel.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }
        let token = self.gate.acquire().await?;
        self.source.fetch_entity(uri, language, &token).await
    }

    fn visit<'a>(
        &'a self,
        uri: String,
        language: &'a str,
        chapter: Option<ChapterContext>,
        out: &'a mut LanguageDatasets,
        cancel: &'a CancelToken,
    ) -> BoxFuture<'a, Result<(), CrawlError>> {
        Box::pin(async move {
            let node = self.fetch(&uri, language, cancel).await?;
            debug!("Visiting {} ({:?})", node.id, node.class_kind);

            let context = match node.class_kind {
                Some(ClassKind::Chapter) => {
                    let record = self.build_record(&node, language, cancel).await?;
                    let context = ChapterContext {
                        code: record.code.clone(),
                    };
                    out.chapters.push(record);
                    Some(context)
                }
                Some(ClassKind::Category) => {
                    let context = chapter.ok_or_else(|| CrawlError::MissingChapterContext {
                        uri: node.id.clone(),
                    })?;
                    let record = self.build_record(&node, language, cancel).await?;
                    if node.has_postcoordination() {
                        out.postcoordination
                            .push(postcoordination_record(&node, &record.code));
                    }
                    out.categories
                        .push(CategoryRecord::from_record(record, context.code.clone()));
                    Some(context)
                }
                // Blocks, windows, and future kinds: no row, context unchanged,
                // children still visited.
                _ => chapter,
            };

            for child in node.children() {
                self.visit(child.clone(), language, context.clone(), &mut *out, cancel)
                    .await?;
            }

            Ok(())
        })
    }

    /// Build the shared row shape for a chapter or category node,
    /// enriching from the foundation entity when a `source` URI is present.
    async fn build_record(
        &self,
        node: &EntityNode,
        language: &str,
        cancel: &CancelToken,
    ) -> Result<ChapterRecord, CrawlError> {
        let code = node.code.clone().ok_or_else(|| CrawlError::MissingField {
            uri: node.id.clone(),
            field: "code",
        })?;

        let (foundation, f_uri) = match node.source.as_deref() {
            Some(source) => {
                let entity = self.fetch(source, language, cancel).await?;
                (foundation_fields(&entity), Some(source.to_string()))
            }
            None => (FoundationFields::default(), None),
        };

        Ok(ChapterRecord {
            code,
            title: label_value(node.title.as_ref()),
            definition: label_value(node.definition.as_ref()),
            long_definition: label_value(node.long_definition.as_ref()),
            parent: basename_list(node.parent.as_ref()),
            index_terms: label_list(node.index_term.as_ref()),
            foundation_child_elsewhere: label_list(node.foundation_child_elsewhere.as_ref()),
            foundation,
            f_uri,
            uri: node.id.clone(),
        })
    }
}

fn foundation_fields(entity: &EntityNode) -> FoundationFields {
    FoundationFields {
        fully_specified_name: label_value(entity.fully_specified_name.as_ref()),
        synonym: label_list(entity.synonym.as_ref()),
        inclusion: label_list(entity.inclusion.as_ref()),
        exclusion: label_list(entity.exclusion.as_ref()),
        related_in_perinatal: label_list(entity.related_entities_in_perinatal_chapter.as_ref()),
        f_child: basename_list(entity.child.as_ref()),
    }
}

fn postcoordination_record(node: &EntityNode, code: &str) -> PostcoordinationRecord {
    PostcoordinationRecord {
        code: code.to_string(),
        axes: postcoordination_axes(node.postcoordination_scale.as_deref().unwrap_or(&[])),
    }
}

fn emit(events: Option<&mpsc::Sender<WalkEvent>>, event: WalkEvent) {
    if let Some(tx) = events {
        let _ = tx.try_send(event);
    }
}
