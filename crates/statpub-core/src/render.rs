//! Resolution of data blocks against the table-building service.
//!
//! Markdown passes through untouched. Each data block keeps its authored
//! summary and gains the live query result, or the reason it could not be
//! fetched; one failing block never fails the surrounding release.

use std::future::Future;

use serde::Serialize;
use serde_json::Value;

use crate::{
  content::{ContentBlock, ContentDocument, DataBlock, DataQuery, MarkdownBlock},
  release::Update,
  view::{PublicRelease, ReleaseMetadata},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Client seam for the external table-building service.
pub trait TableBuilder: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run `query` and return the service's result table as JSON.
  fn query(
    &self,
    query: &DataQuery,
  ) -> impl Future<Output = Result<Value, Self::Error>> + Send;
}

// ─── Resolved shapes ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LiveData {
  Resolved { result: Value },
  Unavailable { reason: String },
}

impl LiveData {
  pub fn is_resolved(&self) -> bool { matches!(self, Self::Resolved { .. }) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDataBlock {
  #[serde(flatten)]
  pub block: DataBlock,
  pub live:  LiveData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedBlock {
  Markdown(MarkdownBlock),
  Data(ResolvedDataBlock),
}

impl ResolvedBlock {
  /// A data block whose live figures could not be fetched.
  pub fn is_unavailable(&self) -> bool {
    matches!(self, Self::Data(d) if !d.live.is_resolved())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSection {
  pub order:   i32,
  pub heading: String,
  pub caption: String,
  pub content: Vec<ResolvedBlock>,
}

/// A published release with every data block resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRelease {
  #[serde(flatten)]
  pub metadata:       ReleaseMetadata,
  pub content:        Vec<ResolvedSection>,
  pub key_statistics: Option<ResolvedDataBlock>,
  pub updates:        Vec<Update>,
}

// ─── Resolution ──────────────────────────────────────────────────────────────

pub async fn resolve_block<T: TableBuilder>(
  block: DataBlock,
  tables: &T,
) -> ResolvedDataBlock {
  let live = match tables.query(&block.query).await {
    Ok(result) => LiveData::Resolved { result },
    Err(e) => LiveData::Unavailable { reason: e.to_string() },
  };
  ResolvedDataBlock { block, live }
}

/// Resolve every block of `document`, in `order` sequence.
pub async fn resolve_document<T: TableBuilder>(
  document: ContentDocument,
  tables: &T,
) -> Vec<ResolvedSection> {
  let mut sections = Vec::with_capacity(document.sections.len());
  for section in document.sorted().sections {
    let mut content = Vec::with_capacity(section.content.len());
    for block in section.content {
      content.push(match block {
        ContentBlock::Markdown(m) => ResolvedBlock::Markdown(m),
        ContentBlock::Data(d) => ResolvedBlock::Data(resolve_block(d, tables).await),
      });
    }
    sections.push(ResolvedSection {
      order: section.order,
      heading: section.heading,
      caption: section.caption,
      content,
    });
  }
  sections
}

pub async fn resolve_release<T: TableBuilder>(
  release: PublicRelease,
  tables: &T,
) -> ResolvedRelease {
  let content = resolve_document(release.content, tables).await;
  let key_statistics = match release.key_statistics {
    Some(block) => Some(resolve_block(block, tables).await),
    None => None,
  };
  ResolvedRelease {
    metadata: release.metadata,
    content,
    key_statistics,
    updates: release.updates,
  }
}
