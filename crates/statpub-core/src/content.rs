//! Structured content documents.
//!
//! Release bodies, key statistics and methodology chapters are stored as JSON
//! documents wrapped in an envelope carrying [`SCHEMA_VERSION`]. Documents
//! written before the envelope existed (a bare array of PascalCase sections)
//! are still readable; anything else is reported as malformed rather than
//! guessed at.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Version written by [`ContentDocument::to_stored`] and
/// [`DataBlock::to_stored`].
pub const SCHEMA_VERSION: u64 = 2;

// ─── Blocks ──────────────────────────────────────────────────────────────────

/// Narrative text. The body is markdown and is served verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownBlock {
  pub order: i32,
  pub body:  String,
}

/// Opaque descriptor handed to the table-building service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuery {
  pub subject_id:       String,
  pub geographic_level: Option<String>,
  pub start_year:       Option<String>,
  pub end_year:         Option<String>,
  #[serde(default)]
  pub filters:          Vec<String>,
  #[serde(default)]
  pub indicators:       Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
  /// e.g. `"line"`, `"verticalbar"`, `"map"`.
  pub chart_type: String,
  #[serde(default)]
  pub indicators: Vec<String>,
  pub x_axis:     Option<String>,
  pub y_axis:     Option<String>,
}

/// Pre-authored headline figures for a data block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSummary {
  /// Indicator keys whose values are headlined.
  #[serde(default)]
  pub data_keys:       Vec<String>,
  /// Short human-readable deltas, one per key (e.g. "Up from 4.6% in 2015/16").
  #[serde(default)]
  pub data_summary:    Vec<String>,
  /// Per-key definitions.
  #[serde(default)]
  pub data_definition: Vec<String>,
  pub description:     Option<MarkdownBlock>,
}

/// A block whose figures come from the table-building service at read time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBlock {
  pub order:   i32,
  pub heading: Option<String>,
  pub query:   DataQuery,
  #[serde(default)]
  pub charts:  Vec<ChartSpec>,
  pub summary: Option<DataSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
  Markdown(MarkdownBlock),
  Data(DataBlock),
}

impl ContentBlock {
  pub fn order(&self) -> i32 {
    match self {
      Self::Markdown(b) => b.order,
      Self::Data(b) => b.order,
    }
  }
}

// ─── Sections & documents ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
  pub order:   i32,
  pub heading: String,
  #[serde(default)]
  pub caption: String,
  #[serde(default)]
  pub content: Vec<ContentBlock>,
}

/// An ordered list of sections. Order comes from the explicit `order` fields,
/// never from position in storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
  #[serde(default)]
  pub sections: Vec<ContentSection>,
}

#[derive(Serialize)]
struct DocumentEnvelope<'a> {
  schema_version: u64,
  sections:       &'a [ContentSection],
}

#[derive(Deserialize)]
struct StoredDocument {
  sections: Vec<ContentSection>,
}

#[derive(Serialize)]
struct BlockEnvelope<'a> {
  schema_version: u64,
  block:          &'a DataBlock,
}

#[derive(Deserialize)]
struct StoredBlock {
  block: DataBlock,
}

impl ContentDocument {
  pub fn new(sections: Vec<ContentSection>) -> Self { Self { sections } }

  /// Sections and their blocks sorted by `order` ascending. The sort is
  /// stable, so equal orders keep their stored sequence.
  pub fn sorted(mut self) -> Self {
    self.sections.sort_by_key(|s| s.order);
    for section in &mut self.sections {
      section.content.sort_by_key(ContentBlock::order);
    }
    self
  }

  /// Serialise into the versioned envelope for a database column.
  pub fn to_stored(&self) -> Result<String> {
    Ok(serde_json::to_string(&DocumentEnvelope {
      schema_version: SCHEMA_VERSION,
      sections:       &self.sections,
    })?)
  }

  /// Parse a stored document, accepting the current envelope and the legacy
  /// bare-array shape.
  pub fn from_stored(raw: &str) -> Result<Self> {
    let value: Value = serde_json::from_str(raw)
      .map_err(|e| Error::MalformedDocument(e.to_string()))?;

    if value.is_array() {
      let sections: Vec<legacy::Section> = serde_json::from_value(value)
        .map_err(|e| Error::MalformedDocument(format!("legacy content: {e}")))?;
      return Ok(Self {
        sections: sections.into_iter().map(Into::into).collect(),
      });
    }

    if !value.is_object() {
      return Err(Error::MalformedDocument(format!(
        "expected an object or array, found {}",
        kind_of(&value)
      )));
    }

    check_version(value.get("schema_version"))?;
    let doc: StoredDocument = serde_json::from_value(value)
      .map_err(|e| Error::MalformedDocument(e.to_string()))?;
    Ok(Self { sections: doc.sections })
  }
}

impl DataBlock {
  /// Serialise as a standalone key-statistics document.
  pub fn to_stored(&self) -> Result<String> {
    Ok(serde_json::to_string(&BlockEnvelope {
      schema_version: SCHEMA_VERSION,
      block:          self,
    })?)
  }

  /// Parse a stored key-statistics document. The legacy shape is a bare
  /// block object tagged `"Type": "DataBlock"`.
  pub fn from_stored(raw: &str) -> Result<Self> {
    let value: Value = serde_json::from_str(raw)
      .map_err(|e| Error::MalformedDocument(e.to_string()))?;

    if !value.is_object() {
      return Err(Error::MalformedDocument(format!(
        "expected a key statistics object, found {}",
        kind_of(&value)
      )));
    }

    if value.get("schema_version").is_some() {
      check_version(value.get("schema_version"))?;
      let stored: StoredBlock = serde_json::from_value(value)
        .map_err(|e| Error::MalformedDocument(e.to_string()))?;
      return Ok(stored.block);
    }

    if value.get("Type").and_then(Value::as_str) != Some("DataBlock") {
      return Err(Error::MalformedDocument(
        "key statistics carry neither a schema version nor a legacy type tag"
          .into(),
      ));
    }

    let block: legacy::DataBlock = serde_json::from_value(value)
      .map_err(|e| Error::MalformedDocument(format!("legacy data block: {e}")))?;
    Ok(block.into_current(0))
  }
}

fn check_version(version: Option<&Value>) -> Result<()> {
  match version.and_then(Value::as_u64) {
    Some(SCHEMA_VERSION) => Ok(()),
    Some(other) => Err(Error::UnsupportedSchemaVersion(other)),
    None => Err(Error::MalformedDocument(
      "missing or non-numeric schema_version".into(),
    )),
  }
}

fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

// ─── Legacy shape ────────────────────────────────────────────────────────────

/// The unversioned document shape: PascalCase section keys, blocks tagged by
/// `Type`, no per-block order (position is used instead), and ids that may be
/// either strings or numbers.
mod legacy {
  use super::*;

  #[derive(Deserialize)]
  pub struct Section {
    #[serde(rename = "Order", alias = "order")]
    order:   i32,
    #[serde(rename = "Heading", alias = "heading", default)]
    heading: Option<String>,
    #[serde(rename = "Caption", alias = "caption", default)]
    caption: Option<String>,
    #[serde(rename = "Content", alias = "content", default)]
    content: Vec<Block>,
  }

  #[derive(Deserialize)]
  #[serde(tag = "Type")]
  enum Block {
    MarkdownBlock(Markdown),
    DataBlock(DataBlock),
  }

  #[derive(Deserialize)]
  pub struct Markdown {
    #[serde(rename = "Body", alias = "body", default)]
    body: String,
  }

  #[derive(Deserialize)]
  pub struct DataBlock {
    #[serde(rename = "Heading", alias = "heading", default)]
    heading: Option<String>,
    #[serde(rename = "DataBlockRequest", alias = "dataBlockRequest")]
    request: Request,
    #[serde(rename = "Charts", alias = "charts", default)]
    charts:  Vec<Chart>,
    #[serde(rename = "Summary", alias = "summary", default)]
    summary: Option<Summary>,
  }

  #[derive(Deserialize)]
  #[serde(rename_all = "camelCase")]
  struct Request {
    #[serde(deserialize_with = "lenient_string")]
    subject_id:       String,
    geographic_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    start_year:       Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    end_year:         Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    filters:          Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    indicators:       Vec<String>,
  }

  #[derive(Deserialize)]
  struct Chart {
    #[serde(rename = "Type", alias = "type")]
    chart_type: String,
    #[serde(rename = "Indicators", alias = "indicators", default, deserialize_with = "lenient_strings")]
    indicators: Vec<String>,
    #[serde(rename = "XAxis", alias = "xAxis", default)]
    x_axis:     Option<Axis>,
    #[serde(rename = "YAxis", alias = "yAxis", default)]
    y_axis:     Option<Axis>,
  }

  #[derive(Deserialize)]
  struct Axis {
    #[serde(alias = "Title")]
    title: Option<String>,
  }

  #[derive(Deserialize)]
  #[serde(rename_all = "camelCase")]
  struct Summary {
    #[serde(default, deserialize_with = "lenient_strings")]
    data_keys:       Vec<String>,
    #[serde(default)]
    data_summary:    Vec<String>,
    #[serde(default)]
    data_definition: Vec<String>,
    #[serde(default)]
    description:     Option<Markdown>,
  }

  impl From<Section> for ContentSection {
    fn from(s: Section) -> Self {
      let content = s
        .content
        .into_iter()
        .zip(0..)
        .map(|(block, position)| match block {
          Block::MarkdownBlock(m) => ContentBlock::Markdown(MarkdownBlock {
            order: position,
            body:  m.body,
          }),
          Block::DataBlock(d) => ContentBlock::Data(d.into_current(position)),
        })
        .collect();

      ContentSection {
        order: s.order,
        heading: s.heading.unwrap_or_default(),
        caption: s.caption.unwrap_or_default(),
        content,
      }
    }
  }

  impl DataBlock {
    pub fn into_current(self, order: i32) -> super::DataBlock {
      super::DataBlock {
        order,
        heading: self.heading,
        query: DataQuery {
          subject_id:       self.request.subject_id,
          geographic_level: self.request.geographic_level,
          start_year:       self.request.start_year,
          end_year:         self.request.end_year,
          filters:          self.request.filters,
          indicators:       self.request.indicators,
        },
        charts: self
          .charts
          .into_iter()
          .map(|c| ChartSpec {
            chart_type: c.chart_type,
            indicators: c.indicators,
            x_axis:     c.x_axis.and_then(|a| a.title),
            y_axis:     c.y_axis.and_then(|a| a.title),
          })
          .collect(),
        summary: self.summary.map(|s| DataSummary {
          data_keys:       s.data_keys,
          data_summary:    s.data_summary,
          data_definition: s.data_definition,
          description:     s
            .description
            .map(|m| MarkdownBlock { order: 0, body: m.body }),
        }),
      }
    }
  }

  fn scalar_to_string<E: serde::de::Error>(v: Value) -> Result<String, E> {
    match v {
      Value::String(s) => Ok(s),
      Value::Number(n) => Ok(n.to_string()),
      other => Err(E::custom(format!(
        "expected a string or number, found {}",
        kind_of(&other)
      ))),
    }
  }

  fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    scalar_to_string(Value::deserialize(d)?)
  }

  fn lenient_opt_string<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<String>, D::Error> {
    match Value::deserialize(d)? {
      Value::Null => Ok(None),
      v => scalar_to_string(v).map(Some),
    }
  }

  fn lenient_strings<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Vec<String>, D::Error> {
    Vec::<Value>::deserialize(d)?
      .into_iter()
      .map(scalar_to_string)
      .collect()
  }
}
