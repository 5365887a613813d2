//! Methodologies: long-form documents describing how a series is produced.
//!
//! Written once and linked from any number of publications; a publication
//! points at its methodology, never the other way round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::ContentDocument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Methodology {
  pub methodology_id: Uuid,
  pub title:          String,
  pub summary:        String,
  pub content:        ContentDocument,
  pub annexes:        ContentDocument,
  pub published_at:   Option<DateTime<Utc>>,
  pub updated_at:     DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMethodology {
  pub title:        String,
  #[serde(default)]
  pub summary:      String,
  #[serde(default)]
  pub content:      ContentDocument,
  #[serde(default)]
  pub annexes:      ContentDocument,
  pub published_at: Option<DateTime<Utc>>,
}
