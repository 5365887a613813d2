//! Classification hierarchy (theme → topic → publication) and the records a
//! publication points at.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, slug};

// ─── Theme ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
  pub theme_id: Uuid,
  /// Globally unique.
  pub slug:     String,
  pub title:    String,
  pub summary:  String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTheme {
  pub slug:    String,
  pub title:   String,
  #[serde(default)]
  pub summary: String,
}

impl NewTheme {
  pub fn validate(&self) -> Result<()> { slug::validate(&self.slug) }
}

// ─── Topic ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
  pub topic_id:    Uuid,
  pub theme_id:    Uuid,
  /// Unique within the owning theme.
  pub slug:        String,
  pub title:       String,
  pub summary:     String,
  pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTopic {
  pub theme_id:    Uuid,
  pub slug:        String,
  pub title:       String,
  #[serde(default)]
  pub summary:     String,
  #[serde(default)]
  pub description: String,
}

impl NewTopic {
  pub fn validate(&self) -> Result<()> { slug::validate(&self.slug) }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A team contact shared by any number of publications. Deleting one that is
/// still referenced is rejected by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub contact_id:    Uuid,
  pub team_name:     String,
  pub team_email:    String,
  pub contact_name:  String,
  pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
  pub team_name:     String,
  pub team_email:    String,
  pub contact_name:  String,
  pub contact_phone: Option<String>,
}

// ─── Publication ─────────────────────────────────────────────────────────────

/// A statistical series. References (never owns) its contact and methodology;
/// owns its links and releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
  pub publication_id: Uuid,
  pub topic_id:       Uuid,
  /// Globally unique.
  pub slug:           String,
  pub title:          String,
  pub description:    String,
  pub summary:        String,
  pub data_source:    String,
  pub next_update:    Option<NaiveDate>,
  pub contact_id:     Option<Uuid>,
  pub methodology_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPublication {
  pub topic_id:       Uuid,
  pub slug:           String,
  pub title:          String,
  #[serde(default)]
  pub description:    String,
  #[serde(default)]
  pub summary:        String,
  #[serde(default)]
  pub data_source:    String,
  pub next_update:    Option<NaiveDate>,
  pub contact_id:     Option<Uuid>,
  pub methodology_id: Option<Uuid>,
}

impl NewPublication {
  pub fn validate(&self) -> Result<()> { slug::validate(&self.slug) }
}

/// A legacy external page for a publication (e.g. a release that predates
/// the platform).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
  pub link_id:        Uuid,
  pub publication_id: Uuid,
  pub description:    String,
  pub url:            String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLink {
  pub description: String,
  pub url:         String,
}
