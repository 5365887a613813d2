//! Release summaries: the append-only history of a release's visible metadata.
//!
//! A [`ReleaseSummary`] is a stable anchor, one per release. Each edit to the
//! release's name, slug, summary text or schedule appends a new
//! [`ReleaseSummaryVersion`]; earlier versions are never updated or removed.
//! The authoritative version is chosen by [`latest_version`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, period::TimePeriodCoverage, slug};

/// Anchor row tying a version chain to its release. Has no mutable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSummary {
  pub summary_id: Uuid,
  pub release_id: Uuid,
}

/// One immutable snapshot of a release's public metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSummaryVersion {
  pub version_id:           Uuid,
  pub summary_id:           Uuid,
  /// Store-assigned insertion sequence; strictly increasing.
  pub sequence:             i64,
  pub created_at:           DateTime<Utc>,
  /// Human label, e.g. `"2016-17"`.
  pub release_name:         String,
  pub slug:                 String,
  /// Markdown.
  pub summary:              String,
  pub publish_scheduled:    Option<DateTime<Utc>>,
  pub release_type_id:      Uuid,
  pub time_period_coverage: TimePeriodCoverage,
  /// Free text; real schedules are often approximate ("Summer 2020").
  pub next_release_date:    Option<String>,
}

/// Input to [`crate::store::PublishingStore::append_summary_version`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReleaseSummaryVersion {
  pub release_name:         String,
  pub slug:                 String,
  #[serde(default)]
  pub summary:              String,
  pub publish_scheduled:    Option<DateTime<Utc>>,
  pub release_type_id:      Uuid,
  pub time_period_coverage: TimePeriodCoverage,
  pub next_release_date:    Option<String>,
}

impl NewReleaseSummaryVersion {
  /// Convenience constructor with optional fields left empty.
  pub fn new(
    release_name: impl Into<String>,
    slug: impl Into<String>,
    release_type_id: Uuid,
    time_period_coverage: TimePeriodCoverage,
  ) -> Self {
    Self {
      release_name: release_name.into(),
      slug: slug.into(),
      summary: String::new(),
      publish_scheduled: None,
      release_type_id,
      time_period_coverage,
      next_release_date: None,
    }
  }

  pub fn validate(&self) -> Result<()> { slug::validate(&self.slug) }
}

/// Accept `created_at` for an imported version only if it is not later than
/// `now`. A future-dated version would stay authoritative over every edit
/// made before that date.
pub fn check_import_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
  if created_at > now {
    return Err(Error::FutureTimestamp(created_at));
  }
  Ok(())
}

/// The authoritative version: latest `created_at`, ties broken by highest
/// `sequence`. Returns `None` only for an empty slice.
pub fn latest_version(
  versions: &[ReleaseSummaryVersion],
) -> Option<&ReleaseSummaryVersion> {
  versions.iter().max_by_key(|v| (v.created_at, v.sequence))
}
