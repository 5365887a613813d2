//! Read models, computed on every read, never stored.
//!
//! A release's visible metadata always comes from the latest version of its
//! summary; the release row itself only carries the body and lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  content::{ContentDocument, DataBlock},
  methodology::Methodology,
  period::TimePeriodCoverage,
  release::{Release, ReleaseType, Update},
  summary::{ReleaseSummary, ReleaseSummaryVersion},
  taxonomy::{Contact, Link, Publication, Theme, Topic},
};

// ─── Administrative ──────────────────────────────────────────────────────────

/// A release joined with its authoritative summary version. Used on the
/// administrative path; includes the internal release note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseView {
  pub release:      Release,
  pub summary:      ReleaseSummary,
  pub current:      ReleaseSummaryVersion,
  pub release_type: ReleaseType,
  pub updates:      Vec<Update>,
}

impl ReleaseView {
  /// Strip editorial-only fields and normalise ordering for public
  /// consumption.
  pub fn into_public(self) -> PublicRelease {
    let Self { release, current, release_type, updates, .. } = self;
    PublicRelease {
      metadata: ReleaseMetadata {
        release_id:           release.release_id,
        publication_id:       release.publication_id,
        order:                release.order,
        name:                 current.release_name,
        slug:                 current.slug,
        summary:              current.summary,
        release_type,
        time_period_coverage: current.time_period_coverage,
        time_period_label:    current.time_period_coverage.label().to_owned(),
        publish_scheduled:    current.publish_scheduled,
        next_release_date:    current.next_release_date,
        published_at:         release.published_at,
      },
      content: release.content.sorted(),
      key_statistics: release.key_statistics,
      updates,
    }
  }
}

// ─── Public ──────────────────────────────────────────────────────────────────

/// Metadata of a published release, as resolved through its latest summary
/// version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
  pub release_id:           Uuid,
  pub publication_id:       Uuid,
  pub order:                i32,
  pub name:                 String,
  pub slug:                 String,
  pub summary:              String,
  pub release_type:         ReleaseType,
  pub time_period_coverage: TimePeriodCoverage,
  pub time_period_label:    String,
  pub publish_scheduled:    Option<DateTime<Utc>>,
  pub next_release_date:    Option<String>,
  pub published_at:         Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicRelease {
  #[serde(flatten)]
  pub metadata:       ReleaseMetadata,
  pub content:        ContentDocument,
  pub key_statistics: Option<DataBlock>,
  pub updates:        Vec<Update>,
}

/// The public tree for one publication: taxonomy breadcrumbs, optional shared
/// references, and its published releases ordered by `order` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationTree {
  pub theme:       Theme,
  pub topic:       Topic,
  pub publication: Publication,
  pub methodology: Option<Methodology>,
  pub contact:     Option<Contact>,
  pub links:       Vec<Link>,
  pub releases:    Vec<PublicRelease>,
  /// The point in time at which this tree was composed.
  pub as_of:       DateTime<Utc>,
}

// ─── Public index ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationListing {
  pub publication_id: Uuid,
  pub slug:           String,
  pub title:          String,
  pub summary:        String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicListing {
  pub topic:        Topic,
  pub publications: Vec<PublicationListing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeListing {
  pub theme:  Theme,
  pub topics: Vec<TopicListing>,
}
