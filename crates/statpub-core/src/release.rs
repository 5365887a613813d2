//! Releases: one dated publishing cycle's output under a publication.
//!
//! A release owns its body (content sections and key statistics) and a
//! lifecycle status. Everything an editor may retitle or reschedule lives on
//! the release's summary versions instead; see [`crate::summary`].

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::{Uuid, uuid};

use crate::{
  Error, Result,
  content::{ContentDocument, DataBlock},
  summary::NewReleaseSummaryVersion,
};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Editorial state of a release. Stored as the variant name, never as an
/// ordinal.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
pub enum ReleaseStatus {
  #[default]
  Draft,
  HigherLevelReview,
  Approved,
  /// Terminal. Later corrections are recorded as [`Update`]s.
  Published,
}

impl ReleaseStatus {
  pub fn code(self) -> &'static str { self.into() }

  pub fn from_code(code: &str) -> Result<Self> {
    Self::from_str(code).map_err(|_| Error::UnknownStatus(code.to_owned()))
  }

  pub fn is_published(self) -> bool { matches!(self, Self::Published) }

  /// Whether an administrative action may move a release from `self` to
  /// `next`.
  pub fn can_transition_to(self, next: Self) -> bool {
    use ReleaseStatus::*;
    matches!(
      (self, next),
      (Draft, HigherLevelReview)
        | (HigherLevelReview, Draft)
        | (HigherLevelReview, Approved)
        | (Approved, HigherLevelReview)
        | (Approved, Published)
    )
  }

  /// Validate a transition, returning the new status.
  pub fn transition(self, next: Self) -> Result<Self> {
    if self.can_transition_to(next) {
      Ok(next)
    } else {
      Err(Error::InvalidTransition { from: self, to: next })
    }
  }
}

// ─── Release type ────────────────────────────────────────────────────────────

/// Static reference set of release designations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseType {
  pub release_type_id: Uuid,
  pub title:           String,
}

impl ReleaseType {
  pub const OFFICIAL_STATISTICS: Uuid =
    uuid!("9d333457-9132-4e55-ae78-c55cb3673d7c");
  pub const NATIONAL_STATISTICS: Uuid =
    uuid!("8becd272-1100-4e33-8a7d-1c0c4e3b42b8");
  pub const AD_HOC: Uuid = uuid!("1821abb8-68b0-431b-9770-0bea65d02ff0");

  /// The rows every fresh store starts with.
  pub fn defaults() -> Vec<Self> {
    [
      (Self::OFFICIAL_STATISTICS, "Official Statistics"),
      (Self::NATIONAL_STATISTICS, "National Statistics"),
      (Self::AD_HOC, "Ad Hoc"),
    ]
    .into_iter()
    .map(|(release_type_id, title)| Self {
      release_type_id,
      title: title.to_owned(),
    })
    .collect()
  }
}

// ─── Release ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
  pub release_id:     Uuid,
  pub publication_id: Uuid,
  /// Display position among sibling releases; lower sorts first.
  pub order:          i32,
  pub status:         ReleaseStatus,
  pub content:        ContentDocument,
  pub key_statistics: Option<DataBlock>,
  /// Editorial note; never part of a public view.
  pub release_note:   Option<String>,
  pub created_at:     DateTime<Utc>,
  /// Set once, when the release enters [`ReleaseStatus::Published`].
  pub published_at:   Option<DateTime<Utc>>,
}

/// Input to [`crate::store::PublishingStore::create_release`].
///
/// The release, its summary anchor and the first summary version are written
/// together; a release never exists without visible metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRelease {
  pub publication_id: Uuid,
  pub order:          i32,
  #[serde(default)]
  pub content:        ContentDocument,
  pub key_statistics: Option<DataBlock>,
  pub release_note:   Option<String>,
  pub summary:        NewReleaseSummaryVersion,
}

// ─── Updates ─────────────────────────────────────────────────────────────────

/// A post-publication correction notice. Never edited once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
  pub update_id:  Uuid,
  pub release_id: Uuid,
  pub on:         NaiveDate,
  pub reason:     String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUpdate {
  pub on:     NaiveDate,
  pub reason: String,
}
