//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! Calendar dates are `YYYY-MM-DD`. Enumerations are stored by their stable
//! codes. Documents use the versioned envelope from `statpub_core::content`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use statpub_core::{
  content::{ContentDocument, DataBlock},
  methodology::Methodology,
  period::TimePeriodCoverage,
  release::{Release, ReleaseStatus, ReleaseType, Update},
  summary::{ReleaseSummary, ReleaseSummaryVersion, latest_version},
  taxonomy::{Contact, Link, Publication, Theme, Topic},
  view::{PublicationTree, ReleaseView},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_opt_uuid(id: Option<Uuid>) -> Option<String> { id.map(encode_uuid) }

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

/// Truncate to the precision the store keeps, so values handed back to
/// callers compare equal to what a later read returns.
pub fn stored_precision(dt: DateTime<Utc>) -> Result<DateTime<Utc>> {
  decode_dt(&encode_dt(dt))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Each `Raw*` struct holds the strings read directly from one row; the
// matching `*_COLUMNS` constant lists the columns in `from_row` order.

pub const THEME_COLUMNS: &str = "theme_id, slug, title, summary";

pub struct RawTheme {
  pub theme_id: String,
  pub slug:     String,
  pub title:    String,
  pub summary:  String,
}

impl RawTheme {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      theme_id: row.get(0)?,
      slug:     row.get(1)?,
      title:    row.get(2)?,
      summary:  row.get(3)?,
    })
  }

  pub fn into_theme(self) -> Result<Theme> {
    Ok(Theme {
      theme_id: decode_uuid(&self.theme_id)?,
      slug:     self.slug,
      title:    self.title,
      summary:  self.summary,
    })
  }
}

pub const TOPIC_COLUMNS: &str =
  "topic_id, theme_id, slug, title, summary, description";

pub struct RawTopic {
  pub topic_id:    String,
  pub theme_id:    String,
  pub slug:        String,
  pub title:       String,
  pub summary:     String,
  pub description: String,
}

impl RawTopic {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      topic_id:    row.get(0)?,
      theme_id:    row.get(1)?,
      slug:        row.get(2)?,
      title:       row.get(3)?,
      summary:     row.get(4)?,
      description: row.get(5)?,
    })
  }

  pub fn into_topic(self) -> Result<Topic> {
    Ok(Topic {
      topic_id:    decode_uuid(&self.topic_id)?,
      theme_id:    decode_uuid(&self.theme_id)?,
      slug:        self.slug,
      title:       self.title,
      summary:     self.summary,
      description: self.description,
    })
  }
}

pub const CONTACT_COLUMNS: &str =
  "contact_id, team_name, team_email, contact_name, contact_phone";

pub struct RawContact {
  pub contact_id:    String,
  pub team_name:     String,
  pub team_email:    String,
  pub contact_name:  String,
  pub contact_phone: Option<String>,
}

impl RawContact {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:    row.get(0)?,
      team_name:     row.get(1)?,
      team_email:    row.get(2)?,
      contact_name:  row.get(3)?,
      contact_phone: row.get(4)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:    decode_uuid(&self.contact_id)?,
      team_name:     self.team_name,
      team_email:    self.team_email,
      contact_name:  self.contact_name,
      contact_phone: self.contact_phone,
    })
  }
}

pub const METHODOLOGY_COLUMNS: &str =
  "methodology_id, title, summary, content, annexes, published_at, updated_at";

pub struct RawMethodology {
  pub methodology_id: String,
  pub title:          String,
  pub summary:        String,
  pub content:        String,
  pub annexes:        String,
  pub published_at:   Option<String>,
  pub updated_at:     String,
}

impl RawMethodology {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      methodology_id: row.get(0)?,
      title:          row.get(1)?,
      summary:        row.get(2)?,
      content:        row.get(3)?,
      annexes:        row.get(4)?,
      published_at:   row.get(5)?,
      updated_at:     row.get(6)?,
    })
  }

  pub fn into_methodology(self) -> Result<Methodology> {
    Ok(Methodology {
      methodology_id: decode_uuid(&self.methodology_id)?,
      title:          self.title,
      summary:        self.summary,
      content:        ContentDocument::from_stored(&self.content)?,
      annexes:        ContentDocument::from_stored(&self.annexes)?,
      published_at:   decode_opt_dt(self.published_at.as_deref())?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

pub const PUBLICATION_COLUMNS: &str = "publication_id, topic_id, slug, title, \
  description, summary, data_source, next_update, contact_id, methodology_id";

pub struct RawPublication {
  pub publication_id: String,
  pub topic_id:       String,
  pub slug:           String,
  pub title:          String,
  pub description:    String,
  pub summary:        String,
  pub data_source:    String,
  pub next_update:    Option<String>,
  pub contact_id:     Option<String>,
  pub methodology_id: Option<String>,
}

impl RawPublication {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      publication_id: row.get(0)?,
      topic_id:       row.get(1)?,
      slug:           row.get(2)?,
      title:          row.get(3)?,
      description:    row.get(4)?,
      summary:        row.get(5)?,
      data_source:    row.get(6)?,
      next_update:    row.get(7)?,
      contact_id:     row.get(8)?,
      methodology_id: row.get(9)?,
    })
  }

  pub fn into_publication(self) -> Result<Publication> {
    Ok(Publication {
      publication_id: decode_uuid(&self.publication_id)?,
      topic_id:       decode_uuid(&self.topic_id)?,
      slug:           self.slug,
      title:          self.title,
      description:    self.description,
      summary:        self.summary,
      data_source:    self.data_source,
      next_update:    self.next_update.as_deref().map(decode_date).transpose()?,
      contact_id:     decode_opt_uuid(self.contact_id.as_deref())?,
      methodology_id: decode_opt_uuid(self.methodology_id.as_deref())?,
    })
  }
}

pub const LINK_COLUMNS: &str = "link_id, publication_id, description, url";

pub struct RawLink {
  pub link_id:        String,
  pub publication_id: String,
  pub description:    String,
  pub url:            String,
}

impl RawLink {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      link_id:        row.get(0)?,
      publication_id: row.get(1)?,
      description:    row.get(2)?,
      url:            row.get(3)?,
    })
  }

  pub fn into_link(self) -> Result<Link> {
    Ok(Link {
      link_id:        decode_uuid(&self.link_id)?,
      publication_id: decode_uuid(&self.publication_id)?,
      description:    self.description,
      url:            self.url,
    })
  }
}

pub const RELEASE_TYPE_COLUMNS: &str = "release_type_id, title";

pub struct RawReleaseType {
  pub release_type_id: String,
  pub title:           String,
}

impl RawReleaseType {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { release_type_id: row.get(0)?, title: row.get(1)? })
  }

  pub fn into_release_type(self) -> Result<ReleaseType> {
    Ok(ReleaseType {
      release_type_id: decode_uuid(&self.release_type_id)?,
      title:           self.title,
    })
  }
}

pub const RELEASE_COLUMNS: &str = "release_id, publication_id, display_order, \
  status, content, key_statistics, release_note, created_at, published_at";

pub struct RawRelease {
  pub release_id:     String,
  pub publication_id: String,
  pub display_order:  i32,
  pub status:         String,
  pub content:        String,
  pub key_statistics: Option<String>,
  pub release_note:   Option<String>,
  pub created_at:     String,
  pub published_at:   Option<String>,
}

impl RawRelease {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      release_id:     row.get(0)?,
      publication_id: row.get(1)?,
      display_order:  row.get(2)?,
      status:         row.get(3)?,
      content:        row.get(4)?,
      key_statistics: row.get(5)?,
      release_note:   row.get(6)?,
      created_at:     row.get(7)?,
      published_at:   row.get(8)?,
    })
  }

  pub fn into_release(self) -> Result<Release> {
    Ok(Release {
      release_id:     decode_uuid(&self.release_id)?,
      publication_id: decode_uuid(&self.publication_id)?,
      order:          self.display_order,
      status:         ReleaseStatus::from_code(&self.status)?,
      content:        ContentDocument::from_stored(&self.content)?,
      key_statistics: self
        .key_statistics
        .as_deref()
        .map(DataBlock::from_stored)
        .transpose()?,
      release_note:   self.release_note,
      created_at:     decode_dt(&self.created_at)?,
      published_at:   decode_opt_dt(self.published_at.as_deref())?,
    })
  }
}

pub const SUMMARY_COLUMNS: &str = "summary_id, release_id";

pub struct RawSummary {
  pub summary_id: String,
  pub release_id: String,
}

impl RawSummary {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { summary_id: row.get(0)?, release_id: row.get(1)? })
  }

  pub fn into_summary(self) -> Result<ReleaseSummary> {
    Ok(ReleaseSummary {
      summary_id: decode_uuid(&self.summary_id)?,
      release_id: decode_uuid(&self.release_id)?,
    })
  }
}

pub const VERSION_COLUMNS: &str = "version_id, summary_id, sequence, created_at, \
  release_name, slug, summary, publish_scheduled, release_type_id, \
  time_period_coverage, next_release_date";

pub struct RawVersion {
  pub version_id:           String,
  pub summary_id:           String,
  pub sequence:             i64,
  pub created_at:           String,
  pub release_name:         String,
  pub slug:                 String,
  pub summary:              String,
  pub publish_scheduled:    Option<String>,
  pub release_type_id:      String,
  pub time_period_coverage: String,
  pub next_release_date:    Option<String>,
}

impl RawVersion {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      version_id:           row.get(0)?,
      summary_id:           row.get(1)?,
      sequence:             row.get(2)?,
      created_at:           row.get(3)?,
      release_name:         row.get(4)?,
      slug:                 row.get(5)?,
      summary:              row.get(6)?,
      publish_scheduled:    row.get(7)?,
      release_type_id:      row.get(8)?,
      time_period_coverage: row.get(9)?,
      next_release_date:    row.get(10)?,
    })
  }

  pub fn into_version(self) -> Result<ReleaseSummaryVersion> {
    Ok(ReleaseSummaryVersion {
      version_id:           decode_uuid(&self.version_id)?,
      summary_id:           decode_uuid(&self.summary_id)?,
      sequence:             self.sequence,
      created_at:           decode_dt(&self.created_at)?,
      release_name:         self.release_name,
      slug:                 self.slug,
      summary:              self.summary,
      publish_scheduled:    decode_opt_dt(self.publish_scheduled.as_deref())?,
      release_type_id:      decode_uuid(&self.release_type_id)?,
      time_period_coverage: TimePeriodCoverage::from_code(&self.time_period_coverage)?,
      next_release_date:    self.next_release_date,
    })
  }
}

pub const UPDATE_COLUMNS: &str = "update_id, release_id, on_date, reason";

pub struct RawUpdate {
  pub update_id:  String,
  pub release_id: String,
  pub on_date:    String,
  pub reason:     String,
}

impl RawUpdate {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      update_id:  row.get(0)?,
      release_id: row.get(1)?,
      on_date:    row.get(2)?,
      reason:     row.get(3)?,
    })
  }

  pub fn into_update(self) -> Result<Update> {
    Ok(Update {
      update_id:  decode_uuid(&self.update_id)?,
      release_id: decode_uuid(&self.release_id)?,
      on:         decode_date(&self.on_date)?,
      reason:     self.reason,
    })
  }
}

// ─── Composite reads ─────────────────────────────────────────────────────────

/// Everything read for one release: the row, its summary anchor, the full
/// version history and its updates.
pub struct RawReleaseBundle {
  pub release:  RawRelease,
  pub summary:  RawSummary,
  pub versions: Vec<RawVersion>,
  pub updates:  Vec<RawUpdate>,
}

impl RawReleaseBundle {
  /// Resolve the authoritative version and join its release type from
  /// `types`.
  pub fn into_view(self, types: &[ReleaseType]) -> Result<ReleaseView> {
    let summary = self.summary.into_summary()?;
    let versions = self
      .versions
      .into_iter()
      .map(RawVersion::into_version)
      .collect::<Result<Vec<_>>>()?;

    let current = latest_version(&versions)
      .cloned()
      .ok_or(Error::SummaryVersionNotFound(summary.summary_id))?;

    let release_type = types
      .iter()
      .find(|t| t.release_type_id == current.release_type_id)
      .cloned()
      .ok_or(Error::ReleaseTypeNotFound(current.release_type_id))?;

    let updates = self
      .updates
      .into_iter()
      .map(RawUpdate::into_update)
      .collect::<Result<Vec<_>>>()?;

    Ok(ReleaseView {
      release: self.release.into_release()?,
      summary,
      current,
      release_type,
      updates,
    })
  }
}

pub fn decode_release_types(raws: Vec<RawReleaseType>) -> Result<Vec<ReleaseType>> {
  raws.into_iter().map(RawReleaseType::into_release_type).collect()
}

/// Everything read for a publication's public tree. `releases` holds only
/// published releases, already in display order.
pub struct RawPublicationTree {
  pub publication: RawPublication,
  pub topic:       RawTopic,
  pub theme:       RawTheme,
  pub methodology: Option<RawMethodology>,
  pub contact:     Option<RawContact>,
  pub links:       Vec<RawLink>,
  pub releases:    Vec<RawReleaseBundle>,
  pub types:       Vec<RawReleaseType>,
}

impl RawPublicationTree {
  pub fn into_tree(self, as_of: DateTime<Utc>) -> Result<PublicationTree> {
    let types = decode_release_types(self.types)?;
    let releases = self
      .releases
      .into_iter()
      .map(|bundle| bundle.into_view(&types).map(ReleaseView::into_public))
      .collect::<Result<Vec<_>>>()?;

    Ok(PublicationTree {
      theme: self.theme.into_theme()?,
      topic: self.topic.into_topic()?,
      publication: self.publication.into_publication()?,
      methodology: self
        .methodology
        .map(RawMethodology::into_methodology)
        .transpose()?,
      contact: self.contact.map(RawContact::into_contact).transpose()?,
      links: self
        .links
        .into_iter()
        .map(RawLink::into_link)
        .collect::<Result<Vec<_>>>()?,
      releases,
      as_of,
    })
  }
}
