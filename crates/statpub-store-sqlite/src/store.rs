//! [`SqliteStore`]: the SQLite implementation of [`PublishingStore`].
//!
//! Multi-row writes run inside a single `call` closure and a single
//! transaction. Closures that can fail for domain reasons return
//! `Ok(Err(..))`, which drops (and so rolls back) the transaction; the outer
//! `Result` carries database failures only.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, Row};
use uuid::Uuid;

use statpub_core::{
  content::{ContentDocument, DataBlock},
  methodology::{Methodology, NewMethodology},
  release::{NewRelease, NewUpdate, Release, ReleaseStatus, ReleaseType, Update},
  store::PublishingStore,
  summary::{
    NewReleaseSummaryVersion, ReleaseSummary, ReleaseSummaryVersion,
    check_import_time, latest_version,
  },
  taxonomy::{
    Contact, Link, NewContact, NewLink, NewPublication, NewTheme, NewTopic,
    Publication, Theme, Topic,
  },
  view::{
    PublicRelease, PublicationListing, PublicationTree, ReleaseView,
    ThemeListing, TopicListing,
  },
};

use crate::{
  Error, Result,
  encode::{
    CONTACT_COLUMNS, LINK_COLUMNS, METHODOLOGY_COLUMNS, PUBLICATION_COLUMNS,
    RELEASE_COLUMNS, RELEASE_TYPE_COLUMNS, RawContact, RawLink, RawMethodology,
    RawPublication, RawPublicationTree, RawRelease, RawReleaseBundle,
    RawReleaseType, RawSummary, RawTheme, RawTopic, RawUpdate, RawVersion,
    SUMMARY_COLUMNS, THEME_COLUMNS, TOPIC_COLUMNS, UPDATE_COLUMNS,
    VERSION_COLUMNS, decode_release_types, encode_date, encode_dt,
    encode_opt_uuid, encode_uuid, stored_precision,
  },
  schema::{SCHEMA, SEED},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A publishing store backed by a single SQLite file.
///
/// Clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        // Pragmas in SCHEMA must run outside a transaction.
        conn.execute_batch(SCHEMA)?;
        if version == 0 {
          conn.execute_batch(SEED)?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row lookup keyed by one text parameter.
  async fn fetch_one<R>(
    &self,
    sql: String,
    key: String,
    map: fn(&Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<Option<R>>
  where
    R: Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.query_row(&sql, [key], map).optional()?))
        .await?,
    )
  }

  /// Run a multi-row query with no parameters.
  async fn fetch_all<R>(
    &self,
    sql: String,
    map: fn(&Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt.query_map([], map)?.collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  /// Delete one row by primary key. A restrict-style foreign key surfaces as
  /// [`Error::ConstraintViolation`]; a missing row as `not_found`.
  async fn delete_by_id(
    &self,
    sql: &'static str,
    id: Uuid,
    not_found: fn(Uuid) -> Error,
  ) -> Result<()> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, [id_str])?))
      .await?;
    if deleted == 0 {
      return Err(not_found(id));
    }
    Ok(())
  }

  async fn read_release(&self, id: Uuid) -> Result<Release> {
    self
      .fetch_one(
        format!("SELECT {RELEASE_COLUMNS} FROM releases WHERE release_id = ?1"),
        encode_uuid(id),
        RawRelease::from_row,
      )
      .await?
      .ok_or(Error::ReleaseNotFound(id))?
      .into_release()
  }

  async fn read_publication(&self, id: Uuid) -> Result<Publication> {
    self
      .get_publication(id)
      .await?
      .ok_or(Error::PublicationNotFound(id))
  }

  /// Apply a single-column `UPDATE` to a release and read it back.
  async fn update_release_column(
    &self,
    id: Uuid,
    sql: &'static str,
    value: Option<String>,
  ) -> Result<Release> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id_str, value])?))
      .await?;
    if changed == 0 {
      return Err(Error::ReleaseNotFound(id));
    }
    self.read_release(id).await
  }

  /// Write the release, its summary anchor and first version dated
  /// `created_at` in one transaction.
  async fn insert_release(
    &self,
    input: NewRelease,
    created_at: DateTime<Utc>,
  ) -> Result<ReleaseView> {
    let summary = ReleaseSummary {
      summary_id: Uuid::new_v4(),
      release_id: Uuid::new_v4(),
    };
    let (mut version, version_row) =
      prepare_version(summary.summary_id, input.summary, created_at)?;

    let release = Release {
      release_id:     summary.release_id,
      publication_id: input.publication_id,
      order:          input.order,
      status:         ReleaseStatus::Draft,
      content:        input.content,
      key_statistics: input.key_statistics,
      release_note:   input.release_note,
      created_at:     version.created_at,
      published_at:   None,
    };

    let publication_id     = release.publication_id;
    let release_type_id    = version.release_type_id;
    let release_id_str     = encode_uuid(release.release_id);
    let summary_id_str     = encode_uuid(summary.summary_id);
    let publication_id_str = encode_uuid(publication_id);
    let order              = release.order;
    let status             = release.status.code();
    let content            = release.content.to_stored()?;
    let key_statistics     = release.key_statistics.as_ref().map(DataBlock::to_stored).transpose()?;
    let release_note       = release.release_note.clone();
    let created_at         = encode_dt(release.created_at);

    let (sequence, raw_type) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !exists(&tx, "SELECT 1 FROM publications WHERE publication_id = ?1", &publication_id_str)? {
          return Ok(Err(Error::PublicationNotFound(publication_id)));
        }
        let raw_type = tx
          .query_row(
            &format!("SELECT {RELEASE_TYPE_COLUMNS} FROM release_types WHERE release_type_id = ?1"),
            [&version_row.release_type_id],
            RawReleaseType::from_row,
          )
          .optional()?;
        let Some(raw_type) = raw_type else {
          return Ok(Err(Error::ReleaseTypeNotFound(release_type_id)));
        };
        if release_slug_taken(&tx, &publication_id_str, &release_id_str, &version_row.slug)? {
          return Ok(Err(Error::DuplicateSlug(version_row.slug)));
        }

        tx.execute(
          "INSERT INTO releases (
             release_id, publication_id, display_order, status, content,
             key_statistics, release_note, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            release_id_str,
            publication_id_str,
            order,
            status,
            content,
            key_statistics,
            release_note,
            created_at,
          ],
        )?;
        tx.execute(
          "INSERT INTO release_summaries (summary_id, release_id) VALUES (?1, ?2)",
          rusqlite::params![summary_id_str, release_id_str],
        )?;
        let sequence = version_row.insert(&tx)?;

        tx.commit()?;
        Ok(Ok((sequence, raw_type)))
      })
      .await??;

    version.sequence = sequence;
    Ok(ReleaseView {
      release,
      summary,
      current: version,
      release_type: raw_type.into_release_type()?,
      updates: Vec::new(),
    })
  }

  /// Insert one version dated `created_at`, checking that the summary exists
  /// and that the slug is free within the publication.
  async fn insert_version(
    &self,
    summary_id: Uuid,
    input: NewReleaseSummaryVersion,
    created_at: DateTime<Utc>,
  ) -> Result<ReleaseSummaryVersion> {
    let (mut version, row) = prepare_version(summary_id, input, created_at)?;
    let release_type_id = version.release_type_id;

    version.sequence = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let owner: Option<(String, String)> = tx
          .query_row(
            "SELECT r.release_id, r.publication_id
             FROM release_summaries s
             JOIN releases r ON r.release_id = s.release_id
             WHERE s.summary_id = ?1",
            [&row.summary_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        let Some((release_id, publication_id)) = owner else {
          return Ok(Err(Error::SummaryNotFound(summary_id)));
        };
        if !exists(&tx, "SELECT 1 FROM release_types WHERE release_type_id = ?1", &row.release_type_id)? {
          return Ok(Err(Error::ReleaseTypeNotFound(release_type_id)));
        }
        if release_slug_taken(&tx, &publication_id, &release_id, &row.slug)? {
          return Ok(Err(Error::DuplicateSlug(row.slug)));
        }

        let sequence = row.insert(&tx)?;
        tx.commit()?;
        Ok(Ok(sequence))
      })
      .await??;

    Ok(version)
  }
}

// ─── Synchronous helpers (run inside `call` closures) ────────────────────────

fn exists(conn: &Connection, sql: &str, key: &str) -> rusqlite::Result<bool> {
  Ok(conn.query_row(sql, [key], |_| Ok(())).optional()?.is_some())
}

/// Whether another release of the publication currently uses `slug`, judged
/// by each release's authoritative version.
fn release_slug_taken(
  conn: &Connection,
  publication_id: &str,
  except_release_id: &str,
  slug: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1
         FROM releases r
         JOIN release_summaries s        ON s.release_id = r.release_id
         JOIN release_summary_versions v ON v.summary_id = s.summary_id
         WHERE r.publication_id = ?1
           AND r.release_id    != ?2
           AND v.slug           = ?3
           AND v.sequence = (
             SELECT v2.sequence FROM release_summary_versions v2
             WHERE v2.summary_id = s.summary_id
             ORDER BY v2.created_at DESC, v2.sequence DESC
             LIMIT 1
           )
         LIMIT 1",
        rusqlite::params![publication_id, except_release_id, slug],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// Encoded column values of a summary version about to be inserted.
struct VersionRow {
  version_id:           String,
  summary_id:           String,
  created_at:           String,
  release_name:         String,
  slug:                 String,
  summary:              String,
  publish_scheduled:    Option<String>,
  release_type_id:      String,
  time_period_coverage: String,
  next_release_date:    Option<String>,
}

impl VersionRow {
  /// Returns the store-assigned sequence.
  fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
    conn.execute(
      "INSERT INTO release_summary_versions (
         version_id, summary_id, created_at, release_name, slug, summary,
         publish_scheduled, release_type_id, time_period_coverage,
         next_release_date
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
      rusqlite::params![
        self.version_id,
        self.summary_id,
        self.created_at,
        self.release_name,
        self.slug,
        self.summary,
        self.publish_scheduled,
        self.release_type_id,
        self.time_period_coverage,
        self.next_release_date,
      ],
    )?;
    Ok(conn.last_insert_rowid())
  }
}

/// Build the domain version and its encoded row for `summary_id`.
fn prepare_version(
  summary_id: Uuid,
  input: NewReleaseSummaryVersion,
  created_at: DateTime<Utc>,
) -> Result<(ReleaseSummaryVersion, VersionRow)> {
  input.validate()?;
  let created_at = stored_precision(created_at)?;
  let publish_scheduled = input.publish_scheduled.map(stored_precision).transpose()?;

  let version = ReleaseSummaryVersion {
    version_id: Uuid::new_v4(),
    summary_id,
    sequence: 0,
    created_at,
    release_name: input.release_name,
    slug: input.slug,
    summary: input.summary,
    publish_scheduled,
    release_type_id: input.release_type_id,
    time_period_coverage: input.time_period_coverage,
    next_release_date: input.next_release_date,
  };

  let row = VersionRow {
    version_id:           encode_uuid(version.version_id),
    summary_id:           encode_uuid(summary_id),
    created_at:           encode_dt(version.created_at),
    release_name:         version.release_name.clone(),
    slug:                 version.slug.clone(),
    summary:              version.summary.clone(),
    publish_scheduled:    version.publish_scheduled.map(encode_dt),
    release_type_id:      encode_uuid(version.release_type_id),
    time_period_coverage: version.time_period_coverage.code().to_owned(),
    next_release_date:    version.next_release_date.clone(),
  };

  Ok((version, row))
}

fn read_release_types(conn: &Connection) -> rusqlite::Result<Vec<RawReleaseType>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {RELEASE_TYPE_COLUMNS} FROM release_types ORDER BY title"
  ))?;
  let rows = stmt
    .query_map([], RawReleaseType::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn read_versions(conn: &Connection, summary_id: &str) -> rusqlite::Result<Vec<RawVersion>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {VERSION_COLUMNS} FROM release_summary_versions
     WHERE summary_id = ?1
     ORDER BY sequence"
  ))?;
  let rows = stmt
    .query_map([summary_id], RawVersion::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn read_updates(conn: &Connection, release_id: &str) -> rusqlite::Result<Vec<RawUpdate>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {UPDATE_COLUMNS} FROM updates
     WHERE release_id = ?1
     ORDER BY on_date, rowid"
  ))?;
  let rows = stmt
    .query_map([release_id], RawUpdate::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn read_release_bundle(
  conn: &Connection,
  release_id: &str,
) -> rusqlite::Result<Option<RawReleaseBundle>> {
  let release = conn
    .query_row(
      &format!("SELECT {RELEASE_COLUMNS} FROM releases WHERE release_id = ?1"),
      [release_id],
      RawRelease::from_row,
    )
    .optional()?;
  let Some(release) = release else {
    return Ok(None);
  };

  let summary = conn.query_row(
    &format!("SELECT {SUMMARY_COLUMNS} FROM release_summaries WHERE release_id = ?1"),
    [release_id],
    RawSummary::from_row,
  )?;
  let versions = read_versions(conn, &summary.summary_id)?;
  let updates = read_updates(conn, release_id)?;

  Ok(Some(RawReleaseBundle { release, summary, versions, updates }))
}

/// The published release of the publication whose authoritative version
/// carries `release_slug`.
fn read_public_release(
  conn: &Connection,
  publication_slug: &str,
  release_slug: &str,
) -> rusqlite::Result<Option<RawReleaseBundle>> {
  let release_id: Option<String> = conn
    .query_row(
      "SELECT r.release_id
       FROM publications p
       JOIN releases r                 ON r.publication_id = p.publication_id
       JOIN release_summaries s        ON s.release_id = r.release_id
       JOIN release_summary_versions v ON v.summary_id = s.summary_id
       WHERE p.slug   = ?1
         AND r.status = ?2
         AND v.slug   = ?3
         AND v.sequence = (
           SELECT v2.sequence FROM release_summary_versions v2
           WHERE v2.summary_id = s.summary_id
           ORDER BY v2.created_at DESC, v2.sequence DESC
           LIMIT 1
         )
       LIMIT 1",
      rusqlite::params![publication_slug, ReleaseStatus::Published.code(), release_slug],
      |r| r.get(0),
    )
    .optional()?;

  match release_id {
    Some(id) => read_release_bundle(conn, &id),
    None => Ok(None),
  }
}

fn read_publication_tree(
  conn: &Connection,
  slug: &str,
) -> rusqlite::Result<Option<RawPublicationTree>> {
  let publication = conn
    .query_row(
      &format!("SELECT {PUBLICATION_COLUMNS} FROM publications WHERE slug = ?1"),
      [slug],
      RawPublication::from_row,
    )
    .optional()?;
  let Some(publication) = publication else {
    return Ok(None);
  };

  let release_ids: Vec<String> = {
    let mut stmt = conn.prepare(
      "SELECT release_id FROM releases
       WHERE publication_id = ?1 AND status = ?2
       ORDER BY display_order, rowid",
    )?;
    stmt
      .query_map(
        rusqlite::params![publication.publication_id, ReleaseStatus::Published.code()],
        |r| r.get(0),
      )?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };
  if release_ids.is_empty() {
    return Ok(None);
  }

  let mut releases = Vec::with_capacity(release_ids.len());
  for id in &release_ids {
    if let Some(bundle) = read_release_bundle(conn, id)? {
      releases.push(bundle);
    }
  }

  let topic = conn.query_row(
    &format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE topic_id = ?1"),
    [&publication.topic_id],
    RawTopic::from_row,
  )?;
  let theme = conn.query_row(
    &format!("SELECT {THEME_COLUMNS} FROM themes WHERE theme_id = ?1"),
    [&topic.theme_id],
    RawTheme::from_row,
  )?;

  let methodology = match &publication.methodology_id {
    Some(id) => conn
      .query_row(
        &format!("SELECT {METHODOLOGY_COLUMNS} FROM methodologies WHERE methodology_id = ?1"),
        [id],
        RawMethodology::from_row,
      )
      .optional()?,
    None => None,
  };
  let contact = match &publication.contact_id {
    Some(id) => conn
      .query_row(
        &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1"),
        [id],
        RawContact::from_row,
      )
      .optional()?,
    None => None,
  };

  let links = {
    let mut stmt = conn.prepare(&format!(
      "SELECT {LINK_COLUMNS} FROM links WHERE publication_id = ?1 ORDER BY rowid"
    ))?;
    stmt
      .query_map([&publication.publication_id], RawLink::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let types = read_release_types(conn)?;

  Ok(Some(RawPublicationTree {
    publication,
    topic,
    theme,
    methodology,
    contact,
    links,
    releases,
    types,
  }))
}

// ─── PublishingStore impl ────────────────────────────────────────────────────

impl PublishingStore for SqliteStore {
  type Error = Error;

  // ── Taxonomy ──────────────────────────────────────────────────────────────

  async fn add_theme(&self, input: NewTheme) -> Result<Theme> {
    input.validate()?;
    let theme = Theme {
      theme_id: Uuid::new_v4(),
      slug:     input.slug,
      title:    input.title,
      summary:  input.summary,
    };

    let id_str  = encode_uuid(theme.theme_id);
    let slug    = theme.slug.clone();
    let title   = theme.title.clone();
    let summary = theme.summary.clone();

    self
      .conn
      .call(move |conn| {
        if exists(conn, "SELECT 1 FROM themes WHERE slug = ?1", &slug)? {
          return Ok(Err(Error::DuplicateSlug(slug)));
        }
        conn.execute(
          "INSERT INTO themes (theme_id, slug, title, summary) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, slug, title, summary],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(theme)
  }

  async fn get_theme(&self, id: Uuid) -> Result<Option<Theme>> {
    self
      .fetch_one(
        format!("SELECT {THEME_COLUMNS} FROM themes WHERE theme_id = ?1"),
        encode_uuid(id),
        RawTheme::from_row,
      )
      .await?
      .map(RawTheme::into_theme)
      .transpose()
  }

  async fn list_themes(&self) -> Result<Vec<Theme>> {
    self
      .fetch_all(
        format!("SELECT {THEME_COLUMNS} FROM themes ORDER BY title"),
        RawTheme::from_row,
      )
      .await?
      .into_iter()
      .map(RawTheme::into_theme)
      .collect()
  }

  async fn add_topic(&self, input: NewTopic) -> Result<Topic> {
    input.validate()?;
    let topic = Topic {
      topic_id:    Uuid::new_v4(),
      theme_id:    input.theme_id,
      slug:        input.slug,
      title:       input.title,
      summary:     input.summary,
      description: input.description,
    };

    let theme_id        = topic.theme_id;
    let id_str          = encode_uuid(topic.topic_id);
    let theme_id_str    = encode_uuid(theme_id);
    let slug            = topic.slug.clone();
    let title           = topic.title.clone();
    let summary         = topic.summary.clone();
    let description     = topic.description.clone();

    self
      .conn
      .call(move |conn| {
        if !exists(conn, "SELECT 1 FROM themes WHERE theme_id = ?1", &theme_id_str)? {
          return Ok(Err(Error::ThemeNotFound(theme_id)));
        }
        let taken = conn
          .query_row(
            "SELECT 1 FROM topics WHERE theme_id = ?1 AND slug = ?2",
            rusqlite::params![theme_id_str, slug],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Err(Error::DuplicateSlug(slug)));
        }
        conn.execute(
          "INSERT INTO topics (topic_id, theme_id, slug, title, summary, description)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, theme_id_str, slug, title, summary, description],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(topic)
  }

  async fn get_topic(&self, id: Uuid) -> Result<Option<Topic>> {
    self
      .fetch_one(
        format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE topic_id = ?1"),
        encode_uuid(id),
        RawTopic::from_row,
      )
      .await?
      .map(RawTopic::into_topic)
      .transpose()
  }

  // ── Shared references ─────────────────────────────────────────────────────

  async fn add_contact(&self, input: NewContact) -> Result<Contact> {
    let contact = Contact {
      contact_id:    Uuid::new_v4(),
      team_name:     input.team_name,
      team_email:    input.team_email,
      contact_name:  input.contact_name,
      contact_phone: input.contact_phone,
    };

    let id_str = encode_uuid(contact.contact_id);
    let row = contact.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (contact_id, team_name, team_email, contact_name, contact_phone)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            id_str,
            row.team_name,
            row.team_email,
            row.contact_name,
            row.contact_phone,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(contact)
  }

  async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>> {
    self
      .fetch_one(
        format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1"),
        encode_uuid(id),
        RawContact::from_row,
      )
      .await?
      .map(RawContact::into_contact)
      .transpose()
  }

  async fn delete_contact(&self, id: Uuid) -> Result<()> {
    self
      .delete_by_id(
        "DELETE FROM contacts WHERE contact_id = ?1",
        id,
        Error::ContactNotFound,
      )
      .await
  }

  async fn add_methodology(&self, input: NewMethodology) -> Result<Methodology> {
    let methodology = Methodology {
      methodology_id: Uuid::new_v4(),
      title:          input.title,
      summary:        input.summary,
      content:        input.content,
      annexes:        input.annexes,
      published_at:   input.published_at.map(stored_precision).transpose()?,
      updated_at:     stored_precision(Utc::now())?,
    };

    let id_str        = encode_uuid(methodology.methodology_id);
    let title         = methodology.title.clone();
    let summary       = methodology.summary.clone();
    let content       = methodology.content.to_stored()?;
    let annexes       = methodology.annexes.to_stored()?;
    let published_at  = methodology.published_at.map(encode_dt);
    let updated_at    = encode_dt(methodology.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO methodologies (
             methodology_id, title, summary, content, annexes, published_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, title, summary, content, annexes, published_at, updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(methodology)
  }

  async fn get_methodology(&self, id: Uuid) -> Result<Option<Methodology>> {
    self
      .fetch_one(
        format!("SELECT {METHODOLOGY_COLUMNS} FROM methodologies WHERE methodology_id = ?1"),
        encode_uuid(id),
        RawMethodology::from_row,
      )
      .await?
      .map(RawMethodology::into_methodology)
      .transpose()
  }

  async fn delete_methodology(&self, id: Uuid) -> Result<()> {
    self
      .delete_by_id(
        "DELETE FROM methodologies WHERE methodology_id = ?1",
        id,
        Error::MethodologyNotFound,
      )
      .await
  }

  async fn add_release_type(&self, title: String) -> Result<ReleaseType> {
    let release_type = ReleaseType { release_type_id: Uuid::new_v4(), title };
    let id_str = encode_uuid(release_type.release_type_id);
    let title = release_type.title.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO release_types (release_type_id, title) VALUES (?1, ?2)",
          rusqlite::params![id_str, title],
        )?;
        Ok(())
      })
      .await?;

    Ok(release_type)
  }

  async fn list_release_types(&self) -> Result<Vec<ReleaseType>> {
    let raws = self.conn.call(|conn| Ok(read_release_types(conn)?)).await?;
    decode_release_types(raws)
  }

  async fn delete_release_type(&self, id: Uuid) -> Result<()> {
    self
      .delete_by_id(
        "DELETE FROM release_types WHERE release_type_id = ?1",
        id,
        Error::ReleaseTypeNotFound,
      )
      .await
  }

  // ── Publications ──────────────────────────────────────────────────────────

  async fn add_publication(&self, input: NewPublication) -> Result<Publication> {
    input.validate()?;
    let publication = Publication {
      publication_id: Uuid::new_v4(),
      topic_id:       input.topic_id,
      slug:           input.slug,
      title:          input.title,
      description:    input.description,
      summary:        input.summary,
      data_source:    input.data_source,
      next_update:    input.next_update,
      contact_id:     input.contact_id,
      methodology_id: input.methodology_id,
    };

    let topic_id          = publication.topic_id;
    let contact_id        = publication.contact_id;
    let methodology_id    = publication.methodology_id;
    let id_str            = encode_uuid(publication.publication_id);
    let topic_id_str      = encode_uuid(topic_id);
    let slug              = publication.slug.clone();
    let title             = publication.title.clone();
    let description       = publication.description.clone();
    let summary           = publication.summary.clone();
    let data_source       = publication.data_source.clone();
    let next_update       = publication.next_update.map(encode_date);
    let contact_id_str    = encode_opt_uuid(contact_id);
    let methodology_id_str = encode_opt_uuid(methodology_id);

    self
      .conn
      .call(move |conn| {
        if !exists(conn, "SELECT 1 FROM topics WHERE topic_id = ?1", &topic_id_str)? {
          return Ok(Err(Error::TopicNotFound(topic_id)));
        }
        if let (Some(id), Some(id_str)) = (contact_id, &contact_id_str) {
          if !exists(conn, "SELECT 1 FROM contacts WHERE contact_id = ?1", id_str)? {
            return Ok(Err(Error::ContactNotFound(id)));
          }
        }
        if let (Some(id), Some(id_str)) = (methodology_id, &methodology_id_str) {
          if !exists(conn, "SELECT 1 FROM methodologies WHERE methodology_id = ?1", id_str)? {
            return Ok(Err(Error::MethodologyNotFound(id)));
          }
        }
        if exists(conn, "SELECT 1 FROM publications WHERE slug = ?1", &slug)? {
          return Ok(Err(Error::DuplicateSlug(slug)));
        }
        conn.execute(
          "INSERT INTO publications (
             publication_id, topic_id, slug, title, description, summary,
             data_source, next_update, contact_id, methodology_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            topic_id_str,
            slug,
            title,
            description,
            summary,
            data_source,
            next_update,
            contact_id_str,
            methodology_id_str,
          ],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(publication)
  }

  async fn get_publication(&self, id: Uuid) -> Result<Option<Publication>> {
    self
      .fetch_one(
        format!("SELECT {PUBLICATION_COLUMNS} FROM publications WHERE publication_id = ?1"),
        encode_uuid(id),
        RawPublication::from_row,
      )
      .await?
      .map(RawPublication::into_publication)
      .transpose()
  }

  async fn set_publication_methodology(
    &self,
    publication_id: Uuid,
    methodology_id: Option<Uuid>,
  ) -> Result<Publication> {
    let pub_id_str = encode_uuid(publication_id);
    let meth_id_str = encode_opt_uuid(methodology_id);

    self
      .conn
      .call(move |conn| {
        if let (Some(id), Some(id_str)) = (methodology_id, &meth_id_str) {
          if !exists(conn, "SELECT 1 FROM methodologies WHERE methodology_id = ?1", id_str)? {
            return Ok(Err(Error::MethodologyNotFound(id)));
          }
        }
        let changed = conn.execute(
          "UPDATE publications SET methodology_id = ?2 WHERE publication_id = ?1",
          rusqlite::params![pub_id_str, meth_id_str],
        )?;
        if changed == 0 {
          return Ok(Err(Error::PublicationNotFound(publication_id)));
        }
        Ok(Ok(()))
      })
      .await??;

    self.read_publication(publication_id).await
  }

  async fn set_publication_contact(
    &self,
    publication_id: Uuid,
    contact_id: Option<Uuid>,
  ) -> Result<Publication> {
    let pub_id_str = encode_uuid(publication_id);
    let contact_id_str = encode_opt_uuid(contact_id);

    self
      .conn
      .call(move |conn| {
        if let (Some(id), Some(id_str)) = (contact_id, &contact_id_str) {
          if !exists(conn, "SELECT 1 FROM contacts WHERE contact_id = ?1", id_str)? {
            return Ok(Err(Error::ContactNotFound(id)));
          }
        }
        let changed = conn.execute(
          "UPDATE publications SET contact_id = ?2 WHERE publication_id = ?1",
          rusqlite::params![pub_id_str, contact_id_str],
        )?;
        if changed == 0 {
          return Ok(Err(Error::PublicationNotFound(publication_id)));
        }
        Ok(Ok(()))
      })
      .await??;

    self.read_publication(publication_id).await
  }

  async fn add_link(&self, publication_id: Uuid, input: NewLink) -> Result<Link> {
    let link = Link {
      link_id: Uuid::new_v4(),
      publication_id,
      description: input.description,
      url: input.url,
    };

    let id_str      = encode_uuid(link.link_id);
    let pub_id_str  = encode_uuid(publication_id);
    let description = link.description.clone();
    let url         = link.url.clone();

    self
      .conn
      .call(move |conn| {
        if !exists(conn, "SELECT 1 FROM publications WHERE publication_id = ?1", &pub_id_str)? {
          return Ok(Err(Error::PublicationNotFound(publication_id)));
        }
        conn.execute(
          "INSERT INTO links (link_id, publication_id, description, url)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, pub_id_str, description, url],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(link)
  }

  async fn delete_publication(&self, id: Uuid) -> Result<()> {
    self
      .delete_by_id(
        "DELETE FROM publications WHERE publication_id = ?1",
        id,
        Error::PublicationNotFound,
      )
      .await
  }

  // ── Releases ──────────────────────────────────────────────────────────────

  async fn create_release(&self, input: NewRelease) -> Result<ReleaseView> {
    self.insert_release(input, Utc::now()).await
  }

  async fn import_release(
    &self,
    input: NewRelease,
    created_at: DateTime<Utc>,
  ) -> Result<ReleaseView> {
    check_import_time(created_at, Utc::now())?;
    self.insert_release(input, created_at).await
  }

  async fn release_view(&self, id: Uuid) -> Result<Option<ReleaseView>> {
    let id_str = encode_uuid(id);
    let (bundle, types) = self
      .conn
      .call(move |conn| {
        let bundle = read_release_bundle(conn, &id_str)?;
        let types = read_release_types(conn)?;
        Ok((bundle, types))
      })
      .await?;

    let types = decode_release_types(types)?;
    bundle.map(|b| b.into_view(&types)).transpose()
  }

  async fn update_release_content(
    &self,
    id: Uuid,
    content: ContentDocument,
  ) -> Result<Release> {
    self
      .update_release_column(
        id,
        "UPDATE releases SET content = ?2 WHERE release_id = ?1",
        Some(content.to_stored()?),
      )
      .await
  }

  async fn update_key_statistics(
    &self,
    id: Uuid,
    key_statistics: Option<DataBlock>,
  ) -> Result<Release> {
    self
      .update_release_column(
        id,
        "UPDATE releases SET key_statistics = ?2 WHERE release_id = ?1",
        key_statistics.as_ref().map(DataBlock::to_stored).transpose()?,
      )
      .await
  }

  async fn update_release_note(&self, id: Uuid, note: Option<String>) -> Result<Release> {
    self
      .update_release_column(
        id,
        "UPDATE releases SET release_note = ?2 WHERE release_id = ?1",
        note,
      )
      .await
  }

  async fn set_release_status(&self, id: Uuid, status: ReleaseStatus) -> Result<Release> {
    let id_str = encode_uuid(id);
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM releases WHERE release_id = ?1",
            [&id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(Err(Error::ReleaseNotFound(id)));
        };
        let next = match ReleaseStatus::from_code(&current)
          .and_then(|from| from.transition(status))
        {
          Ok(next) => next,
          Err(e) => return Ok(Err(e.into())),
        };

        if next.is_published() {
          tx.execute(
            "UPDATE releases SET status = ?2, published_at = ?3 WHERE release_id = ?1",
            rusqlite::params![id_str, next.code(), now],
          )?;
        } else {
          tx.execute(
            "UPDATE releases SET status = ?2 WHERE release_id = ?1",
            rusqlite::params![id_str, next.code()],
          )?;
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    self.read_release(id).await
  }

  async fn add_update(&self, release_id: Uuid, input: NewUpdate) -> Result<Update> {
    let update = Update {
      update_id: Uuid::new_v4(),
      release_id,
      on: input.on,
      reason: input.reason,
    };

    let id_str         = encode_uuid(update.update_id);
    let release_id_str = encode_uuid(release_id);
    let on_date        = encode_date(update.on);
    let reason         = update.reason.clone();

    self
      .conn
      .call(move |conn| {
        let status: Option<String> = conn
          .query_row(
            "SELECT status FROM releases WHERE release_id = ?1",
            [&release_id_str],
            |r| r.get(0),
          )
          .optional()?;
        match status.as_deref() {
          None => return Ok(Err(Error::ReleaseNotFound(release_id))),
          Some(code) if code != ReleaseStatus::Published.code() => {
            return Ok(Err(Error::NotPublished(release_id)));
          }
          Some(_) => {}
        }
        conn.execute(
          "INSERT INTO updates (update_id, release_id, on_date, reason)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, release_id_str, on_date, reason],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(update)
  }

  async fn updates(&self, release_id: Uuid) -> Result<Vec<Update>> {
    let id_str = encode_uuid(release_id);
    self
      .conn
      .call(move |conn| Ok(read_updates(conn, &id_str)?))
      .await?
      .into_iter()
      .map(RawUpdate::into_update)
      .collect()
  }

  // ── Summary versions (append-only) ────────────────────────────────────────

  async fn append_summary_version(
    &self,
    summary_id: Uuid,
    input: NewReleaseSummaryVersion,
  ) -> Result<ReleaseSummaryVersion> {
    self.insert_version(summary_id, input, Utc::now()).await
  }

  async fn import_summary_version(
    &self,
    summary_id: Uuid,
    input: NewReleaseSummaryVersion,
    created_at: DateTime<Utc>,
  ) -> Result<ReleaseSummaryVersion> {
    check_import_time(created_at, Utc::now())?;
    self.insert_version(summary_id, input, created_at).await
  }

  async fn summary_versions(&self, summary_id: Uuid) -> Result<Vec<ReleaseSummaryVersion>> {
    let id_str = encode_uuid(summary_id);
    let raws = self
      .conn
      .call(move |conn| {
        if !exists(conn, "SELECT 1 FROM release_summaries WHERE summary_id = ?1", &id_str)? {
          return Ok(None);
        }
        Ok(Some(read_versions(conn, &id_str)?))
      })
      .await?
      .ok_or(Error::SummaryNotFound(summary_id))?;

    raws.into_iter().map(RawVersion::into_version).collect()
  }

  async fn latest_summary_version(&self, summary_id: Uuid) -> Result<ReleaseSummaryVersion> {
    let versions = self.summary_versions(summary_id).await?;
    latest_version(&versions)
      .cloned()
      .ok_or(Error::SummaryVersionNotFound(summary_id))
  }

  // ── Public reads ──────────────────────────────────────────────────────────

  async fn public_index(&self) -> Result<Vec<ThemeListing>> {
    let (themes, topics, publications) = self
      .conn
      .call(|conn| {
        let themes = {
          let mut stmt =
            conn.prepare(&format!("SELECT {THEME_COLUMNS} FROM themes ORDER BY title"))?;
          stmt
            .query_map([], RawTheme::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        let topics = {
          let mut stmt =
            conn.prepare(&format!("SELECT {TOPIC_COLUMNS} FROM topics ORDER BY title"))?;
          stmt
            .query_map([], RawTopic::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        let publications = {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PUBLICATION_COLUMNS} FROM publications p
             WHERE EXISTS (
               SELECT 1 FROM releases r
               WHERE r.publication_id = p.publication_id AND r.status = ?1
             )
             ORDER BY title"
          ))?;
          stmt
            .query_map([ReleaseStatus::Published.code()], RawPublication::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok((themes, topics, publications))
      })
      .await?;

    let topics = topics
      .into_iter()
      .map(RawTopic::into_topic)
      .collect::<Result<Vec<_>>>()?;
    let publications = publications
      .into_iter()
      .map(RawPublication::into_publication)
      .collect::<Result<Vec<_>>>()?;

    let mut index = Vec::new();
    for theme in themes {
      let theme = theme.into_theme()?;
      let topic_listings: Vec<TopicListing> = topics
        .iter()
        .filter(|t| t.theme_id == theme.theme_id)
        .filter_map(|topic| {
          let listed: Vec<PublicationListing> = publications
            .iter()
            .filter(|p| p.topic_id == topic.topic_id)
            .map(|p| PublicationListing {
              publication_id: p.publication_id,
              slug:           p.slug.clone(),
              title:          p.title.clone(),
              summary:        p.summary.clone(),
            })
            .collect();
          (!listed.is_empty()).then(|| TopicListing {
            topic:        topic.clone(),
            publications: listed,
          })
        })
        .collect();

      if !topic_listings.is_empty() {
        index.push(ThemeListing { theme, topics: topic_listings });
      }
    }

    Ok(index)
  }

  async fn publication_tree(&self, slug: String) -> Result<Option<PublicationTree>> {
    let as_of = Utc::now();
    let raw = self
      .conn
      .call(move |conn| Ok(read_publication_tree(conn, &slug)?))
      .await?;

    raw.map(|r| r.into_tree(as_of)).transpose()
  }

  async fn public_release(
    &self,
    publication_slug: String,
    release_slug: String,
  ) -> Result<Option<PublicRelease>> {
    let (bundle, types) = self
      .conn
      .call(move |conn| {
        let bundle = read_public_release(conn, &publication_slug, &release_slug)?;
        let types = read_release_types(conn)?;
        Ok((bundle, types))
      })
      .await?;

    let types = decode_release_types(types)?;
    bundle
      .map(|b| b.into_view(&types).map(ReleaseView::into_public))
      .transpose()
  }
}
