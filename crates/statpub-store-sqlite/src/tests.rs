//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use statpub_core::{
  ErrorKind, StoreError,
  content::{ContentBlock, ContentDocument, ContentSection, MarkdownBlock},
  methodology::NewMethodology,
  period::TimePeriodCoverage,
  release::{NewRelease, NewUpdate, ReleaseStatus, ReleaseType},
  store::PublishingStore,
  summary::NewReleaseSummaryVersion,
  taxonomy::{NewContact, NewLink, NewPublication, NewTheme, NewTopic, Publication},
  view::ReleaseView,
};
use uuid::Uuid;

use crate::{Error, SqliteStore, encode::encode_uuid};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn publication(s: &SqliteStore, slug: &str) -> Publication {
  let theme = match s.list_themes().await.unwrap().into_iter().next() {
    Some(theme) => theme,
    None => s
      .add_theme(NewTheme {
        slug:    "pupils-and-schools".into(),
        title:   "Pupils and schools".into(),
        summary: String::new(),
      })
      .await
      .unwrap(),
  };
  let topic = s
    .add_topic(NewTopic {
      theme_id:    theme.theme_id,
      slug:        format!("{slug}-topic"),
      title:       "Pupil absence".into(),
      summary:     String::new(),
      description: String::new(),
    })
    .await
    .unwrap();
  s.add_publication(NewPublication {
    topic_id:       topic.topic_id,
    slug:           slug.into(),
    title:          "Pupil absence in schools in England".into(),
    description:    String::new(),
    summary:        String::new(),
    data_source:    String::new(),
    next_update:    None,
    contact_id:     None,
    methodology_id: None,
  })
  .await
  .unwrap()
}

fn new_release(publication_id: Uuid, order: i32, name: &str, slug: &str) -> NewRelease {
  NewRelease {
    publication_id,
    order,
    content: ContentDocument::default(),
    key_statistics: None,
    release_note: Some("internal".into()),
    summary: NewReleaseSummaryVersion::new(
      name,
      slug,
      ReleaseType::NATIONAL_STATISTICS,
      TimePeriodCoverage::AcademicYear,
    ),
  }
}

fn version(slug: &str) -> NewReleaseSummaryVersion {
  NewReleaseSummaryVersion::new(
    "2016/17",
    slug,
    ReleaseType::NATIONAL_STATISTICS,
    TimePeriodCoverage::AcademicYear,
  )
}

async fn publish(s: &SqliteStore, release_id: Uuid) {
  for status in [
    ReleaseStatus::HigherLevelReview,
    ReleaseStatus::Approved,
    ReleaseStatus::Published,
  ] {
    s.set_release_status(release_id, status).await.unwrap();
  }
}

// ─── Taxonomy ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn theme_slugs_are_unique() {
  let s = store().await;
  let input = NewTheme {
    slug:    "finance".into(),
    title:   "Finance".into(),
    summary: String::new(),
  };
  s.add_theme(input.clone()).await.unwrap();

  let err = s.add_theme(input).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateSlug(ref slug) if slug == "finance"));
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn invalid_slug_is_rejected_before_writing() {
  let s = store().await;
  let err = s
    .add_theme(NewTheme {
      slug:    "Not A Slug".into(),
      title:   "Bad".into(),
      summary: String::new(),
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Invalid);
  assert!(s.list_themes().await.unwrap().is_empty());
}

#[tokio::test]
async fn topic_requires_existing_theme() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s
    .add_topic(NewTopic {
      theme_id:    missing,
      slug:        "absence".into(),
      title:       "Absence".into(),
      summary:     String::new(),
      description: String::new(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ThemeNotFound(id) if id == missing));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn get_missing_entities_return_none() {
  let s = store().await;
  assert!(s.get_theme(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_topic(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_publication(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.release_view(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Shared references ───────────────────────────────────────────────────────

#[tokio::test]
async fn referenced_methodology_cannot_be_deleted_until_cleared() {
  let s = store().await;
  let methodology = s
    .add_methodology(NewMethodology {
      title:        "Pupil absence statistics: methodology".into(),
      summary:      String::new(),
      content:      ContentDocument::default(),
      annexes:      ContentDocument::default(),
      published_at: None,
    })
    .await
    .unwrap();
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  s.set_publication_methodology(p.publication_id, Some(methodology.methodology_id))
    .await
    .unwrap();

  let err = s.delete_methodology(methodology.methodology_id).await.unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)), "got {err:?}");
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let cleared = s
    .set_publication_methodology(p.publication_id, None)
    .await
    .unwrap();
  assert!(cleared.methodology_id.is_none());

  s.delete_methodology(methodology.methodology_id).await.unwrap();
  assert!(s.get_methodology(methodology.methodology_id).await.unwrap().is_none());
}

#[tokio::test]
async fn referenced_contact_cannot_be_deleted() {
  let s = store().await;
  let contact = s
    .add_contact(NewContact {
      team_name:     "School absence and exclusions team".into(),
      team_email:    "schools.statistics@example.gov.uk".into(),
      contact_name:  "Mark Pearson".into(),
      contact_phone: Some("01142742585".into()),
    })
    .await
    .unwrap();
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let p = s
    .set_publication_contact(p.publication_id, Some(contact.contact_id))
    .await
    .unwrap();
  assert_eq!(p.contact_id, Some(contact.contact_id));

  let err = s.delete_contact(contact.contact_id).await.unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)), "got {err:?}");
  assert!(s.get_contact(contact.contact_id).await.unwrap().is_some());
}

#[tokio::test]
async fn setting_unknown_contact_fails() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let err = s
    .set_publication_contact(p.publication_id, Some(Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ContactNotFound(_)));
}

#[tokio::test]
async fn release_types_start_with_defaults_and_restrict_delete() {
  let s = store().await;
  let types = s.list_release_types().await.unwrap();
  let mut ids: Vec<Uuid> = types.iter().map(|t| t.release_type_id).collect();
  let mut expected: Vec<Uuid> = ReleaseType::defaults()
    .into_iter()
    .map(|t| t.release_type_id)
    .collect();
  ids.sort();
  expected.sort();
  assert_eq!(ids, expected);

  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  s.create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
  let err = s
    .delete_release_type(ReleaseType::NATIONAL_STATISTICS)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)), "got {err:?}");

  let unused = s.add_release_type("Experimental Statistics".into()).await.unwrap();
  s.delete_release_type(unused.release_type_id).await.unwrap();
  assert_eq!(s.list_release_types().await.unwrap().len(), 3);
}

#[tokio::test]
async fn deleted_default_release_type_stays_deleted_after_reopen() {
  let path = std::env::temp_dir().join(format!("statpub-{}.db", Uuid::new_v4()));

  let s = SqliteStore::open(&path).await.unwrap();
  s.delete_release_type(ReleaseType::AD_HOC).await.unwrap();
  assert_eq!(s.list_release_types().await.unwrap().len(), 2);
  drop(s);

  let reopened = SqliteStore::open(&path).await.unwrap();
  let titles: Vec<String> = reopened
    .list_release_types()
    .await
    .unwrap()
    .into_iter()
    .map(|t| t.title)
    .collect();
  assert_eq!(titles, ["National Statistics", "Official Statistics"]);
  drop(reopened);

  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}

// ─── Releases ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_release_writes_release_summary_and_first_version() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;

  let content = ContentDocument::new(vec![ContentSection {
    order:   1,
    heading: "About this release".into(),
    caption: String::new(),
    content: vec![ContentBlock::Markdown(MarkdownBlock {
      order: 1,
      body:  "Overall absence rate has increased.".into(),
    })],
  }]);
  let mut input = new_release(p.publication_id, 0, "2016/17", "2016-17");
  input.content = content.clone();

  let view = s.create_release(input).await.unwrap();
  assert_eq!(view.release.status, ReleaseStatus::Draft);
  assert_eq!(view.current.slug, "2016-17");
  assert_eq!(view.release_type.title, "National Statistics");
  assert!(view.release.published_at.is_none());

  let fetched = s.release_view(view.release.release_id).await.unwrap().unwrap();
  assert_eq!(fetched, view);
  assert_eq!(fetched.release.content, content);

  let history = s.summary_versions(view.summary.summary_id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0], view.current);
}

#[tokio::test]
async fn create_release_is_atomic_on_failure() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let mut input = new_release(p.publication_id, 0, "2016/17", "2016-17");
  input.summary.release_type_id = Uuid::new_v4();

  let err = s.create_release(input).await.unwrap_err();
  assert!(matches!(err, Error::ReleaseTypeNotFound(_)));

  let count: i64 = s
    .conn
    .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM releases", [], |r| r.get(0))?))
    .await
    .unwrap();
  assert_eq!(count, 0);
}

#[tokio::test]
async fn release_slugs_are_unique_within_a_publication() {
  let s = store().await;
  let absence = publication(&s, "pupil-absence-in-schools-in-england").await;
  let exclusions = publication(&s, "permanent-and-fixed-period-exclusions").await;

  s.create_release(new_release(absence.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();

  let err = s
    .create_release(new_release(absence.publication_id, 1, "2016/17 again", "2016-17"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateSlug(_)));

  s.create_release(new_release(exclusions.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
}

#[tokio::test]
async fn superseded_slug_can_be_reused() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let first = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();

  s.append_summary_version(
    first.summary.summary_id,
    NewReleaseSummaryVersion::new(
      "2016/17",
      "2016-17-revised",
      ReleaseType::NATIONAL_STATISTICS,
      TimePeriodCoverage::AcademicYear,
    ),
  )
  .await
  .unwrap();

  s.create_release(new_release(p.publication_id, 1, "2016/17 (spring)", "2016-17"))
    .await
    .unwrap();
}

#[tokio::test]
async fn status_follows_the_lifecycle() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let view = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
  let id = view.release.release_id;

  let err = s
    .set_release_status(id, ReleaseStatus::Published)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(statpub_core::Error::InvalidTransition { .. })));
  assert_eq!(err.kind(), ErrorKind::Conflict);

  publish(&s, id).await;
  let release = s.release_view(id).await.unwrap().unwrap().release;
  assert_eq!(release.status, ReleaseStatus::Published);
  assert!(release.published_at.is_some());

  let err = s.set_release_status(id, ReleaseStatus::Draft).await.unwrap_err();
  assert!(matches!(err, Error::Core(statpub_core::Error::InvalidTransition { .. })));
}

#[tokio::test]
async fn release_edits_persist() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let view = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
  let id = view.release.release_id;

  let note = s.update_release_note(id, None).await.unwrap();
  assert!(note.release_note.is_none());

  let doc = ContentDocument::new(vec![ContentSection {
    order:   2,
    heading: "Headline facts".into(),
    ..Default::default()
  }]);
  let updated = s.update_release_content(id, doc.clone()).await.unwrap();
  assert_eq!(updated.content, doc);

  let err = s
    .update_release_content(Uuid::new_v4(), doc)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ReleaseNotFound(_)));
}

#[tokio::test]
async fn updates_are_only_recorded_on_published_releases() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let view = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
  let id = view.release.release_id;
  let update = |on: NaiveDate, reason: &str| NewUpdate { on, reason: reason.into() };

  let err = s
    .add_update(id, update(NaiveDate::from_ymd_opt(2018, 3, 22).unwrap(), "Early"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotPublished(_)));

  publish(&s, id).await;
  s.add_update(id, update(NaiveDate::from_ymd_opt(2018, 4, 19).unwrap(), "Second"))
    .await
    .unwrap();
  s.add_update(id, update(NaiveDate::from_ymd_opt(2018, 3, 22).unwrap(), "First"))
    .await
    .unwrap();

  let reasons: Vec<String> = s
    .updates(id)
    .await
    .unwrap()
    .into_iter()
    .map(|u| u.reason)
    .collect();
  assert_eq!(reasons, ["First", "Second"]);
}

// ─── Summary versions ────────────────────────────────────────────────────────

#[tokio::test]
async fn append_adds_one_version_and_leaves_history_untouched() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let view = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
  let summary_id = view.summary.summary_id;
  let before = s.summary_versions(summary_id).await.unwrap();

  let mut input = NewReleaseSummaryVersion::new(
    "2016/17 revised",
    "2016-17",
    ReleaseType::OFFICIAL_STATISTICS,
    TimePeriodCoverage::AcademicYear,
  );
  input.summary = "Revised figures".into();
  let appended = s.append_summary_version(summary_id, input).await.unwrap();

  let after = s.summary_versions(summary_id).await.unwrap();
  assert_eq!(after.len(), before.len() + 1);
  assert_eq!(after[..before.len()], before[..]);
  assert!(appended.sequence > before[0].sequence);

  let latest = s.latest_summary_version(summary_id).await.unwrap();
  assert_eq!(latest, appended);

  let current = s.release_view(view.release.release_id).await.unwrap().unwrap();
  assert_eq!(current.current.summary, "Revised figures");
  assert_eq!(current.release_type.release_type_id, ReleaseType::OFFICIAL_STATISTICS);
}

#[tokio::test]
async fn latest_is_by_created_time_then_sequence() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let t1 = Utc.with_ymd_and_hms(2018, 3, 22, 9, 30, 0).unwrap();

  let view = s
    .import_release(new_release(p.publication_id, 0, "2016/17", "2016-17"), t1)
    .await
    .unwrap();
  assert_eq!(view.release.created_at, t1);
  assert_eq!(view.current.created_at, t1);
  let summary_id = view.summary.summary_id;

  // Imported later, but dated earlier: not authoritative.
  s.import_summary_version(summary_id, version("backfilled"), t1 - Duration::days(1))
    .await
    .unwrap();
  assert_eq!(s.latest_summary_version(summary_id).await.unwrap().slug, "2016-17");

  // Same timestamp: the later insertion wins.
  s.import_summary_version(summary_id, version("tie-breaker"), t1)
    .await
    .unwrap();
  assert_eq!(s.latest_summary_version(summary_id).await.unwrap().slug, "tie-breaker");

  // An ordinary edit is dated now, so it supersedes all imported history.
  s.append_summary_version(summary_id, version("edited")).await.unwrap();
  assert_eq!(s.latest_summary_version(summary_id).await.unwrap().slug, "edited");

  assert_eq!(s.summary_versions(summary_id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn future_dated_imports_are_rejected() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let future = Utc::now() + Duration::days(365);

  let err = s
    .import_release(new_release(p.publication_id, 0, "2016/17", "2016-17"), future)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Invalid);
  assert!(
    s.public_release(p.slug.clone(), "2016-17".into()).await.unwrap().is_none()
  );

  let view = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
  let summary_id = view.summary.summary_id;
  let err = s
    .import_summary_version(summary_id, version("forged"), future)
    .await
    .unwrap_err();
  assert!(
    matches!(&err, Error::Core(statpub_core::Error::FutureTimestamp(at)) if *at == future),
    "got {err:?}"
  );
  assert_eq!(s.summary_versions(summary_id).await.unwrap().len(), 1);

  // Later edits keep becoming authoritative.
  s.append_summary_version(summary_id, version("real-edit")).await.unwrap();
  assert_eq!(s.latest_summary_version(summary_id).await.unwrap().slug, "real-edit");
}

#[tokio::test]
async fn appending_another_releases_current_slug_fails() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  s.create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
  let other = s
    .create_release(new_release(p.publication_id, 1, "2015/16", "2015-16"))
    .await
    .unwrap();

  let err = s
    .append_summary_version(
      other.summary.summary_id,
      NewReleaseSummaryVersion::new(
        "2015/16",
        "2016-17",
        ReleaseType::NATIONAL_STATISTICS,
        TimePeriodCoverage::AcademicYear,
      ),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateSlug(_)));

  // Keeping its own slug is fine.
  s.append_summary_version(
    other.summary.summary_id,
    NewReleaseSummaryVersion::new(
      "2015/16 final",
      "2015-16",
      ReleaseType::NATIONAL_STATISTICS,
      TimePeriodCoverage::AcademicYear,
    ),
  )
  .await
  .unwrap();
}

#[tokio::test]
async fn append_to_unknown_summary_fails() {
  let s = store().await;
  let err = s
    .append_summary_version(
      Uuid::new_v4(),
      NewReleaseSummaryVersion::new(
        "2016/17",
        "2016-17",
        ReleaseType::NATIONAL_STATISTICS,
        TimePeriodCoverage::AcademicYear,
      ),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SummaryNotFound(_)));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn versions_cannot_be_updated_in_place() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  s.create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();

  let err = s
    .conn
    .call(|conn| {
      Ok(conn.execute("UPDATE release_summary_versions SET slug = 'rewritten'", [])?)
    })
    .await
    .map_err(Error::from)
    .unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn versions_and_updates_cannot_be_deleted_directly() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let view = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
  publish(&s, view.release.release_id).await;
  s.add_update(
    view.release.release_id,
    NewUpdate {
      on:     NaiveDate::from_ymd_opt(2018, 4, 19).unwrap(),
      reason: "Corrected figures".into(),
    },
  )
  .await
  .unwrap();

  for sql in ["DELETE FROM release_summary_versions", "DELETE FROM updates"] {
    let err = s
      .conn
      .call(move |conn| Ok(conn.execute(sql, [])?))
      .await
      .map_err(Error::from)
      .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)), "{sql}: got {err:?}");
  }

  assert_eq!(s.summary_versions(view.summary.summary_id).await.unwrap().len(), 1);
  assert_eq!(s.updates(view.release.release_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn summary_without_versions_is_an_integrity_error() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let release_id = Uuid::new_v4();
  let summary_id = Uuid::new_v4();

  let release_id_str = encode_uuid(release_id);
  let summary_id_str = encode_uuid(summary_id);
  let publication_id_str = encode_uuid(p.publication_id);
  let content = ContentDocument::default().to_stored().unwrap();
  s.conn
    .call(move |conn| {
      conn.execute(
        "INSERT INTO releases (release_id, publication_id, display_order, content, created_at)
         VALUES (?1, ?2, 0, ?3, '2018-03-22T09:30:00.000000Z')",
        rusqlite::params![release_id_str, publication_id_str, content],
      )?;
      conn.execute(
        "INSERT INTO release_summaries (summary_id, release_id) VALUES (?1, ?2)",
        rusqlite::params![summary_id_str, release_id_str],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.latest_summary_version(summary_id).await.unwrap_err();
  assert!(matches!(err, Error::SummaryVersionNotFound(id) if id == summary_id));
  assert_eq!(err.kind(), ErrorKind::Integrity);

  let err = s.release_view(release_id).await.unwrap_err();
  assert!(matches!(err, Error::SummaryVersionNotFound(_)));
}

// ─── Public reads ────────────────────────────────────────────────────────────

#[tokio::test]
async fn drafts_are_not_public() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let view = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();

  assert!(s.public_index().await.unwrap().is_empty());
  assert!(s.publication_tree(p.slug.clone()).await.unwrap().is_none());
  assert!(
    s.public_release(p.slug.clone(), "2016-17".into())
      .await
      .unwrap()
      .is_none()
  );

  publish(&s, view.release.release_id).await;

  let index = s.public_index().await.unwrap();
  assert_eq!(index.len(), 1);
  assert_eq!(index[0].topics.len(), 1);
  assert_eq!(index[0].topics[0].publications[0].slug, p.slug);

  let release = s
    .public_release(p.slug.clone(), "2016-17".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(release.metadata.name, "2016/17");
  assert_eq!(release.metadata.time_period_label, "Academic Year");
  let json = serde_json::to_value(&release).unwrap();
  assert!(json.get("release_note").is_none());
}

#[tokio::test]
async fn public_tree_uses_latest_versions_in_display_order() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  s.add_link(
    p.publication_id,
    NewLink {
      description: "2014 to 2015".into(),
      url:         "https://www.gov.uk/government/statistics/pupil-absence-2014-to-2015".into(),
    },
  )
  .await
  .unwrap();

  let older = s
    .create_release(new_release(p.publication_id, 1, "2015/16", "2015-16-draft"))
    .await
    .unwrap();
  let newer = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17-draft"))
    .await
    .unwrap();

  for (view, slug, summary) in [
    (&older, "2015-16", "Read national statistical summaries for 2015/16"),
    (&newer, "2016-17", "Read national statistical summaries for 2016/17"),
  ] {
    let mut input = NewReleaseSummaryVersion::new(
      view.current.release_name.clone(),
      slug,
      ReleaseType::NATIONAL_STATISTICS,
      TimePeriodCoverage::AcademicYear,
    );
    input.summary = summary.into();
    s.append_summary_version(view.summary.summary_id, input)
      .await
      .unwrap();
    publish(&s, view.release.release_id).await;
  }

  let tree = s.publication_tree(p.slug.clone()).await.unwrap().unwrap();
  assert_eq!(tree.publication.publication_id, p.publication_id);
  assert_eq!(tree.topic.topic_id, p.topic_id);
  assert!(tree.methodology.is_none());
  assert!(tree.contact.is_none());
  assert_eq!(tree.links.len(), 1);

  let slugs: Vec<&str> = tree.releases.iter().map(|r| r.metadata.slug.as_str()).collect();
  assert_eq!(slugs, ["2016-17", "2015-16"]);
  assert_eq!(
    tree.releases[1].metadata.summary,
    "Read national statistical summaries for 2015/16"
  );
  assert_eq!(tree.releases[0].metadata.release_id, newer.release.release_id);

  assert!(
    s.public_release(p.slug.clone(), "2016-17-draft".into())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn deleting_a_publication_cascades() {
  let s = store().await;
  let p = publication(&s, "pupil-absence-in-schools-in-england").await;
  let view: ReleaseView = s
    .create_release(new_release(p.publication_id, 0, "2016/17", "2016-17"))
    .await
    .unwrap();
  publish(&s, view.release.release_id).await;
  s.add_update(
    view.release.release_id,
    NewUpdate {
      on:     NaiveDate::from_ymd_opt(2018, 4, 19).unwrap(),
      reason: "Corrected figures".into(),
    },
  )
  .await
  .unwrap();

  s.delete_publication(p.publication_id).await.unwrap();

  assert!(s.get_publication(p.publication_id).await.unwrap().is_none());
  assert!(s.release_view(view.release.release_id).await.unwrap().is_none());
  let err = s.summary_versions(view.summary.summary_id).await.unwrap_err();
  assert!(matches!(err, Error::SummaryNotFound(_)));
  assert!(s.updates(view.release.release_id).await.unwrap().is_empty());

  let err = s.delete_publication(p.publication_id).await.unwrap_err();
  assert!(matches!(err, Error::PublicationNotFound(_)));
}
