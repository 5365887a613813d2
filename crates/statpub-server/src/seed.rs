//! Load a JSON fixture into a store.
//!
//! Contacts and methodologies are declared once under a local `key` and
//! referenced by that key from publications. Each release lists its summary
//! history oldest first; the first entry becomes the release's initial
//! version, and entries with a `created_at` keep that date. A release's
//! `status` is reached by walking the normal lifecycle, so fixtures cannot
//! describe a state the API could not produce.
//!
//! Fixtures load into an empty store only.

use std::{collections::HashMap, path::Path};

use anyhow::{Context as _, anyhow, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use statpub_core::{
  content::{ContentDocument, DataBlock},
  methodology::NewMethodology,
  release::{NewRelease, NewUpdate, ReleaseStatus},
  store::PublishingStore,
  summary::NewReleaseSummaryVersion,
  taxonomy::{NewContact, NewLink, NewPublication, NewTheme, NewTopic},
};
use uuid::Uuid;

// ─── Fixture shape ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
  #[serde(default)]
  pub contacts:      Vec<ContactSeed>,
  #[serde(default)]
  pub methodologies: Vec<MethodologySeed>,
  #[serde(default)]
  pub themes:        Vec<ThemeSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ContactSeed {
  pub key:     String,
  #[serde(flatten)]
  pub contact: NewContact,
}

#[derive(Debug, Deserialize)]
pub struct MethodologySeed {
  pub key:         String,
  #[serde(flatten)]
  pub methodology: NewMethodology,
}

#[derive(Debug, Deserialize)]
pub struct ThemeSeed {
  pub slug:    String,
  pub title:   String,
  #[serde(default)]
  pub summary: String,
  #[serde(default)]
  pub topics:  Vec<TopicSeed>,
}

#[derive(Debug, Deserialize)]
pub struct TopicSeed {
  pub slug:         String,
  pub title:        String,
  #[serde(default)]
  pub summary:      String,
  #[serde(default)]
  pub description:  String,
  #[serde(default)]
  pub publications: Vec<PublicationSeed>,
}

#[derive(Debug, Deserialize)]
pub struct PublicationSeed {
  pub slug:        String,
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub summary:     String,
  #[serde(default)]
  pub data_source: String,
  pub next_update: Option<NaiveDate>,
  /// Key of a [`ContactSeed`].
  pub contact:     Option<String>,
  /// Key of a [`MethodologySeed`].
  pub methodology: Option<String>,
  #[serde(default)]
  pub links:       Vec<NewLink>,
  #[serde(default)]
  pub releases:    Vec<ReleaseSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseSeed {
  pub order:          i32,
  #[serde(default)]
  pub status:         ReleaseStatus,
  #[serde(default)]
  pub content:        ContentDocument,
  pub key_statistics: Option<DataBlock>,
  pub release_note:   Option<String>,
  /// Oldest first; must not be empty.
  pub versions:       Vec<VersionSeed>,
  #[serde(default)]
  pub updates:        Vec<NewUpdate>,
}

/// A summary version, optionally with its original date.
#[derive(Debug, Deserialize)]
pub struct VersionSeed {
  #[serde(flatten)]
  pub version:    NewReleaseSummaryVersion,
  pub created_at: Option<DateTime<Utc>>,
}

/// Counts of what a seed run wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
  pub themes:       usize,
  pub publications: usize,
  pub releases:     usize,
  pub versions:     usize,
}

// ─── Loading ─────────────────────────────────────────────────────────────────

impl Fixture {
  pub fn from_path(path: &Path) -> anyhow::Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read seed file {path:?}"))?;
    serde_json::from_str(&raw)
      .with_context(|| format!("failed to parse seed file {path:?}"))
  }
}

/// Lifecycle steps from Draft to `target`.
fn status_path(target: ReleaseStatus) -> &'static [ReleaseStatus] {
  use ReleaseStatus::*;
  match target {
    Draft => &[],
    HigherLevelReview => &[HigherLevelReview],
    Approved => &[HigherLevelReview, Approved],
    Published => &[HigherLevelReview, Approved, Published],
  }
}

fn lookup(
  keys: &HashMap<String, Uuid>,
  kind: &str,
  key: Option<&String>,
) -> anyhow::Result<Option<Uuid>> {
  key
    .map(|k| {
      keys
        .get(k)
        .copied()
        .ok_or_else(|| anyhow!("unknown {kind} key {k:?}"))
    })
    .transpose()
}

/// Write `fixture` into `store`, which must hold no themes yet. Stops at the
/// first failure; rows written before it are kept.
pub async fn apply<S: PublishingStore>(
  store: &S,
  fixture: Fixture,
) -> anyhow::Result<SeedReport> {
  let existing = store.list_themes().await.context("failed to inspect store")?;
  if !existing.is_empty() {
    bail!(
      "store already has {} theme(s); fixtures load into an empty store only",
      existing.len()
    );
  }

  let mut report = SeedReport::default();

  let mut contacts = HashMap::new();
  for seed in fixture.contacts {
    let contact = store
      .add_contact(seed.contact)
      .await
      .with_context(|| format!("contact {:?}", seed.key))?;
    contacts.insert(seed.key, contact.contact_id);
  }

  let mut methodologies = HashMap::new();
  for seed in fixture.methodologies {
    let methodology = store
      .add_methodology(seed.methodology)
      .await
      .with_context(|| format!("methodology {:?}", seed.key))?;
    methodologies.insert(seed.key, methodology.methodology_id);
  }

  for theme_seed in fixture.themes {
    let theme = store
      .add_theme(NewTheme {
        slug:    theme_seed.slug,
        title:   theme_seed.title,
        summary: theme_seed.summary,
      })
      .await
      .context("theme")?;
    report.themes += 1;

    for topic_seed in theme_seed.topics {
      let topic = store
        .add_topic(NewTopic {
          theme_id:    theme.theme_id,
          slug:        topic_seed.slug.clone(),
          title:       topic_seed.title,
          summary:     topic_seed.summary,
          description: topic_seed.description,
        })
        .await
        .with_context(|| format!("topic {:?}", topic_seed.slug))?;

      for pub_seed in topic_seed.publications {
        let slug = pub_seed.slug.clone();
        let publication = store
          .add_publication(NewPublication {
            topic_id:       topic.topic_id,
            slug:           pub_seed.slug,
            title:          pub_seed.title,
            description:    pub_seed.description,
            summary:        pub_seed.summary,
            data_source:    pub_seed.data_source,
            next_update:    pub_seed.next_update,
            contact_id:     lookup(&contacts, "contact", pub_seed.contact.as_ref())?,
            methodology_id: lookup(
              &methodologies,
              "methodology",
              pub_seed.methodology.as_ref(),
            )?,
          })
          .await
          .with_context(|| format!("publication {slug:?}"))?;
        report.publications += 1;

        for link in pub_seed.links {
          store
            .add_link(publication.publication_id, link)
            .await
            .with_context(|| format!("link on {slug:?}"))?;
        }

        for release_seed in pub_seed.releases {
          report.versions +=
            seed_release(store, publication.publication_id, release_seed)
              .await
              .with_context(|| format!("release of {slug:?}"))?;
          report.releases += 1;
        }
      }
    }
  }

  tracing::info!(
    themes = report.themes,
    publications = report.publications,
    releases = report.releases,
    versions = report.versions,
    "seed applied"
  );
  Ok(report)
}

/// Returns the number of summary versions written.
async fn seed_release<S: PublishingStore>(
  store: &S,
  publication_id: Uuid,
  seed: ReleaseSeed,
) -> anyhow::Result<usize> {
  let mut versions = seed.versions.into_iter();
  let Some(first) = versions.next() else {
    bail!("release has no summary versions");
  };

  let release = NewRelease {
    publication_id,
    order: seed.order,
    content: seed.content,
    key_statistics: seed.key_statistics,
    release_note: seed.release_note,
    summary: first.version,
  };
  let view = match first.created_at {
    Some(at) => store.import_release(release, at).await?,
    None => store.create_release(release).await?,
  };

  let summary_id = view.summary.summary_id;
  let mut written = 1;
  for seed in versions {
    match seed.created_at {
      Some(at) => store.import_summary_version(summary_id, seed.version, at).await?,
      None => store.append_summary_version(summary_id, seed.version).await?,
    };
    written += 1;
  }

  for status in status_path(seed.status) {
    store.set_release_status(view.release.release_id, *status).await?;
  }

  for update in seed.updates {
    store.add_update(view.release.release_id, update).await?;
  }

  Ok(written)
}
