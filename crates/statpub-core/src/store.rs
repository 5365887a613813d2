//! The `PublishingStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `statpub-store-sqlite`).
//! The API and server crates depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  StoreError,
  content::{ContentDocument, DataBlock},
  methodology::{Methodology, NewMethodology},
  release::{NewRelease, NewUpdate, Release, ReleaseStatus, ReleaseType, Update},
  summary::{NewReleaseSummaryVersion, ReleaseSummaryVersion},
  taxonomy::{
    Contact, Link, NewContact, NewLink, NewPublication, NewTheme, NewTopic,
    Publication, Theme, Topic,
  },
  view::{PublicRelease, PublicationTree, ReleaseView, ThemeListing},
};

/// Abstraction over a publishing-content backend.
///
/// Summary versions and release updates are append-only. Shared references
/// (contact, methodology, release type) are restrict-on-delete; owned
/// children (links, releases, summaries, versions, updates) cascade with
/// their owner.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PublishingStore: Send + Sync {
  type Error: StoreError;

  // ── Taxonomy ──────────────────────────────────────────────────────────

  fn add_theme(
    &self,
    input: NewTheme,
  ) -> impl Future<Output = Result<Theme, Self::Error>> + Send + '_;

  fn get_theme(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Theme>, Self::Error>> + Send + '_;

  fn list_themes(
    &self,
  ) -> impl Future<Output = Result<Vec<Theme>, Self::Error>> + Send + '_;

  /// Fails if the theme does not exist or already has a topic with the slug.
  fn add_topic(
    &self,
    input: NewTopic,
  ) -> impl Future<Output = Result<Topic, Self::Error>> + Send + '_;

  fn get_topic(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Topic>, Self::Error>> + Send + '_;

  // ── Shared references ─────────────────────────────────────────────────

  fn add_contact(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  fn get_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Rejected while any publication still references the contact.
  fn delete_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_methodology(
    &self,
    input: NewMethodology,
  ) -> impl Future<Output = Result<Methodology, Self::Error>> + Send + '_;

  fn get_methodology(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Methodology>, Self::Error>> + Send + '_;

  /// Rejected while any publication still references the methodology.
  fn delete_methodology(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_release_type(
    &self,
    title: String,
  ) -> impl Future<Output = Result<ReleaseType, Self::Error>> + Send + '_;

  fn list_release_types(
    &self,
  ) -> impl Future<Output = Result<Vec<ReleaseType>, Self::Error>> + Send + '_;

  /// Rejected while any summary version still references the type.
  fn delete_release_type(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Publications ──────────────────────────────────────────────────────

  fn add_publication(
    &self,
    input: NewPublication,
  ) -> impl Future<Output = Result<Publication, Self::Error>> + Send + '_;

  fn get_publication(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Publication>, Self::Error>> + Send + '_;

  /// Point the publication at a methodology, or clear the reference.
  fn set_publication_methodology(
    &self,
    publication_id: Uuid,
    methodology_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Publication, Self::Error>> + Send + '_;

  /// Point the publication at a contact, or clear the reference.
  fn set_publication_contact(
    &self,
    publication_id: Uuid,
    contact_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Publication, Self::Error>> + Send + '_;

  fn add_link(
    &self,
    publication_id: Uuid,
    input: NewLink,
  ) -> impl Future<Output = Result<Link, Self::Error>> + Send + '_;

  /// Delete a publication together with everything it owns.
  fn delete_publication(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Releases ──────────────────────────────────────────────────────────

  /// Create a release, its summary anchor and the first summary version in
  /// one transaction. New releases start in [`ReleaseStatus::Draft`].
  fn create_release(
    &self,
    input: NewRelease,
  ) -> impl Future<Output = Result<ReleaseView, Self::Error>> + Send + '_;

  /// [`create_release`](Self::create_release) for history import: the
  /// release and its first version are dated `created_at`, which must not be
  /// in the future.
  fn import_release(
    &self,
    input: NewRelease,
    created_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<ReleaseView, Self::Error>> + Send + '_;

  /// The release joined with its authoritative metadata, in any status.
  /// Returns `None` if the release does not exist.
  fn release_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ReleaseView>, Self::Error>> + Send + '_;

  fn update_release_content(
    &self,
    id: Uuid,
    content: ContentDocument,
  ) -> impl Future<Output = Result<Release, Self::Error>> + Send + '_;

  fn update_key_statistics(
    &self,
    id: Uuid,
    key_statistics: Option<DataBlock>,
  ) -> impl Future<Output = Result<Release, Self::Error>> + Send + '_;

  fn update_release_note(
    &self,
    id: Uuid,
    note: Option<String>,
  ) -> impl Future<Output = Result<Release, Self::Error>> + Send + '_;

  /// Move a release through its lifecycle. Entering
  /// [`ReleaseStatus::Published`] stamps `published_at`.
  fn set_release_status(
    &self,
    id: Uuid,
    status: ReleaseStatus,
  ) -> impl Future<Output = Result<Release, Self::Error>> + Send + '_;

  /// Append a correction notice to a published release.
  fn add_update(
    &self,
    release_id: Uuid,
    input: NewUpdate,
  ) -> impl Future<Output = Result<Update, Self::Error>> + Send + '_;

  /// Updates for a release, oldest first.
  fn updates(
    &self,
    release_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Update>, Self::Error>> + Send + '_;

  // ── Summary versions (append-only) ────────────────────────────────────

  /// Append a new version dated now. Prior versions are left untouched.
  fn append_summary_version(
    &self,
    summary_id: Uuid,
    input: NewReleaseSummaryVersion,
  ) -> impl Future<Output = Result<ReleaseSummaryVersion, Self::Error>> + Send + '_;

  /// [`append_summary_version`](Self::append_summary_version) for history
  /// import: the version is dated `created_at`, which must not be in the
  /// future.
  fn import_summary_version(
    &self,
    summary_id: Uuid,
    input: NewReleaseSummaryVersion,
    created_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<ReleaseSummaryVersion, Self::Error>> + Send + '_;

  /// Full history, in insertion order.
  fn summary_versions(
    &self,
    summary_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ReleaseSummaryVersion>, Self::Error>> + Send + '_;

  /// The authoritative version (see [`crate::summary::latest_version`]).
  /// Fails if the summary has no versions.
  fn latest_summary_version(
    &self,
    summary_id: Uuid,
  ) -> impl Future<Output = Result<ReleaseSummaryVersion, Self::Error>> + Send + '_;

  // ── Public reads (published only) ───────────────────────────────────

  /// Themes → topics → publications that have at least one published
  /// release. Empty topics and themes are omitted.
  fn public_index(
    &self,
  ) -> impl Future<Output = Result<Vec<ThemeListing>, Self::Error>> + Send + '_;

  /// Returns `None` if the publication does not exist or has nothing
  /// published.
  fn publication_tree(
    &self,
    slug: String,
  ) -> impl Future<Output = Result<Option<PublicationTree>, Self::Error>> + Send + '_;

  /// A published release addressed by its current slug.
  fn public_release(
    &self,
    publication_slug: String,
    release_slug: String,
  ) -> impl Future<Output = Result<Option<PublicRelease>, Self::Error>> + Send + '_;
}
