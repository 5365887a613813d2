//! Error type for `statpub-store-sqlite`.

use statpub_core::{ErrorKind, StoreError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] statpub_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A foreign-key, uniqueness, check or append-only trigger rejected the
  /// write.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("slug {0:?} is already in use")]
  DuplicateSlug(String),

  #[error("theme not found: {0}")]
  ThemeNotFound(Uuid),

  #[error("topic not found: {0}")]
  TopicNotFound(Uuid),

  #[error("contact not found: {0}")]
  ContactNotFound(Uuid),

  #[error("methodology not found: {0}")]
  MethodologyNotFound(Uuid),

  #[error("release type not found: {0}")]
  ReleaseTypeNotFound(Uuid),

  #[error("publication not found: {0}")]
  PublicationNotFound(Uuid),

  #[error("release not found: {0}")]
  ReleaseNotFound(Uuid),

  #[error("release summary not found: {0}")]
  SummaryNotFound(Uuid),

  /// The summary exists but has no versions: a data-integrity failure.
  #[error("release summary {0} has no versions")]
  SummaryVersionNotFound(Uuid),

  #[error("release {0} is not published")]
  NotPublished(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, msg))
        if f.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Error::ConstraintViolation(msg.unwrap_or_else(|| f.to_string()))
      }
      other => Error::Database(other),
    }
  }
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Core(e) => e.kind(),
      Self::ThemeNotFound(_)
      | Self::TopicNotFound(_)
      | Self::ContactNotFound(_)
      | Self::MethodologyNotFound(_)
      | Self::ReleaseTypeNotFound(_)
      | Self::PublicationNotFound(_)
      | Self::ReleaseNotFound(_)
      | Self::SummaryNotFound(_) => ErrorKind::NotFound,
      Self::ConstraintViolation(_)
      | Self::DuplicateSlug(_)
      | Self::NotPublished(_) => ErrorKind::Conflict,
      Self::SummaryVersionNotFound(_) => ErrorKind::Integrity,
      Self::Database(_) | Self::Json(_) | Self::Uuid(_) | Self::DateParse(_) => {
        ErrorKind::Internal
      }
    }
  }
}
