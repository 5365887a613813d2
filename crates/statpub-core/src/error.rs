//! Error types for `statpub-core`.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::release::ReleaseStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid slug {0:?}: must be lowercase letters, digits and single hyphens")]
  InvalidSlug(String),

  #[error("cannot move a release from {from} to {to}")]
  InvalidTransition {
    from: ReleaseStatus,
    to:   ReleaseStatus,
  },

  #[error("unknown time-period coverage code: {0:?}")]
  UnknownTimePeriod(String),

  #[error("unknown release status: {0:?}")]
  UnknownStatus(String),

  #[error("timestamp {0} is in the future")]
  FutureTimestamp(DateTime<Utc>),

  #[error("malformed document: {0}")]
  MalformedDocument(String),

  #[error("unsupported document schema version: {0}")]
  UnsupportedSchemaVersion(u64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse category of a failure, used by outer layers (e.g. the HTTP API) to
/// pick a response without knowing the concrete backend error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The addressed entity does not exist.
  NotFound,
  /// The write conflicts with existing state (duplicate slug, restrict-style
  /// reference, lifecycle rule).
  Conflict,
  /// The input itself is unacceptable.
  Invalid,
  /// Stored data violates a model invariant.
  Integrity,
  Internal,
}

/// Implemented by every error type a [`crate::store::PublishingStore`] may
/// return.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidSlug(_)
      | Self::UnknownTimePeriod(_)
      | Self::UnknownStatus(_)
      | Self::FutureTimestamp(_) => ErrorKind::Invalid,
      Self::InvalidTransition { .. } => ErrorKind::Conflict,
      Self::MalformedDocument(_) | Self::UnsupportedSchemaVersion(_) => {
        ErrorKind::Integrity
      }
      Self::Serialization(_) => ErrorKind::Internal,
    }
  }
}
