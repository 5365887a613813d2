//! Handlers for `/releases` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/releases` | Body: [`NewRelease`]; returns 201 + [`ReleaseView`] |
//! | `GET`  | `/releases/:id` | Any status, including the editorial note |
//! | `PUT`  | `/releases/:id/content` | Body: [`ContentDocument`] |
//! | `PUT`  | `/releases/:id/key-statistics` | Body: [`DataBlock`] or `null` |
//! | `PUT`  | `/releases/:id/note` | Body: `{"note": "..." or null}` |
//! | `POST` | `/releases/:id/status` | Body: `{"status":"Approved"}`; 409 on an illegal move |
//! | `GET`  | `/releases/:id/updates` | Oldest first |
//! | `POST` | `/releases/:id/updates` | Body: [`NewUpdate`]; 409 unless published |
//!
//! Body edits are accepted after publication but logged at `warn`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use statpub_core::{
  content::{ContentDocument, DataBlock},
  release::{NewRelease, NewUpdate, Release, ReleaseStatus, Update},
  store::PublishingStore,
  view::ReleaseView,
};
use uuid::Uuid;

use crate::{error::ApiError, extract::ApiJson};

fn warn_if_published(release: &Release, field: &str) {
  if release.status.is_published() {
    tracing::warn!(
      release_id = %release.release_id,
      field,
      "edited a published release"
    );
  }
}

// ─── Create & read ───────────────────────────────────────────────────────────

/// `POST /releases`
pub async fn create<S: PublishingStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewRelease>,
) -> Result<impl IntoResponse, ApiError> {
  let view = store.create_release(body).await.map_err(ApiError::store)?;
  tracing::info!(
    release_id = %view.release.release_id,
    slug = %view.current.slug,
    "release created"
  );
  Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /releases/:id`
pub async fn get_one<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ReleaseView>, ApiError> {
  let view = store
    .release_view(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("release {id} not found")))?;
  Ok(Json(view))
}

// ─── Body edits ──────────────────────────────────────────────────────────────

/// `PUT /releases/:id/content`
pub async fn put_content<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<ContentDocument>,
) -> Result<Json<Release>, ApiError> {
  let release = store
    .update_release_content(id, body)
    .await
    .map_err(ApiError::store)?;
  warn_if_published(&release, "content");
  Ok(Json(release))
}

/// `PUT /releases/:id/key-statistics`
pub async fn put_key_statistics<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<Option<DataBlock>>,
) -> Result<Json<Release>, ApiError> {
  let release = store
    .update_key_statistics(id, body)
    .await
    .map_err(ApiError::store)?;
  warn_if_published(&release, "key_statistics");
  Ok(Json(release))
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
  pub note: Option<String>,
}

/// `PUT /releases/:id/note`
pub async fn put_note<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<NoteBody>,
) -> Result<Json<Release>, ApiError> {
  let release = store
    .update_release_note(id, body.note)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(release))
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: ReleaseStatus,
}

/// `POST /releases/:id/status`
pub async fn set_status<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<Release>, ApiError> {
  let release = store
    .set_release_status(id, body.status)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(release_id = %id, status = %release.status, "release status changed");
  Ok(Json(release))
}

/// `GET /releases/:id/updates`
pub async fn list_updates<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Update>>, ApiError> {
  let updates = store.updates(id).await.map_err(ApiError::store)?;
  Ok(Json(updates))
}

/// `POST /releases/:id/updates`
pub async fn add_update<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<NewUpdate>,
) -> Result<impl IntoResponse, ApiError> {
  let update = store.add_update(id, body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(update)))
}
