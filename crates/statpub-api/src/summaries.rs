//! Handlers for `/summaries/:id/...`: the append-only metadata history of a
//! release.
//!
//! No route edits or removes a version.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use statpub_core::{
  store::PublishingStore,
  summary::{NewReleaseSummaryVersion, ReleaseSummaryVersion},
};
use uuid::Uuid;

use crate::{error::ApiError, extract::ApiJson};

/// `GET /summaries/:id/versions`: full history in insertion order.
pub async fn list<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReleaseSummaryVersion>>, ApiError> {
  let versions = store.summary_versions(id).await.map_err(ApiError::store)?;
  Ok(Json(versions))
}

/// `POST /summaries/:id/versions`
pub async fn append<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<NewReleaseSummaryVersion>,
) -> Result<impl IntoResponse, ApiError> {
  let version = store
    .append_summary_version(id, body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    summary_id = %id,
    sequence = version.sequence,
    slug = %version.slug,
    "summary version appended"
  );
  Ok((StatusCode::CREATED, Json(version)))
}

/// `GET /summaries/:id/latest`
pub async fn latest<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ReleaseSummaryVersion>, ApiError> {
  let version = store
    .latest_summary_version(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(version))
}
