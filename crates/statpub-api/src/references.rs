//! Handlers for the shared reference entities: contacts, methodologies and
//! release types.
//!
//! All three are referenced rather than owned, so deleting one that is
//! still in use answers `409 Conflict`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use statpub_core::{
  methodology::{Methodology, NewMethodology},
  release::ReleaseType,
  store::PublishingStore,
  taxonomy::{Contact, NewContact},
};
use uuid::Uuid;

use crate::{error::ApiError, extract::ApiJson};

// ─── Contacts ────────────────────────────────────────────────────────────────

/// `POST /contacts`
pub async fn create_contact<S: PublishingStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewContact>,
) -> Result<impl IntoResponse, ApiError> {
  let contact = store.add_contact(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(contact)))
}

/// `GET /contacts/:id`
pub async fn get_contact<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Contact>, ApiError> {
  let contact = store
    .get_contact(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  Ok(Json(contact))
}

/// `DELETE /contacts/:id`
pub async fn delete_contact<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_contact(id).await.map_err(ApiError::store)?;
  tracing::info!(contact_id = %id, "contact deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Methodologies ───────────────────────────────────────────────────────────

/// `POST /methodologies`
pub async fn create_methodology<S: PublishingStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewMethodology>,
) -> Result<impl IntoResponse, ApiError> {
  let methodology = store.add_methodology(body).await.map_err(ApiError::store)?;
  tracing::info!(methodology_id = %methodology.methodology_id, "methodology created");
  Ok((StatusCode::CREATED, Json(methodology)))
}

/// `GET /methodologies/:id`
pub async fn get_methodology<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Methodology>, ApiError> {
  let methodology = store
    .get_methodology(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("methodology {id} not found")))?;
  Ok(Json(methodology))
}

/// `DELETE /methodologies/:id`
pub async fn delete_methodology<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_methodology(id).await.map_err(ApiError::store)?;
  tracing::info!(methodology_id = %id, "methodology deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Release types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReleaseTypeBody {
  pub title: String,
}

/// `GET /release-types`
pub async fn list_release_types<S: PublishingStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ReleaseType>>, ApiError> {
  let types = store.list_release_types().await.map_err(ApiError::store)?;
  Ok(Json(types))
}

/// `POST /release-types`, body: `{"title":"Experimental Statistics"}`
pub async fn create_release_type<S: PublishingStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<ReleaseTypeBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("release type title is empty".into()));
  }
  let release_type = store
    .add_release_type(body.title)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(release_type)))
}

/// `DELETE /release-types/:id`
pub async fn delete_release_type<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_release_type(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
