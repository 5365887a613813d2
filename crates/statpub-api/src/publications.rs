//! Handlers for `/publications` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/publications` | Body: [`NewPublication`] |
//! | `GET`    | `/publications/:id` | 404 if not found |
//! | `PUT`    | `/publications/:id/methodology` | Body: `{"methodology_id": <uuid or null>}` |
//! | `PUT`    | `/publications/:id/contact` | Body: `{"contact_id": <uuid or null>}` |
//! | `POST`   | `/publications/:id/links` | Body: [`NewLink`] |
//! | `DELETE` | `/publications/:id` | Cascades to links and releases |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use statpub_core::{
  store::PublishingStore,
  taxonomy::{NewLink, NewPublication, Publication},
};
use uuid::Uuid;

use crate::{error::ApiError, extract::ApiJson};

/// `POST /publications`
pub async fn create<S: PublishingStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewPublication>,
) -> Result<impl IntoResponse, ApiError> {
  let publication = store.add_publication(body).await.map_err(ApiError::store)?;
  tracing::info!(
    publication_id = %publication.publication_id,
    slug = %publication.slug,
    "publication created"
  );
  Ok((StatusCode::CREATED, Json(publication)))
}

/// `GET /publications/:id`
pub async fn get_one<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Publication>, ApiError> {
  let publication = store
    .get_publication(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("publication {id} not found")))?;
  Ok(Json(publication))
}

// ─── References ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MethodologyBody {
  pub methodology_id: Option<Uuid>,
}

/// `PUT /publications/:id/methodology`
pub async fn set_methodology<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<MethodologyBody>,
) -> Result<Json<Publication>, ApiError> {
  let publication = store
    .set_publication_methodology(id, body.methodology_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(publication))
}

#[derive(Debug, Deserialize)]
pub struct ContactBody {
  pub contact_id: Option<Uuid>,
}

/// `PUT /publications/:id/contact`
pub async fn set_contact<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<ContactBody>,
) -> Result<Json<Publication>, ApiError> {
  let publication = store
    .set_publication_contact(id, body.contact_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(publication))
}

/// `POST /publications/:id/links`
pub async fn add_link<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<NewLink>,
) -> Result<impl IntoResponse, ApiError> {
  let link = store.add_link(id, body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(link)))
}

/// `DELETE /publications/:id`
pub async fn delete_one<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_publication(id).await.map_err(ApiError::store)?;
  tracing::warn!(publication_id = %id, "publication deleted with its releases");
  Ok(StatusCode::NO_CONTENT)
}
