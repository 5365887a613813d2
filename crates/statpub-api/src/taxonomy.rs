//! Handlers for `/themes` and `/topics`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/themes` | All themes, by title |
//! | `POST` | `/themes` | Body: [`NewTheme`]; 409 on a duplicate slug |
//! | `GET`  | `/themes/:id` | 404 if not found |
//! | `POST` | `/topics` | Body: [`NewTopic`]; 404 if the theme is missing |
//! | `GET`  | `/topics/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use statpub_core::{
  store::PublishingStore,
  taxonomy::{NewTheme, NewTopic, Theme, Topic},
};
use uuid::Uuid;

use crate::{error::ApiError, extract::ApiJson};

// ─── Themes ──────────────────────────────────────────────────────────────────

/// `GET /themes`
pub async fn list_themes<S: PublishingStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Theme>>, ApiError> {
  let themes = store.list_themes().await.map_err(ApiError::store)?;
  Ok(Json(themes))
}

/// `POST /themes`
pub async fn create_theme<S: PublishingStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewTheme>,
) -> Result<impl IntoResponse, ApiError> {
  let theme = store.add_theme(body).await.map_err(ApiError::store)?;
  tracing::info!(theme_id = %theme.theme_id, slug = %theme.slug, "theme created");
  Ok((StatusCode::CREATED, Json(theme)))
}

/// `GET /themes/:id`
pub async fn get_theme<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Theme>, ApiError> {
  let theme = store
    .get_theme(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("theme {id} not found")))?;
  Ok(Json(theme))
}

// ─── Topics ──────────────────────────────────────────────────────────────────

/// `POST /topics`
pub async fn create_topic<S: PublishingStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<NewTopic>,
) -> Result<impl IntoResponse, ApiError> {
  let topic = store.add_topic(body).await.map_err(ApiError::store)?;
  tracing::info!(topic_id = %topic.topic_id, slug = %topic.slug, "topic created");
  Ok((StatusCode::CREATED, Json(topic)))
}

/// `GET /topics/:id`
pub async fn get_topic<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Topic>, ApiError> {
  let topic = store
    .get_topic(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("topic {id} not found")))?;
  Ok(Json(topic))
}
