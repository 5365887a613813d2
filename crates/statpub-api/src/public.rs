//! The public read path. Only published releases are ever visible here, and
//! editorial notes never are.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/public/themes` | Themes → topics → publications with something published |
//! | `GET`  | `/public/publications/:slug` | [`PublicationTree`]; 404 if nothing is published |
//! | `GET`  | `/public/publications/:slug/releases/:release_slug` | [`ResolvedRelease`] with live data blocks |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use statpub_core::{
  render::{ResolvedRelease, TableBuilder, resolve_release},
  store::PublishingStore,
  view::{PublicationTree, ThemeListing},
};

use crate::{ApiState, error::ApiError};

/// `GET /public/themes`
pub async fn index<S: PublishingStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ThemeListing>>, ApiError> {
  let index = store.public_index().await.map_err(ApiError::store)?;
  Ok(Json(index))
}

/// `GET /public/publications/:slug`
pub async fn publication<S: PublishingStore>(
  State(store): State<Arc<S>>,
  Path(slug): Path<String>,
) -> Result<Json<PublicationTree>, ApiError> {
  let tree = store
    .publication_tree(slug.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("publication {slug:?} not found")))?;
  Ok(Json(tree))
}

/// `GET /public/publications/:slug/releases/:release_slug`
pub async fn release<S, T>(
  State(state): State<ApiState<S, T>>,
  Path((slug, release_slug)): Path<(String, String)>,
) -> Result<Json<ResolvedRelease>, ApiError>
where
  S: PublishingStore,
  T: TableBuilder,
{
  let release = state
    .store
    .public_release(slug.clone(), release_slug.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("release {release_slug:?} of {slug:?} not found"))
    })?;

  let resolved = resolve_release(release, state.tables.as_ref()).await;
  let unavailable = resolved
    .content
    .iter()
    .flat_map(|s| &s.content)
    .filter(|b| b.is_unavailable())
    .count();
  if unavailable > 0 {
    tracing::warn!(%slug, %release_slug, unavailable, "data blocks could not be resolved");
  }
  Ok(Json(resolved))
}
