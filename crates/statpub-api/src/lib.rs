//! JSON REST API for the statistics publishing store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`statpub_core::store::PublishingStore`], with data blocks on the public
//! read path resolved through a [`statpub_core::render::TableBuilder`].
//! Auth and TLS are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", statpub_api::api_router(store.clone(), tables.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod periods;
pub mod public;
pub mod publications;
pub mod references;
pub mod releases;
pub mod summaries;
pub mod taxonomy;

use std::sync::Arc;

use axum::{
  Router,
  extract::FromRef,
  routing::{get, post, put},
};
use statpub_core::{render::TableBuilder, store::PublishingStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers. Most handlers only extract
/// the store (`State<Arc<S>>`).
pub struct ApiState<S, T> {
  pub store:  Arc<S>,
  pub tables: Arc<T>,
}

// Manual impl: neither `S` nor `T` needs to be `Clone`.
impl<S, T> Clone for ApiState<S, T> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), tables: self.tables.clone() }
  }
}

impl<S, T> FromRef<ApiState<S, T>> for Arc<S> {
  fn from_ref(state: &ApiState<S, T>) -> Self { state.store.clone() }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, T>(store: Arc<S>, tables: Arc<T>) -> Router<()>
where
  S: PublishingStore + 'static,
  T: TableBuilder + 'static,
{
  Router::new()
    // Taxonomy
    .route(
      "/themes",
      get(taxonomy::list_themes::<S>).post(taxonomy::create_theme::<S>),
    )
    .route("/themes/{id}", get(taxonomy::get_theme::<S>))
    .route("/topics", post(taxonomy::create_topic::<S>))
    .route("/topics/{id}", get(taxonomy::get_topic::<S>))
    // Shared references
    .route("/contacts", post(references::create_contact::<S>))
    .route(
      "/contacts/{id}",
      get(references::get_contact::<S>).delete(references::delete_contact::<S>),
    )
    .route("/methodologies", post(references::create_methodology::<S>))
    .route(
      "/methodologies/{id}",
      get(references::get_methodology::<S>)
        .delete(references::delete_methodology::<S>),
    )
    .route(
      "/release-types",
      get(references::list_release_types::<S>)
        .post(references::create_release_type::<S>),
    )
    .route(
      "/release-types/{id}",
      axum::routing::delete(references::delete_release_type::<S>),
    )
    // Publications
    .route("/publications", post(publications::create::<S>))
    .route(
      "/publications/{id}",
      get(publications::get_one::<S>).delete(publications::delete_one::<S>),
    )
    .route(
      "/publications/{id}/methodology",
      put(publications::set_methodology::<S>),
    )
    .route("/publications/{id}/contact", put(publications::set_contact::<S>))
    .route("/publications/{id}/links", post(publications::add_link::<S>))
    // Releases
    .route("/releases", post(releases::create::<S>))
    .route("/releases/{id}", get(releases::get_one::<S>))
    .route("/releases/{id}/content", put(releases::put_content::<S>))
    .route(
      "/releases/{id}/key-statistics",
      put(releases::put_key_statistics::<S>),
    )
    .route("/releases/{id}/note", put(releases::put_note::<S>))
    .route("/releases/{id}/status", post(releases::set_status::<S>))
    .route(
      "/releases/{id}/updates",
      get(releases::list_updates::<S>).post(releases::add_update::<S>),
    )
    // Summary versions
    .route(
      "/summaries/{id}/versions",
      get(summaries::list::<S>).post(summaries::append::<S>),
    )
    .route("/summaries/{id}/latest", get(summaries::latest::<S>))
    // Reference data
    .route("/time-periods", get(periods::list))
    // Public, published-only
    .route("/public/themes", get(public::index::<S>))
    .route("/public/publications/{slug}", get(public::publication::<S>))
    .route(
      "/public/publications/{slug}/releases/{release_slug}",
      get(public::release::<S, T>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(ApiState { store, tables })
}

#[cfg(test)]
mod tests;
