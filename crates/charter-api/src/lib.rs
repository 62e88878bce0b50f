//! JSON REST API for the Charter workflow engine.
//!
//! Exposes an axum [`Router`] backed by any
//! [`charter_core::store::WorkflowStore`]. Identity arrives via trusted
//! headers (`x-user-id`, `x-user-role`) set by the campus gateway; TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", charter_api::api_router(store.clone()))
//! ```

pub mod actor;
pub mod clubs;
pub mod error;
pub mod requests;
pub mod resources;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use charter_core::store::WorkflowStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: WorkflowStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Requests
    .route(
      "/requests",
      get(requests::list::<S>).post(requests::create::<S>),
    )
    .route(
      "/requests/{id}",
      get(requests::get_one::<S>)
        .patch(requests::update::<S>)
        .delete(requests::delete_one::<S>),
    )
    .route("/requests/{id}/actions", post(requests::execute::<S>))
    // Per-request resources
    .route("/requests/{id}/documents", get(resources::documents::<S>))
    .route(
      "/requests/{id}/documents/latest",
      get(resources::latest_document::<S>),
    )
    .route("/requests/{id}/schedule", get(resources::schedule::<S>))
    .route("/requests/{id}/audit", get(resources::audit::<S>))
    // Clubs
    .route("/clubs", get(clubs::list::<S>))
    .route("/clubs/{id}", get(clubs::get_one::<S>))
    .route("/clubs/{id}/roles", get(clubs::roles::<S>))
    .route("/clubs/{id}/members", get(clubs::members::<S>))
    .with_state(store)
}
