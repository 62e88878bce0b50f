//! Handlers for `/clubs` endpoints.
//!
//! Clubs are read-only here: they come into existence only through the
//! terminal approval of a charter request.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use charter_core::{
  provision::{Club, ClubMembership, ClubRole},
  store::WorkflowStore,
};
use uuid::Uuid;

use crate::{actor::CallerIdentity, error::ApiError};

/// `GET /clubs` — all established clubs, newest first.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
) -> Result<Json<Vec<Club>>, ApiError>
where
  S: WorkflowStore,
{
  let clubs = store.list_clubs().await.map_err(ApiError::from_store)?;
  Ok(Json(clubs))
}

/// `GET /clubs/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<Json<Club>, ApiError>
where
  S: WorkflowStore,
{
  let club = store
    .get_club(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(ApiError::Core(charter_core::Error::ClubNotFound(id)))?;
  Ok(Json(club))
}

/// `GET /clubs/:id/roles` — the role catalogue, highest rank first.
pub async fn roles<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ClubRole>>, ApiError>
where
  S: WorkflowStore,
{
  let roles = store.club_roles(id).await.map_err(ApiError::from_store)?;
  Ok(Json(roles))
}

/// `GET /clubs/:id/members` — memberships, oldest first.
pub async fn members<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ClubMembership>>, ApiError>
where
  S: WorkflowStore,
{
  let members = store
    .club_memberships(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(members))
}
