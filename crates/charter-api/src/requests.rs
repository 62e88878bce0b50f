//! Handlers for `/requests` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/requests` | Optional `?status=`, `?created_by=`, `?assigned_reviewer=` |
//! | `POST`   | `/requests` | Body: [`CreateBody`]; returns 201 |
//! | `GET`    | `/requests/:id` | 404 if not found |
//! | `PATCH`  | `/requests/:id` | Draft-only partial update |
//! | `DELETE` | `/requests/:id` | Draft-only; returns 204 |
//! | `POST`   | `/requests/:id/actions` | Body: [`ActionBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use charter_core::{
  event::WorkflowEvent,
  request::{CharterRequest, NewRequest, RequestPatch},
  status::RequestStatus,
  store::{RequestFilter, TransitionOutcome, WorkflowStore},
  transition::WorkflowAction,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{actor::CallerIdentity, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status:            Option<RequestStatus>,
  pub created_by:        Option<Uuid>,
  pub assigned_reviewer: Option<Uuid>,
}

/// `GET /requests[?status=...][&created_by=...][&assigned_reviewer=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CharterRequest>>, ApiError>
where
  S: WorkflowStore,
{
  let requests = store
    .list_requests(RequestFilter {
      status:            params.status,
      created_by:        params.created_by,
      assigned_reviewer: params.assigned_reviewer,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(requests))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /requests`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  /// `true` saves a half-filled draft; `false` (default) submits directly
  /// and enforces the required-field set.
  #[serde(default)]
  pub draft:  bool,
  #[serde(flatten)]
  pub fields: NewRequest,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
  pub request: CharterRequest,
  pub events:  Vec<WorkflowEvent>,
}

/// `POST /requests` — returns 201 + the stored request.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(actor): CallerIdentity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WorkflowStore,
{
  let (request, events) = store
    .create_request(actor, body.fields, body.draft)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(CreateResponse { request, events })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /requests/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<Json<CharterRequest>, ApiError>
where
  S: WorkflowStore,
{
  let request = store
    .get_request(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(ApiError::Core(charter_core::Error::RequestNotFound(id)))?;
  Ok(Json(request))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /requests/:id` — body is a partial [`RequestPatch`].
pub async fn update<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(actor): CallerIdentity,
  Path(id): Path<Uuid>,
  Json(patch): Json<RequestPatch>,
) -> Result<Json<CharterRequest>, ApiError>
where
  S: WorkflowStore,
{
  let request = store
    .update_request(id, actor, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(request))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /requests/:id` — returns 204.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(actor): CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: WorkflowStore,
{
  store
    .delete_request(id, actor)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Actions ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /requests/:id/actions`.
///
/// The action and its payload are flattened into the body, discriminated by
/// the `action` field, e.g.:
///
/// ```json
/// { "action": "submit_proposal",
///   "title": "Chess Club proposal v2",
///   "document_url": "https://files.example.edu/p2.pdf",
///   "comment": "addressed the budget feedback" }
/// ```
#[derive(Debug, Deserialize)]
pub struct ActionBody {
  #[serde(flatten)]
  pub action:  WorkflowAction,
  /// Free-text note recorded alongside the audit entry.
  pub comment: Option<String>,
}

/// `POST /requests/:id/actions` — apply one workflow action.
pub async fn execute<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(actor): CallerIdentity,
  Path(id): Path<Uuid>,
  Json(body): Json<ActionBody>,
) -> Result<Json<TransitionOutcome>, ApiError>
where
  S: WorkflowStore,
{
  let outcome = store
    .execute(id, actor, body.action, body.comment)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(outcome))
}
