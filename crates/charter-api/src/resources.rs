//! Read handlers for a request's owned sub-resources.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/requests/:id/documents` | `?kind=proposal\|final_form` required |
//! | `GET` | `/requests/:id/documents/latest` | Latest version of one kind |
//! | `GET` | `/requests/:id/schedule` | 404 until a schedule is proposed |
//! | `GET` | `/requests/:id/audit` | Transition history, oldest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use charter_core::{
  audit::AuditEntry,
  defense::DefenseSchedule,
  document::{DocumentKind, DocumentVersion},
  store::WorkflowStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{actor::CallerIdentity, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct DocumentParams {
  pub kind: DocumentKind,
}

/// `GET /requests/:id/documents?kind=<kind>` — all versions, newest first.
pub async fn documents<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
  Path(id): Path<Uuid>,
  Query(params): Query<DocumentParams>,
) -> Result<Json<Vec<DocumentVersion>>, ApiError>
where
  S: WorkflowStore,
{
  let versions = store
    .list_documents(id, params.kind)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(versions))
}

/// `GET /requests/:id/documents/latest?kind=<kind>`
pub async fn latest_document<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
  Path(id): Path<Uuid>,
  Query(params): Query<DocumentParams>,
) -> Result<Json<DocumentVersion>, ApiError>
where
  S: WorkflowStore,
{
  let latest = store
    .latest_document(id, params.kind)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(ApiError::Core(charter_core::Error::DocumentNotFound {
      request_id: id,
      kind:       params.kind,
    }))?;
  Ok(Json(latest))
}

/// `GET /requests/:id/schedule`
pub async fn schedule<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<Json<DefenseSchedule>, ApiError>
where
  S: WorkflowStore,
{
  let schedule = store
    .defense_schedule(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(ApiError::Core(charter_core::Error::ScheduleNotFound(id)))?;
  Ok(Json(schedule))
}

/// `GET /requests/:id/audit`
pub async fn audit<S>(
  State(store): State<Arc<S>>,
  CallerIdentity(_actor): CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AuditEntry>>, ApiError>
where
  S: WorkflowStore,
{
  let entries = store
    .audit_log(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(entries))
}
