//! The `WorkflowStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `charter-store-sqlite`). Higher layers (`charter-api`, the server binary)
//! depend on this abstraction, not on any concrete backend.
//!
//! Atomicity contract: every write method is one atomic unit against the
//! request and its directly owned sub-resources. Per-request mutation is
//! serialized — of two racing transitions from the same status, the second
//! must observe the updated status and fail with `InvalidState`. The audit
//! append is the one decoupled write: it happens after commit and its
//! failure never fails the transition.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  actor::Actor,
  audit::AuditEntry,
  defense::DefenseSchedule,
  document::{DocumentKind, DocumentVersion},
  event::WorkflowEvent,
  provision::{Club, ClubMembership, ClubRole, ProvisionedClub},
  request::{CharterRequest, NewRequest, RequestPatch},
  status::RequestStatus,
  transition::WorkflowAction,
};

// ─── Results ─────────────────────────────────────────────────────────────────

/// What a successful transition hands back: the updated request, the
/// post-commit notification outbox, and — for the terminal approval — the
/// provisioned club bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionOutcome {
  pub request:     CharterRequest,
  pub events:      Vec<WorkflowEvent>,
  pub provisioned: Option<ProvisionedClub>,
}

/// Filter for [`WorkflowStore::list_requests`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFilter {
  pub status:            Option<RequestStatus>,
  pub created_by:        Option<Uuid>,
  pub assigned_reviewer: Option<Uuid>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Charter workflow store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait WorkflowStore: Send + Sync {
  type Error: std::error::Error
    + Into<crate::Error>
    + Send
    + Sync
    + 'static;

  // ── Request aggregate ─────────────────────────────────────────────────

  /// Create a request owned by `actor`, either as a draft or straight to
  /// `Submitted` (with required-field validation). The club name/code is
  /// checked for uniqueness against *established* clubs, never against
  /// other pending requests.
  ///
  /// Returns the new request plus the notification events it produced
  /// (an all-staff event when the request skips the draft stage).
  fn create_request(
    &self,
    actor: Actor,
    input: NewRequest,
    as_draft: bool,
  ) -> impl Future<Output = Result<(CharterRequest, Vec<WorkflowEvent>), Self::Error>>
  + Send
  + '_;

  /// Partial update; only legal while the request is a draft and only for
  /// its owner. A name change re-checks uniqueness.
  fn update_request(
    &self,
    request_id: Uuid,
    actor: Actor,
    patch: RequestPatch,
  ) -> impl Future<Output = Result<CharterRequest, Self::Error>> + Send + '_;

  /// Delete a draft. Only the owner may delete, and only while `Draft`.
  fn delete_request(
    &self,
    request_id: Uuid,
    actor: Actor,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── The state machine ─────────────────────────────────────────────────

  /// Validate and apply one workflow action as a single atomic unit, and
  /// best-effort append an audit entry with `comment` once it commits.
  fn execute(
    &self,
    request_id: Uuid,
    actor: Actor,
    action: WorkflowAction,
    comment: Option<String>,
  ) -> impl Future<Output = Result<TransitionOutcome, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_request(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Option<CharterRequest>, Self::Error>> + Send + '_;

  fn list_requests(
    &self,
    filter: RequestFilter,
  ) -> impl Future<Output = Result<Vec<CharterRequest>, Self::Error>> + Send + '_;

  /// All versions of one document kind, newest first.
  fn list_documents(
    &self,
    request_id: Uuid,
    kind: DocumentKind,
  ) -> impl Future<Output = Result<Vec<DocumentVersion>, Self::Error>> + Send + '_;

  /// The version with the greatest creation timestamp, or `None`.
  fn latest_document(
    &self,
    request_id: Uuid,
    kind: DocumentKind,
  ) -> impl Future<Output = Result<Option<DocumentVersion>, Self::Error>> + Send + '_;

  fn defense_schedule(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Option<DefenseSchedule>, Self::Error>> + Send + '_;

  /// The append-only transition history, oldest first.
  fn audit_log(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + '_;

  fn get_club(
    &self,
    club_id: Uuid,
  ) -> impl Future<Output = Result<Option<Club>, Self::Error>> + Send + '_;

  fn list_clubs(
    &self,
  ) -> impl Future<Output = Result<Vec<Club>, Self::Error>> + Send + '_;

  /// A club's role catalogue, highest rank first.
  fn club_roles(
    &self,
    club_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ClubRole>, Self::Error>> + Send + '_;

  /// A club's memberships, oldest first. The founder is always the first
  /// entry until further members join.
  fn club_memberships(
    &self,
    club_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ClubMembership>, Self::Error>> + Send + '_;
}
