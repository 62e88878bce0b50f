//! Error taxonomy for `charter-core`.
//!
//! Every failure carries a human-readable reason naming the violated rule;
//! the workflow is interactive and the caller's UI must be able to explain
//! *why* an action was refused, not just *that* it was.

use thiserror::Error;
use uuid::Uuid;

use crate::{document::DocumentKind, status::RequestStatus};

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or missing input, out-of-range values, duplicate club names.
  /// Always raised before any mutation.
  #[error("validation failed: {0}")]
  Validation(String),

  /// The requested action is not legal from the request's current status.
  #[error(
    "{action} is not allowed while the request is {current}; \
     allowed from: {}",
    fmt_statuses(allowed)
  )]
  InvalidState {
    action:  &'static str,
    current: RequestStatus,
    allowed: Vec<RequestStatus>,
  },

  /// The actor is not the owner, assigned reviewer, or staff member the
  /// action requires.
  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("request not found: {0}")]
  RequestNotFound(Uuid),

  #[error("no {kind} document has been submitted for request {request_id}")]
  DocumentNotFound {
    request_id: Uuid,
    kind:       DocumentKind,
  },

  #[error("no defense schedule exists for request {0}")]
  ScheduleNotFound(Uuid),

  #[error("club not found: {0}")]
  ClubNotFound(Uuid),

  /// A precondition the system itself should guarantee is missing, e.g. no
  /// active academic term at approval time. Never the caller's fault.
  #[error("configuration fault: {0}")]
  Configuration(String),

  /// A storage backend failed below the domain layer.
  #[error("storage error: {0}")]
  Storage(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn fmt_statuses(statuses: &[RequestStatus]) -> String {
  statuses
    .iter()
    .map(|s| s.to_string())
    .collect::<Vec<_>>()
    .join(", ")
}

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The coarse classification of an [`Error`], used by transport layers to
/// pick a status code and by operators to separate user mistakes from
/// system faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  InvalidState,
  Forbidden,
  NotFound,
  Configuration,
  Internal,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::InvalidState { .. } => ErrorKind::InvalidState,
      Self::Forbidden(_) => ErrorKind::Forbidden,
      Self::RequestNotFound(_)
      | Self::DocumentNotFound { .. }
      | Self::ScheduleNotFound(_)
      | Self::ClubNotFound(_) => ErrorKind::NotFound,
      Self::Configuration(_) => ErrorKind::Configuration,
      Self::Storage(_) | Self::Serialization(_) => ErrorKind::Internal,
    }
  }
}
