//! Post-commit notification events.
//!
//! The engine only decides *that* something happened and *who* should hear
//! about it; delivery mechanics belong to the notification collaborator.
//! Events are returned alongside the transition result as an outbox list —
//! their consumption can fail and retry without touching the transition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::RequestStatus;

/// Who a [`WorkflowEvent`] is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Audience {
  Owner,
  AssignedReviewer,
  AllStaff,
  ClubOfficers { club_id: Uuid },
}

/// One abstract notification emitted per transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
  pub request_id: Uuid,
  pub from:       RequestStatus,
  pub to:         RequestStatus,
  pub actor_id:   Uuid,
  pub audience:   Audience,
}
