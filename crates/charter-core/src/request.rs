//! The request aggregate — the case record tracking one club-establishment
//! application end to end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{actor::Actor, status::RequestStatus, Error, Result};

/// A club-establishment request.
///
/// Descriptive fields are optional so a draft can be saved half-filled;
/// [`CharterRequest::validate_for_submission`] enforces the required set
/// whenever the request leaves `Draft`. Timestamp fields are history markers
/// set exactly once by the transition that produces them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharterRequest {
  pub request_id: Uuid,

  pub name:             Option<String>,
  pub category:         Option<String>,
  pub code:             Option<String>,
  pub expected_members: Option<u32>,
  pub objectives:       Option<String>,
  pub contact_channels: Option<String>,

  pub status: RequestStatus,

  /// The student who owns the request. Immutable after creation.
  pub created_by:        Uuid,
  /// Set once by `receive`; afterwards only this reviewer may act on
  /// staff-side transitions.
  pub assigned_reviewer: Option<Uuid>,

  pub created_at:            DateTime<Utc>,
  pub received_at:           Option<DateTime<Utc>>,
  pub confirmation_deadline: Option<DateTime<Utc>>,
  pub confirmed_at:          Option<DateTime<Utc>>,
  /// Set when the request reaches a terminal status.
  pub decided_at:            Option<DateTime<Utc>>,
}

impl CharterRequest {
  pub fn is_owner(&self, actor: Actor) -> bool {
    self.created_by == actor.user_id
  }

  pub fn is_assigned_reviewer(&self, actor: Actor) -> bool {
    self.assigned_reviewer == Some(actor.user_id)
  }

  /// The required-field check applied at non-draft creation and again at
  /// submission time, as a defence against partially-filled drafts.
  pub fn validate_for_submission(&self) -> Result<()> {
    if self.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
      return Err(Error::Validation("a club name is required".into()));
    }
    if self.category.as_deref().is_none_or(|c| c.trim().is_empty()) {
      return Err(Error::Validation("a club category is required".into()));
    }
    match self.expected_members {
      None => {
        return Err(Error::Validation(
          "an expected member count is required".into(),
        ));
      }
      Some(0) => {
        return Err(Error::Validation(
          "expected member count must be greater than zero".into(),
        ));
      }
      Some(_) => {}
    }
    Ok(())
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::WorkflowStore::create_request`].
/// Identity, status, and all timestamps are assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRequest {
  pub name:             Option<String>,
  pub category:         Option<String>,
  pub code:             Option<String>,
  pub expected_members: Option<u32>,
  pub objectives:       Option<String>,
  pub contact_channels: Option<String>,
}

/// Partial update applied while a request is still a draft. `None` fields
/// are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestPatch {
  pub name:             Option<String>,
  pub category:         Option<String>,
  pub code:             Option<String>,
  pub expected_members: Option<u32>,
  pub objectives:       Option<String>,
  pub contact_channels: Option<String>,
}

impl RequestPatch {
  /// Apply the supplied fields to `request`, leaving the rest untouched.
  pub fn apply_to(&self, request: &mut CharterRequest) {
    if let Some(name) = &self.name {
      request.name = Some(name.clone());
    }
    if let Some(category) = &self.category {
      request.category = Some(category.clone());
    }
    if let Some(code) = &self.code {
      request.code = Some(code.clone());
    }
    if let Some(count) = self.expected_members {
      request.expected_members = Some(count);
    }
    if let Some(objectives) = &self.objectives {
      request.objectives = Some(objectives.clone());
    }
    if let Some(channels) = &self.contact_channels {
      request.contact_channels = Some(channels.clone());
    }
  }
}
