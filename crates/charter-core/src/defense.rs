//! The defense schedule — the single mutable meeting-slot record used to
//! adjudicate a club proposal.
//!
//! Unlike the versioned documents, there is at most one live schedule per
//! request: it is proposed, possibly rejected, revised in place, and finally
//! confirmed or adjudicated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

/// Where a schedule stands. `None` on a freshly-rejected schedule means the
/// slot is open for revision again.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DefenseResult {
  Proposed,
  Confirmed,
  Passed,
  Failed,
}

impl DefenseResult {
  /// Only `Passed` and `Failed` are legal outcomes when completing a
  /// defense.
  pub fn is_outcome(self) -> bool {
    matches!(self, Self::Passed | Self::Failed)
  }
}

/// The mutable fields of a schedule, as supplied by the student when
/// proposing or revising a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefenseSlot {
  pub starts_at:    DateTime<Utc>,
  pub ends_at:      DateTime<Utc>,
  pub location:     String,
  pub meeting_link: Option<String>,
  pub notes:        Option<String>,
}

impl DefenseSlot {
  pub fn validate(&self) -> Result<()> {
    if self.ends_at <= self.starts_at {
      return Err(Error::Validation(
        "the defense must end strictly after it starts".into(),
      ));
    }
    Ok(())
  }
}

/// The one-per-request schedule record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefenseSchedule {
  pub request_id:   Uuid,
  pub starts_at:    DateTime<Utc>,
  pub ends_at:      DateTime<Utc>,
  pub location:     String,
  pub meeting_link: Option<String>,
  pub notes:        Option<String>,
  pub result:       Option<DefenseResult>,
  pub feedback:     Option<String>,
  pub updated_at:   DateTime<Utc>,
}

impl DefenseSchedule {
  /// Once confirmed, time and location are immutable until an explicit
  /// rejection clears the lock.
  pub fn is_locked(&self) -> bool {
    self.result == Some(DefenseResult::Confirmed)
  }
}
