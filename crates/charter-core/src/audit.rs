//! The workflow audit trail.
//!
//! One entry per successful transition, appended best-effort: a failed
//! append is logged and swallowed, never surfaced as a transition failure.
//! History is diagnostic, not authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An append-only record of one workflow transition. Never mutated or
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
  pub entry_id:    i64,
  pub request_id:  Uuid,
  pub actor_id:    Uuid,
  /// Short action code, e.g. `REQUEST_SUBMITTED`.
  pub action:      String,
  pub comment:     Option<String>,
  pub recorded_at: DateTime<Utc>,
}
