//! Club provisioning — the terminal action that materialises an approved
//! request into a live club with default roles and a founder membership.
//!
//! Everything here is created in one atomic unit by the final-form approval
//! transition and owned thereafter by the general club subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Academic term ───────────────────────────────────────────────────────────

/// The institution's current scheduling period, used to scope the founder's
/// role assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicTerm {
  pub term_id: Uuid,
  pub name:    String,
}

/// Resolves the currently active academic term. Passed into the store as an
/// explicit collaborator so tests can inject a fixed term.
pub trait TermSource: Send + Sync {
  fn active_term(&self) -> Option<AcademicTerm>;
}

/// A term source that always answers with the same term.
#[derive(Debug, Clone)]
pub struct FixedTerm(pub AcademicTerm);

impl TermSource for FixedTerm {
  fn active_term(&self) -> Option<AcademicTerm> {
    Some(self.0.clone())
  }
}

/// A term source with no active term — the configuration fault case.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActiveTerm;

impl TermSource for NoActiveTerm {
  fn active_term(&self) -> Option<AcademicTerm> {
    None
  }
}

// ─── Role catalogue ──────────────────────────────────────────────────────────

/// The fixed set of default roles every new club is provisioned with,
/// as `(name, level)` pairs. Level 1 ranks highest.
pub const ROLE_CATALOGUE: &[(&str, u8)] = &[
  ("president", 1),
  ("vice-president", 2),
  ("team-head", 3),
  ("team-deputy", 4),
  ("treasurer", 5),
  ("member", 6),
];

/// The role the founder is assigned for the active term.
pub const PRESIDENT_ROLE: &str = "president";

// ─── Provisioned records ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
  pub club_id:          Uuid,
  /// The request this club was provisioned from.
  pub request_id:       Uuid,
  pub name:             String,
  pub category:         String,
  pub code:             Option<String>,
  pub expected_members: u32,
  pub objectives:       Option<String>,
  pub founded_at:       DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubRole {
  pub role_id:     Uuid,
  pub club_id:     Uuid,
  pub name:        String,
  pub level:       u8,
  /// Optional link to a system-wide role category.
  pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
  Active,
  Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubMembership {
  pub membership_id: Uuid,
  pub club_id:       Uuid,
  pub user_id:       Uuid,
  pub status:        MembershipStatus,
  pub joined_at:     DateTime<Utc>,
}

/// Binds a membership to a role for one academic term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
  pub assignment_id: Uuid,
  pub membership_id: Uuid,
  pub role_id:       Uuid,
  pub term:          AcademicTerm,
}

/// Everything the terminal approval created, returned to the caller in one
/// bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedClub {
  pub club:                 Club,
  pub roles:                Vec<ClubRole>,
  pub founder:              ClubMembership,
  pub president_assignment: RoleAssignment,
}
