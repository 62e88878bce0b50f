//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enumerations are stored as
//! their snake_case names. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr as _;

use charter_core::{
  audit::AuditEntry,
  defense::{DefenseResult, DefenseSchedule},
  document::{DocumentKind, DocumentVersion},
  provision::{Club, ClubMembership, ClubRole, MembershipStatus},
  request::CharterRequest,
  status::RequestStatus,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

pub fn decode_uuid_opt(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn encode_status(status: RequestStatus) -> &'static str {
  status.into()
}

pub fn decode_status(s: &str) -> Result<RequestStatus> {
  RequestStatus::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown request status: {s:?}")))
}

pub fn encode_document_kind(kind: DocumentKind) -> &'static str {
  kind.into()
}

pub fn decode_document_kind(s: &str) -> Result<DocumentKind> {
  DocumentKind::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown document kind: {s:?}")))
}

pub fn encode_defense_result(result: DefenseResult) -> &'static str {
  result.into()
}

pub fn decode_defense_result(s: &str) -> Result<DefenseResult> {
  DefenseResult::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown defense result: {s:?}")))
}

pub fn encode_membership_status(status: MembershipStatus) -> &'static str {
  match status {
    MembershipStatus::Active => "active",
    MembershipStatus::Inactive => "inactive",
  }
}

pub fn decode_membership_status(s: &str) -> Result<MembershipStatus> {
  match s {
    "active" => Ok(MembershipStatus::Active),
    "inactive" => Ok(MembershipStatus::Inactive),
    other => Err(Error::Decode(format!("unknown membership status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `requests` row.
pub struct RawRequest {
  pub request_id:            String,
  pub name:                  Option<String>,
  pub category:              Option<String>,
  pub code:                  Option<String>,
  pub expected_members:      Option<i64>,
  pub objectives:            Option<String>,
  pub contact_channels:      Option<String>,
  pub status:                String,
  pub created_by:            String,
  pub assigned_reviewer:     Option<String>,
  pub created_at:            String,
  pub received_at:           Option<String>,
  pub confirmation_deadline: Option<String>,
  pub confirmed_at:          Option<String>,
  pub decided_at:            Option<String>,
}

impl RawRequest {
  pub fn into_request(self) -> Result<CharterRequest> {
    Ok(CharterRequest {
      request_id:            decode_uuid(&self.request_id)?,
      name:                  self.name,
      category:              self.category,
      code:                  self.code,
      expected_members:      self.expected_members.map(|n| n as u32),
      objectives:            self.objectives,
      contact_channels:      self.contact_channels,
      status:                decode_status(&self.status)?,
      created_by:            decode_uuid(&self.created_by)?,
      assigned_reviewer:     decode_uuid_opt(self.assigned_reviewer.as_deref())?,
      created_at:            decode_dt(&self.created_at)?,
      received_at:           decode_dt_opt(self.received_at.as_deref())?,
      confirmation_deadline: decode_dt_opt(
        self.confirmation_deadline.as_deref(),
      )?,
      confirmed_at:          decode_dt_opt(self.confirmed_at.as_deref())?,
      decided_at:            decode_dt_opt(self.decided_at.as_deref())?,
    })
  }
}

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub document_id:  String,
  pub request_id:   String,
  pub kind:         String,
  pub seq:          i64,
  pub title:        String,
  pub document_url: String,
  pub created_at:   String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<DocumentVersion> {
    Ok(DocumentVersion {
      document_id:  decode_uuid(&self.document_id)?,
      request_id:   decode_uuid(&self.request_id)?,
      kind:         decode_document_kind(&self.kind)?,
      seq:          self.seq as u32,
      title:        self.title,
      document_url: self.document_url,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `defense_schedules` row.
pub struct RawSchedule {
  pub request_id:   String,
  pub starts_at:    String,
  pub ends_at:      String,
  pub location:     String,
  pub meeting_link: Option<String>,
  pub notes:        Option<String>,
  pub result:       Option<String>,
  pub feedback:     Option<String>,
  pub updated_at:   String,
}

impl RawSchedule {
  pub fn into_schedule(self) -> Result<DefenseSchedule> {
    Ok(DefenseSchedule {
      request_id:   decode_uuid(&self.request_id)?,
      starts_at:    decode_dt(&self.starts_at)?,
      ends_at:      decode_dt(&self.ends_at)?,
      location:     self.location,
      meeting_link: self.meeting_link,
      notes:        self.notes,
      result:       self
        .result
        .as_deref()
        .map(decode_defense_result)
        .transpose()?,
      feedback:     self.feedback,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `audit_log` row.
pub struct RawAuditEntry {
  pub entry_id:    i64,
  pub request_id:  String,
  pub actor_id:    String,
  pub action:      String,
  pub comment:     Option<String>,
  pub recorded_at: String,
}

impl RawAuditEntry {
  pub fn into_entry(self) -> Result<AuditEntry> {
    Ok(AuditEntry {
      entry_id:    self.entry_id,
      request_id:  decode_uuid(&self.request_id)?,
      actor_id:    decode_uuid(&self.actor_id)?,
      action:      self.action,
      comment:     self.comment,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `clubs` row.
pub struct RawClub {
  pub club_id:          String,
  pub request_id:       String,
  pub name:             String,
  pub category:         String,
  pub code:             Option<String>,
  pub expected_members: i64,
  pub objectives:       Option<String>,
  pub founded_at:       String,
}

impl RawClub {
  pub fn into_club(self) -> Result<Club> {
    Ok(Club {
      club_id:          decode_uuid(&self.club_id)?,
      request_id:       decode_uuid(&self.request_id)?,
      name:             self.name,
      category:         self.category,
      code:             self.code,
      expected_members: self.expected_members as u32,
      objectives:       self.objectives,
      founded_at:       decode_dt(&self.founded_at)?,
    })
  }
}

/// Raw strings read directly from a `club_roles` row.
pub struct RawClubRole {
  pub role_id:     String,
  pub club_id:     String,
  pub name:        String,
  pub level:       i64,
  pub category_id: Option<String>,
}

impl RawClubRole {
  pub fn into_role(self) -> Result<ClubRole> {
    Ok(ClubRole {
      role_id:     decode_uuid(&self.role_id)?,
      club_id:     decode_uuid(&self.club_id)?,
      name:        self.name,
      level:       self.level as u8,
      category_id: decode_uuid_opt(self.category_id.as_deref())?,
    })
  }
}

/// Raw strings read directly from a `club_memberships` row.
pub struct RawMembership {
  pub membership_id: String,
  pub club_id:       String,
  pub user_id:       String,
  pub status:        String,
  pub joined_at:     String,
}

impl RawMembership {
  pub fn into_membership(self) -> Result<ClubMembership> {
    Ok(ClubMembership {
      membership_id: decode_uuid(&self.membership_id)?,
      club_id:       decode_uuid(&self.club_id)?,
      user_id:       decode_uuid(&self.user_id)?,
      status:        decode_membership_status(&self.status)?,
      joined_at:     decode_dt(&self.joined_at)?,
    })
  }
}
