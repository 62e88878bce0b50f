//! [`SqliteStore`] — the SQLite implementation of [`WorkflowStore`].
//!
//! Every workflow transition runs inside one rusqlite transaction: the
//! request and its schedule are read, the pure planner from
//! [`charter_core::transition`] validates the move, and the resulting effect
//! (status change, document append, schedule write, club provisioning) is
//! applied and committed as a unit. The audit append runs after commit and
//! is never allowed to fail the transition.

use std::{path::Path, sync::Arc};

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use charter_core::{
  actor::Actor,
  audit::AuditEntry,
  clock::{Clock, SystemClock},
  defense::{DefenseResult, DefenseSchedule, DefenseSlot},
  document::{DocumentKind, DocumentVersion},
  event::{Audience, WorkflowEvent},
  provision::{
    AcademicTerm, Club, ClubMembership, ClubRole, MembershipStatus,
    ProvisionedClub, RoleAssignment, TermSource, PRESIDENT_ROLE,
    ROLE_CATALOGUE,
  },
  request::{CharterRequest, NewRequest, RequestPatch},
  status::RequestStatus,
  store::{RequestFilter, TransitionOutcome, WorkflowStore},
  transition::{self, ActionKind, Effect, WorkflowAction},
};

use crate::{
  encode::{
    encode_defense_result, encode_document_kind, encode_dt,
    encode_membership_status, encode_status, encode_uuid, RawAuditEntry,
    RawClub, RawClubRole, RawDocument, RawMembership, RawRequest,
    RawSchedule,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Charter workflow store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The single
/// connection serializes all writes, which is exactly the per-request
/// single-writer discipline the workflow needs.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Arc<dyn Clock>,
  terms: Arc<dyn TermSource>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(
    path: impl AsRef<Path>,
    terms: Arc<dyn TermSource>,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self {
      conn,
      clock: Arc::new(SystemClock),
      terms,
    };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory(terms: Arc<dyn TermSource>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self {
      conn,
      clock: Arc::new(SystemClock),
      terms,
    };
    store.init_schema().await?;
    Ok(store)
  }

  /// Replace the wall clock, e.g. with a manual clock in tests.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Append one audit entry. Best-effort: failures are logged and swallowed
  /// because history is diagnostic, not authoritative.
  async fn append_audit(
    &self,
    request_id: Uuid,
    actor_id: Uuid,
    action: &'static str,
    comment: Option<String>,
  ) {
    let id_str = encode_uuid(request_id);
    let actor_str = encode_uuid(actor_id);
    let at_str = encode_dt(self.clock.now());

    let result = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audit_log (request_id, actor_id, action, comment, recorded_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, actor_str, action, comment, at_str],
        )?;
        Ok(())
      })
      .await;

    if let Err(error) = result {
      tracing::warn!(
        %request_id,
        action,
        %error,
        "audit append failed; the transition itself already committed"
      );
    }
  }
}

// ─── WorkflowStore impl ──────────────────────────────────────────────────────

impl WorkflowStore for SqliteStore {
  type Error = Error;

  // ── Request aggregate ─────────────────────────────────────────────────────

  async fn create_request(
    &self,
    actor: Actor,
    input: NewRequest,
    as_draft: bool,
  ) -> Result<(CharterRequest, Vec<WorkflowEvent>)> {
    let now = self.clock.now();
    let request = CharterRequest {
      request_id:            Uuid::new_v4(),
      name:                  input.name,
      category:              input.category,
      code:                  input.code,
      expected_members:      input.expected_members,
      objectives:            input.objectives,
      contact_channels:      input.contact_channels,
      status:                if as_draft {
        RequestStatus::Draft
      } else {
        RequestStatus::Submitted
      },
      created_by:            actor.user_id,
      assigned_reviewer:     None,
      created_at:            now,
      received_at:           None,
      confirmation_deadline: None,
      confirmed_at:          None,
      decided_at:            None,
    };

    if !as_draft {
      request.validate_for_submission().map_err(Error::Core)?;
    }

    let row = request.clone();
    self
      .conn
      .call(move |conn| Ok(create_tx(conn, &row)))
      .await??;

    let mut events = Vec::new();
    if !as_draft {
      events.push(WorkflowEvent {
        request_id: request.request_id,
        from:       RequestStatus::Draft,
        to:         RequestStatus::Submitted,
        actor_id:   actor.user_id,
        audience:   Audience::AllStaff,
      });
      self
        .append_audit(
          request.request_id,
          actor.user_id,
          ActionKind::Submit.audit_code(),
          None,
        )
        .await;
    }

    Ok((request, events))
  }

  async fn update_request(
    &self,
    request_id: Uuid,
    actor: Actor,
    patch: RequestPatch,
  ) -> Result<CharterRequest> {
    self
      .conn
      .call(move |conn| Ok(update_tx(conn, request_id, actor, &patch)))
      .await?
  }

  async fn delete_request(&self, request_id: Uuid, actor: Actor) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(delete_tx(conn, request_id, actor)))
      .await?
  }

  // ── The state machine ─────────────────────────────────────────────────────

  async fn execute(
    &self,
    request_id: Uuid,
    actor: Actor,
    action: WorkflowAction,
    comment: Option<String>,
  ) -> Result<TransitionOutcome> {
    let now = self.clock.now();
    let term = self.terms.active_term();
    let audit_code = action.kind().audit_code();

    let outcome = self
      .conn
      .call(move |conn| Ok(execute_tx(conn, request_id, actor, &action, now, term)))
      .await??;

    // Decoupled from the transaction above: a failed append must not turn
    // a committed transition into a reported failure.
    self
      .append_audit(request_id, actor.user_id, audit_code, comment)
      .await;

    Ok(outcome)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_request(&self, request_id: Uuid) -> Result<Option<CharterRequest>> {
    self
      .conn
      .call(move |conn| Ok(load_request(conn, request_id)))
      .await?
  }

  async fn list_requests(
    &self,
    filter: RequestFilter,
  ) -> Result<Vec<CharterRequest>> {
    let status = filter.status.map(encode_status);
    let owner = filter.created_by.map(encode_uuid);
    let reviewer = filter.assigned_reviewer.map(encode_uuid);

    let raws: Vec<RawRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT request_id, name, category, code, expected_members,
                  objectives, contact_channels, status, created_by,
                  assigned_reviewer, created_at, received_at,
                  confirmation_deadline, confirmed_at, decided_at
           FROM requests
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR created_by = ?2)
             AND (?3 IS NULL OR assigned_reviewer = ?3)
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![status, owner, reviewer], request_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_request).collect()
  }

  async fn list_documents(
    &self,
    request_id: Uuid,
    kind: DocumentKind,
  ) -> Result<Vec<DocumentVersion>> {
    let id_str = encode_uuid(request_id);
    let kind_str = encode_document_kind(kind);

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT document_id, request_id, kind, seq, title, document_url,
                  created_at
           FROM documents
           WHERE request_id = ?1 AND kind = ?2
           ORDER BY created_at DESC, seq DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, kind_str], document_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }

  async fn latest_document(
    &self,
    request_id: Uuid,
    kind: DocumentKind,
  ) -> Result<Option<DocumentVersion>> {
    let mut versions = self.list_documents(request_id, kind).await?;
    Ok(if versions.is_empty() {
      None
    } else {
      Some(versions.remove(0))
    })
  }

  async fn defense_schedule(
    &self,
    request_id: Uuid,
  ) -> Result<Option<DefenseSchedule>> {
    self
      .conn
      .call(move |conn| Ok(load_schedule(conn, request_id)))
      .await?
  }

  async fn audit_log(&self, request_id: Uuid) -> Result<Vec<AuditEntry>> {
    let id_str = encode_uuid(request_id);

    let raws: Vec<RawAuditEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT entry_id, request_id, actor_id, action, comment, recorded_at
           FROM audit_log
           WHERE request_id = ?1
           ORDER BY entry_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAuditEntry {
              entry_id:    row.get(0)?,
              request_id:  row.get(1)?,
              actor_id:    row.get(2)?,
              action:      row.get(3)?,
              comment:     row.get(4)?,
              recorded_at: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditEntry::into_entry).collect()
  }

  async fn get_club(&self, club_id: Uuid) -> Result<Option<Club>> {
    let id_str = encode_uuid(club_id);

    let raw: Option<RawClub> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT club_id, request_id, name, category, code,
                      expected_members, objectives, founded_at
               FROM clubs WHERE club_id = ?1",
              rusqlite::params![id_str],
              club_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawClub::into_club).transpose()
  }

  async fn list_clubs(&self) -> Result<Vec<Club>> {
    let raws: Vec<RawClub> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT club_id, request_id, name, category, code,
                  expected_members, objectives, founded_at
           FROM clubs ORDER BY founded_at DESC",
        )?;
        let rows = stmt
          .query_map([], club_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClub::into_club).collect()
  }

  async fn club_roles(&self, club_id: Uuid) -> Result<Vec<ClubRole>> {
    let id_str = encode_uuid(club_id);

    let raws: Vec<RawClubRole> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT role_id, club_id, name, level, category_id
           FROM club_roles WHERE club_id = ?1
           ORDER BY level ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], club_role_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClubRole::into_role).collect()
  }

  async fn club_memberships(
    &self,
    club_id: Uuid,
  ) -> Result<Vec<ClubMembership>> {
    let id_str = encode_uuid(club_id);

    let raws: Vec<RawMembership> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT membership_id, club_id, user_id, status, joined_at
           FROM club_memberships WHERE club_id = ?1
           ORDER BY joined_at ASC, membership_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], membership_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMembership::into_membership).collect()
  }
}

// ─── Transaction bodies ──────────────────────────────────────────────────────
//
// These run synchronously on the connection thread. Domain failures roll the
// transaction back simply by returning before `commit`.

fn create_tx(
  conn: &mut rusqlite::Connection,
  request: &CharterRequest,
) -> Result<()> {
  let tx = conn.transaction()?;

  if let Some(name) = &request.name {
    if let Some(conflict) = club_name_conflict(&tx, name, request.code.as_deref())? {
      return Err(Error::Core(charter_core::Error::Validation(conflict)));
    }
  }

  insert_request_row(&tx, request)?;
  tx.commit()?;
  Ok(())
}

fn update_tx(
  conn: &mut rusqlite::Connection,
  request_id: Uuid,
  actor: Actor,
  patch: &RequestPatch,
) -> Result<CharterRequest> {
  let tx = conn.transaction()?;

  let mut request = load_request(&tx, request_id)?
    .ok_or(charter_core::Error::RequestNotFound(request_id))?;

  if !request.is_owner(actor) {
    return Err(Error::Core(charter_core::Error::Forbidden(
      "only the request owner may update a draft".into(),
    )));
  }
  if request.status != RequestStatus::Draft {
    return Err(Error::Core(charter_core::Error::InvalidState {
      action:  "update",
      current: request.status,
      allowed: vec![RequestStatus::Draft],
    }));
  }

  let name_changed =
    patch.name.is_some() && patch.name != request.name;
  patch.apply_to(&mut request);

  if name_changed {
    if let Some(name) = &request.name {
      if let Some(conflict) =
        club_name_conflict(&tx, name, request.code.as_deref())?
      {
        return Err(Error::Core(charter_core::Error::Validation(conflict)));
      }
    }
  }

  update_request_row(&tx, &request)?;
  tx.commit()?;
  Ok(request)
}

fn delete_tx(
  conn: &mut rusqlite::Connection,
  request_id: Uuid,
  actor: Actor,
) -> Result<()> {
  let tx = conn.transaction()?;

  let request = load_request(&tx, request_id)?
    .ok_or(charter_core::Error::RequestNotFound(request_id))?;

  if !request.is_owner(actor) {
    return Err(Error::Core(charter_core::Error::Forbidden(
      "only the request owner may delete a draft".into(),
    )));
  }
  if request.status != RequestStatus::Draft {
    return Err(Error::Core(charter_core::Error::InvalidState {
      action:  "delete",
      current: request.status,
      allowed: vec![RequestStatus::Draft],
    }));
  }

  let id_str = encode_uuid(request_id);
  tx.execute(
    "DELETE FROM audit_log WHERE request_id = ?1",
    rusqlite::params![id_str],
  )?;
  tx.execute(
    "DELETE FROM requests WHERE request_id = ?1",
    rusqlite::params![id_str],
  )?;
  tx.commit()?;
  Ok(())
}

fn execute_tx(
  conn: &mut rusqlite::Connection,
  request_id: Uuid,
  actor: Actor,
  action: &WorkflowAction,
  now: chrono::DateTime<chrono::Utc>,
  term: Option<AcademicTerm>,
) -> Result<TransitionOutcome> {
  let tx = conn.transaction()?;

  let request = load_request(&tx, request_id)?
    .ok_or(charter_core::Error::RequestNotFound(request_id))?;
  let schedule = load_schedule(&tx, request_id)?;

  let plan =
    transition::plan(&request, schedule.as_ref(), actor, now, action)
      .map_err(Error::Core)?;

  let mut updated = request;
  updated.status = plan.to;
  if plan.to.is_terminal() {
    updated.decided_at = Some(now);
  }

  let mut provisioned = None;
  match &plan.effect {
    Effect::None => {}

    Effect::Receive {
      reviewer,
      received_at,
      confirmation_deadline,
    } => {
      updated.assigned_reviewer = Some(*reviewer);
      updated.received_at = Some(*received_at);
      updated.confirmation_deadline = Some(*confirmation_deadline);
    }

    Effect::ConfirmContact { confirmed_at } => {
      updated.confirmed_at = Some(*confirmed_at);
    }

    Effect::Rename { name, code } => {
      if let Some(conflict) = club_name_conflict(&tx, name, code.as_deref())? {
        return Err(Error::Core(charter_core::Error::Validation(conflict)));
      }
      updated.name = Some(name.clone());
      if code.is_some() {
        updated.code = code.clone();
      }
    }

    Effect::AddDocument {
      kind,
      title,
      document_url,
    } => {
      insert_document(&tx, request_id, *kind, title, document_url, now)?;
    }

    Effect::ProposeSchedule { slot } => {
      upsert_schedule(&tx, request_id, slot, now)?;
    }

    Effect::ConfirmSchedule => {
      set_schedule_result(&tx, request_id, Some(DefenseResult::Confirmed), now)?;
    }

    Effect::ClearScheduleResult => {
      set_schedule_result(&tx, request_id, None, now)?;
    }

    Effect::RecordDefenseOutcome { result, feedback } => {
      let id_str = encode_uuid(request_id);
      tx.execute(
        "UPDATE defense_schedules
         SET result = ?2, feedback = ?3, updated_at = ?4
         WHERE request_id = ?1",
        rusqlite::params![
          id_str,
          encode_defense_result(*result),
          feedback,
          encode_dt(now)
        ],
      )?;
    }

    Effect::ProvisionClub => {
      let term = term.ok_or(charter_core::Error::Configuration(
        "no academic term is currently marked active".into(),
      ))?;
      provisioned = Some(provision_club(&tx, &updated, term, now)?);
    }
  }

  update_request_row(&tx, &updated)?;
  tx.commit()?;

  let mut events: Vec<WorkflowEvent> = plan
    .audiences
    .iter()
    .map(|audience| WorkflowEvent {
      request_id,
      from: plan.from,
      to: plan.to,
      actor_id: actor.user_id,
      audience: *audience,
    })
    .collect();
  if let Some(bundle) = &provisioned {
    events.push(WorkflowEvent {
      request_id,
      from: plan.from,
      to: plan.to,
      actor_id: actor.user_id,
      audience: Audience::ClubOfficers {
        club_id: bundle.club.club_id,
      },
    });
  }

  Ok(TransitionOutcome {
    request: updated,
    events,
    provisioned,
  })
}

// ─── Provisioning ────────────────────────────────────────────────────────────

/// Create the club, its six default roles, the founder membership, and the
/// president assignment. Runs inside the approval transaction; any failure
/// rolls the whole approval back.
fn provision_club(
  conn: &rusqlite::Connection,
  request: &CharterRequest,
  term: AcademicTerm,
  now: chrono::DateTime<chrono::Utc>,
) -> Result<ProvisionedClub> {
  let name = request.name.clone().ok_or_else(|| {
    charter_core::Error::Configuration(
      "request reached approval without a club name".into(),
    )
  })?;
  let category = request.category.clone().ok_or_else(|| {
    charter_core::Error::Configuration(
      "request reached approval without a category".into(),
    )
  })?;
  let expected_members = request.expected_members.ok_or_else(|| {
    charter_core::Error::Configuration(
      "request reached approval without a member count".into(),
    )
  })?;

  // Checked-then-created inside the same transaction: a racing approval of
  // a same-named request must not slip through the pre-check.
  if let Some(conflict) = club_name_conflict(conn, &name, request.code.as_deref())? {
    return Err(Error::Core(charter_core::Error::Validation(conflict)));
  }

  let club = Club {
    club_id: Uuid::new_v4(),
    request_id: request.request_id,
    name,
    category,
    code: request.code.clone(),
    expected_members,
    objectives: request.objectives.clone(),
    founded_at: now,
  };

  conn.execute(
    "INSERT INTO clubs (club_id, request_id, name, category, code,
                        expected_members, objectives, founded_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      encode_uuid(club.club_id),
      encode_uuid(club.request_id),
      club.name,
      club.category,
      club.code,
      club.expected_members,
      club.objectives,
      encode_dt(club.founded_at),
    ],
  )?;

  let roles: Vec<ClubRole> = ROLE_CATALOGUE
    .iter()
    .map(|&(name, level)| ClubRole {
      role_id: Uuid::new_v4(),
      club_id: club.club_id,
      name: name.to_owned(),
      level,
      category_id: None,
    })
    .collect();

  for role in &roles {
    conn.execute(
      "INSERT INTO club_roles (role_id, club_id, name, level, category_id)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      rusqlite::params![
        encode_uuid(role.role_id),
        encode_uuid(role.club_id),
        role.name,
        role.level,
        role.category_id.map(encode_uuid),
      ],
    )?;
  }

  let founder = ClubMembership {
    membership_id: Uuid::new_v4(),
    club_id:       club.club_id,
    user_id:       request.created_by,
    status:        MembershipStatus::Active,
    joined_at:     now,
  };

  conn.execute(
    "INSERT INTO club_memberships (membership_id, club_id, user_id, status, joined_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(founder.membership_id),
      encode_uuid(founder.club_id),
      encode_uuid(founder.user_id),
      encode_membership_status(founder.status),
      encode_dt(founder.joined_at),
    ],
  )?;

  let president = roles
    .iter()
    .find(|role| role.name == PRESIDENT_ROLE)
    .ok_or_else(|| {
      charter_core::Error::Configuration(
        "role catalogue is missing the president role".into(),
      )
    })?;

  let president_assignment = RoleAssignment {
    assignment_id: Uuid::new_v4(),
    membership_id: founder.membership_id,
    role_id:       president.role_id,
    term:          term.clone(),
  };

  conn.execute(
    "INSERT INTO role_assignments (assignment_id, membership_id, role_id, term_id, term_name)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(president_assignment.assignment_id),
      encode_uuid(president_assignment.membership_id),
      encode_uuid(president_assignment.role_id),
      encode_uuid(term.term_id),
      term.name,
    ],
  )?;

  Ok(ProvisionedClub {
    club,
    roles,
    founder,
    president_assignment,
  })
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn request_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRequest> {
  Ok(RawRequest {
    request_id:            row.get(0)?,
    name:                  row.get(1)?,
    category:              row.get(2)?,
    code:                  row.get(3)?,
    expected_members:      row.get(4)?,
    objectives:            row.get(5)?,
    contact_channels:      row.get(6)?,
    status:                row.get(7)?,
    created_by:            row.get(8)?,
    assigned_reviewer:     row.get(9)?,
    created_at:            row.get(10)?,
    received_at:           row.get(11)?,
    confirmation_deadline: row.get(12)?,
    confirmed_at:          row.get(13)?,
    decided_at:            row.get(14)?,
  })
}

fn document_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDocument> {
  Ok(RawDocument {
    document_id:  row.get(0)?,
    request_id:   row.get(1)?,
    kind:         row.get(2)?,
    seq:          row.get(3)?,
    title:        row.get(4)?,
    document_url: row.get(5)?,
    created_at:   row.get(6)?,
  })
}

fn club_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawClub> {
  Ok(RawClub {
    club_id:          row.get(0)?,
    request_id:       row.get(1)?,
    name:             row.get(2)?,
    category:         row.get(3)?,
    code:             row.get(4)?,
    expected_members: row.get(5)?,
    objectives:       row.get(6)?,
    founded_at:       row.get(7)?,
  })
}

fn club_role_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawClubRole> {
  Ok(RawClubRole {
    role_id:     row.get(0)?,
    club_id:     row.get(1)?,
    name:        row.get(2)?,
    level:       row.get(3)?,
    category_id: row.get(4)?,
  })
}

fn membership_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMembership> {
  Ok(RawMembership {
    membership_id: row.get(0)?,
    club_id:       row.get(1)?,
    user_id:       row.get(2)?,
    status:        row.get(3)?,
    joined_at:     row.get(4)?,
  })
}

fn load_request(
  conn: &rusqlite::Connection,
  request_id: Uuid,
) -> Result<Option<CharterRequest>> {
  let raw = conn
    .query_row(
      "SELECT request_id, name, category, code, expected_members,
              objectives, contact_channels, status, created_by,
              assigned_reviewer, created_at, received_at,
              confirmation_deadline, confirmed_at, decided_at
       FROM requests WHERE request_id = ?1",
      rusqlite::params![encode_uuid(request_id)],
      request_row,
    )
    .optional()?;

  raw.map(RawRequest::into_request).transpose()
}

fn load_schedule(
  conn: &rusqlite::Connection,
  request_id: Uuid,
) -> Result<Option<DefenseSchedule>> {
  let raw = conn
    .query_row(
      "SELECT request_id, starts_at, ends_at, location, meeting_link,
              notes, result, feedback, updated_at
       FROM defense_schedules WHERE request_id = ?1",
      rusqlite::params![encode_uuid(request_id)],
      |row| {
        Ok(RawSchedule {
          request_id:   row.get(0)?,
          starts_at:    row.get(1)?,
          ends_at:      row.get(2)?,
          location:     row.get(3)?,
          meeting_link: row.get(4)?,
          notes:        row.get(5)?,
          result:       row.get(6)?,
          feedback:     row.get(7)?,
          updated_at:   row.get(8)?,
        })
      },
    )
    .optional()?;

  raw.map(RawSchedule::into_schedule).transpose()
}

fn insert_request_row(
  conn: &rusqlite::Connection,
  request: &CharterRequest,
) -> Result<()> {
  conn.execute(
    "INSERT INTO requests (
       request_id, name, category, code, expected_members, objectives,
       contact_channels, status, created_by, assigned_reviewer, created_at,
       received_at, confirmation_deadline, confirmed_at, decided_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    rusqlite::params![
      encode_uuid(request.request_id),
      request.name,
      request.category,
      request.code,
      request.expected_members,
      request.objectives,
      request.contact_channels,
      encode_status(request.status),
      encode_uuid(request.created_by),
      request.assigned_reviewer.map(encode_uuid),
      encode_dt(request.created_at),
      request.received_at.map(encode_dt),
      request.confirmation_deadline.map(encode_dt),
      request.confirmed_at.map(encode_dt),
      request.decided_at.map(encode_dt),
    ],
  )?;
  Ok(())
}

fn update_request_row(
  conn: &rusqlite::Connection,
  request: &CharterRequest,
) -> Result<()> {
  conn.execute(
    "UPDATE requests SET
       name = ?2, category = ?3, code = ?4, expected_members = ?5,
       objectives = ?6, contact_channels = ?7, status = ?8,
       assigned_reviewer = ?9, received_at = ?10,
       confirmation_deadline = ?11, confirmed_at = ?12, decided_at = ?13
     WHERE request_id = ?1",
    rusqlite::params![
      encode_uuid(request.request_id),
      request.name,
      request.category,
      request.code,
      request.expected_members,
      request.objectives,
      request.contact_channels,
      encode_status(request.status),
      request.assigned_reviewer.map(encode_uuid),
      request.received_at.map(encode_dt),
      request.confirmation_deadline.map(encode_dt),
      request.confirmed_at.map(encode_dt),
      request.decided_at.map(encode_dt),
    ],
  )?;
  Ok(())
}

fn insert_document(
  conn: &rusqlite::Connection,
  request_id: Uuid,
  kind: DocumentKind,
  title: &str,
  document_url: &str,
  now: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
  let id_str = encode_uuid(request_id);
  let kind_str = encode_document_kind(kind);

  let next_seq: i64 = conn.query_row(
    "SELECT COALESCE(MAX(seq), 0) + 1 FROM documents
     WHERE request_id = ?1 AND kind = ?2",
    rusqlite::params![id_str, kind_str],
    |row| row.get(0),
  )?;

  conn.execute(
    "INSERT INTO documents (document_id, request_id, kind, seq, title,
                            document_url, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      id_str,
      kind_str,
      next_seq,
      title,
      document_url,
      encode_dt(now),
    ],
  )?;
  Ok(())
}

/// Create the schedule, or overwrite its mutable fields in place, and reset
/// the result to `proposed`.
fn upsert_schedule(
  conn: &rusqlite::Connection,
  request_id: Uuid,
  slot: &DefenseSlot,
  now: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
  conn.execute(
    "INSERT INTO defense_schedules
       (request_id, starts_at, ends_at, location, meeting_link, notes,
        result, feedback, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'proposed', NULL, ?7)
     ON CONFLICT (request_id) DO UPDATE SET
       starts_at = excluded.starts_at,
       ends_at = excluded.ends_at,
       location = excluded.location,
       meeting_link = excluded.meeting_link,
       notes = excluded.notes,
       result = 'proposed',
       feedback = NULL,
       updated_at = excluded.updated_at",
    rusqlite::params![
      encode_uuid(request_id),
      encode_dt(slot.starts_at),
      encode_dt(slot.ends_at),
      slot.location,
      slot.meeting_link,
      slot.notes,
      encode_dt(now),
    ],
  )?;
  Ok(())
}

fn set_schedule_result(
  conn: &rusqlite::Connection,
  request_id: Uuid,
  result: Option<DefenseResult>,
  now: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
  conn.execute(
    "UPDATE defense_schedules SET result = ?2, updated_at = ?3
     WHERE request_id = ?1",
    rusqlite::params![
      encode_uuid(request_id),
      result.map(encode_defense_result),
      encode_dt(now),
    ],
  )?;
  Ok(())
}

/// Case-insensitive uniqueness check against *established* clubs only.
/// Returns the reason string on a conflict.
fn club_name_conflict(
  conn: &rusqlite::Connection,
  name: &str,
  code: Option<&str>,
) -> Result<Option<String>> {
  let name_taken: bool = conn
    .query_row(
      "SELECT 1 FROM clubs WHERE lower(name) = lower(?1)",
      rusqlite::params![name],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);

  if name_taken {
    return Ok(Some(format!(
      "an established club already uses the name {name:?}"
    )));
  }

  if let Some(code) = code {
    let code_taken: bool = conn
      .query_row(
        "SELECT 1 FROM clubs WHERE code = ?1",
        rusqlite::params![code],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false);

    if code_taken {
      return Ok(Some(format!(
        "an established club already uses the code {code:?}"
      )));
    }
  }

  Ok(None)
}
