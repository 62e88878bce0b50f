//! The workflow state machine.
//!
//! The legal transition set is plain data ([`TRANSITIONS`]) so one test can
//! assert the whole table, and [`plan`] is a pure function over the request,
//! its schedule, the actor, and the clock. Stores run the planner inside
//! their own transaction and apply the returned [`Effect`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};
use uuid::Uuid;

use crate::{
  actor::Actor,
  defense::{DefenseResult, DefenseSchedule, DefenseSlot},
  document::{self, DocumentKind},
  event::Audience,
  request::CharterRequest,
  status::RequestStatus,
  Error, Result,
};

/// How long a reviewer has to confirm contact after receiving a request.
pub const CONTACT_CONFIRMATION_WINDOW_DAYS: i64 = 5;

// ─── Actions ─────────────────────────────────────────────────────────────────

/// A workflow action with its payload, as invoked by an external actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkflowAction {
  Submit,
  Receive,
  ConfirmContact,
  RejectContact,
  RequestNameRevision,
  SubmitNameRevision {
    name: String,
    code: Option<String>,
  },
  RequestProposal,
  SubmitProposal {
    title:        String,
    document_url: String,
  },
  ApproveProposal,
  RejectProposal,
  ProposeDefenseSchedule {
    slot: DefenseSlot,
  },
  UpdateDefenseSchedule {
    slot: DefenseSlot,
  },
  ApproveDefenseSchedule,
  RejectDefenseSchedule,
  CompleteDefense {
    result:   DefenseResult,
    feedback: Option<String>,
  },
  SubmitFinalForm {
    title:        String,
    document_url: String,
  },
  ApproveFinalForm,
}

impl WorkflowAction {
  pub fn kind(&self) -> ActionKind {
    match self {
      Self::Submit => ActionKind::Submit,
      Self::Receive => ActionKind::Receive,
      Self::ConfirmContact => ActionKind::ConfirmContact,
      Self::RejectContact => ActionKind::RejectContact,
      Self::RequestNameRevision => ActionKind::RequestNameRevision,
      Self::SubmitNameRevision { .. } => ActionKind::SubmitNameRevision,
      Self::RequestProposal => ActionKind::RequestProposal,
      Self::SubmitProposal { .. } => ActionKind::SubmitProposal,
      Self::ApproveProposal => ActionKind::ApproveProposal,
      Self::RejectProposal => ActionKind::RejectProposal,
      Self::ProposeDefenseSchedule { .. } => ActionKind::ProposeDefenseSchedule,
      Self::UpdateDefenseSchedule { .. } => ActionKind::UpdateDefenseSchedule,
      Self::ApproveDefenseSchedule => ActionKind::ApproveDefenseSchedule,
      Self::RejectDefenseSchedule => ActionKind::RejectDefenseSchedule,
      Self::CompleteDefense { .. } => ActionKind::CompleteDefense,
      Self::SubmitFinalForm { .. } => ActionKind::SubmitFinalForm,
      Self::ApproveFinalForm => ActionKind::ApproveFinalForm,
    }
  }
}

/// Field-less mirror of [`WorkflowAction`], usable as a table key.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumIter,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
  Submit,
  Receive,
  ConfirmContact,
  RejectContact,
  RequestNameRevision,
  SubmitNameRevision,
  RequestProposal,
  SubmitProposal,
  ApproveProposal,
  RejectProposal,
  ProposeDefenseSchedule,
  UpdateDefenseSchedule,
  ApproveDefenseSchedule,
  RejectDefenseSchedule,
  CompleteDefense,
  SubmitFinalForm,
  ApproveFinalForm,
}

impl ActionKind {
  /// The short code recorded in the audit log for this action.
  pub fn audit_code(self) -> &'static str {
    match self {
      Self::Submit => "REQUEST_SUBMITTED",
      Self::Receive => "REQUEST_RECEIVED",
      Self::ConfirmContact => "CONTACT_CONFIRMED",
      Self::RejectContact => "CONTACT_REJECTED",
      Self::RequestNameRevision => "NAME_REVISION_REQUESTED",
      Self::SubmitNameRevision => "NAME_REVISION_SUBMITTED",
      Self::RequestProposal => "PROPOSAL_REQUESTED",
      Self::SubmitProposal => "PROPOSAL_SUBMITTED",
      Self::ApproveProposal => "PROPOSAL_APPROVED",
      Self::RejectProposal => "PROPOSAL_REJECTED",
      Self::ProposeDefenseSchedule => "DEFENSE_SCHEDULE_PROPOSED",
      Self::UpdateDefenseSchedule => "DEFENSE_SCHEDULE_UPDATED",
      Self::ApproveDefenseSchedule => "DEFENSE_SCHEDULE_APPROVED",
      Self::RejectDefenseSchedule => "DEFENSE_SCHEDULE_REJECTED",
      Self::CompleteDefense => "DEFENSE_COMPLETED",
      Self::SubmitFinalForm => "FINAL_FORM_SUBMITTED",
      Self::ApproveFinalForm => "REQUEST_APPROVED",
    }
  }
}

// ─── The table ───────────────────────────────────────────────────────────────

/// Which actor a transition demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredActor {
  /// The student who created the request.
  Owner,
  /// The staff member bound to the request by `receive`.
  AssignedReviewer,
  /// Any staff member — but if a reviewer is already assigned, only them.
  AnyStaff,
}

/// One row of the legal-transition table.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
  pub action: ActionKind,
  pub from:   &'static [RequestStatus],
  /// Nominal target; `CompleteDefense` diverts to `Rejected` on a failed
  /// defense.
  pub to:     RequestStatus,
  pub by:     RequiredActor,
}

use RequestStatus as S;

/// The full legal-transition set. Any action/state pair not listed here
/// fails with [`Error::InvalidState`].
pub const TRANSITIONS: &[TransitionRule] = &[
  TransitionRule {
    action: ActionKind::Submit,
    from:   &[S::Draft],
    to:     S::Submitted,
    by:     RequiredActor::Owner,
  },
  TransitionRule {
    action: ActionKind::Receive,
    from:   &[S::Submitted],
    to:     S::ContactConfirmationPending,
    by:     RequiredActor::AnyStaff,
  },
  TransitionRule {
    action: ActionKind::ConfirmContact,
    from:   &[S::ContactConfirmationPending],
    to:     S::ContactConfirmed,
    by:     RequiredActor::AssignedReviewer,
  },
  TransitionRule {
    action: ActionKind::RejectContact,
    from:   &[S::ContactConfirmationPending],
    to:     S::ContactRejected,
    by:     RequiredActor::AssignedReviewer,
  },
  TransitionRule {
    action: ActionKind::RequestNameRevision,
    from:   &[S::ContactConfirmed],
    to:     S::NameRevisionRequired,
    by:     RequiredActor::AssignedReviewer,
  },
  TransitionRule {
    action: ActionKind::SubmitNameRevision,
    from:   &[S::NameRevisionRequired],
    to:     S::ContactConfirmed,
    by:     RequiredActor::Owner,
  },
  TransitionRule {
    action: ActionKind::RequestProposal,
    from:   &[S::ContactConfirmed],
    to:     S::ProposalRequired,
    by:     RequiredActor::AssignedReviewer,
  },
  TransitionRule {
    action: ActionKind::SubmitProposal,
    from:   &[S::ProposalRequired, S::ProposalRejected, S::ProposalSubmitted],
    to:     S::ProposalSubmitted,
    by:     RequiredActor::Owner,
  },
  TransitionRule {
    action: ActionKind::ApproveProposal,
    from:   &[S::ProposalSubmitted],
    to:     S::ProposalApproved,
    by:     RequiredActor::AssignedReviewer,
  },
  TransitionRule {
    action: ActionKind::RejectProposal,
    from:   &[S::ProposalSubmitted],
    to:     S::ProposalRejected,
    by:     RequiredActor::AssignedReviewer,
  },
  TransitionRule {
    action: ActionKind::ProposeDefenseSchedule,
    from:   &[S::ProposalApproved, S::DefenseScheduleRejected],
    to:     S::DefenseScheduleProposed,
    by:     RequiredActor::Owner,
  },
  TransitionRule {
    action: ActionKind::UpdateDefenseSchedule,
    from:   &[S::DefenseScheduleProposed, S::DefenseScheduleRejected],
    to:     S::DefenseScheduleProposed,
    by:     RequiredActor::Owner,
  },
  TransitionRule {
    action: ActionKind::ApproveDefenseSchedule,
    from:   &[S::DefenseScheduleProposed],
    to:     S::DefenseScheduleApproved,
    by:     RequiredActor::AssignedReviewer,
  },
  TransitionRule {
    action: ActionKind::RejectDefenseSchedule,
    from:   &[S::DefenseScheduleProposed],
    to:     S::DefenseScheduleRejected,
    by:     RequiredActor::AssignedReviewer,
  },
  TransitionRule {
    action: ActionKind::CompleteDefense,
    from:   &[S::DefenseScheduleApproved],
    to:     S::DefenseCompleted,
    by:     RequiredActor::AssignedReviewer,
  },
  TransitionRule {
    action: ActionKind::SubmitFinalForm,
    from:   &[S::DefenseCompleted, S::FinalFormSubmitted],
    to:     S::FinalFormSubmitted,
    by:     RequiredActor::Owner,
  },
  TransitionRule {
    action: ActionKind::ApproveFinalForm,
    from:   &[S::FinalFormSubmitted],
    to:     S::Approved,
    by:     RequiredActor::AssignedReviewer,
  },
];

/// Look up the table row for `action`. Every [`ActionKind`] has exactly one
/// row (asserted by a test below).
pub fn rule(action: ActionKind) -> &'static TransitionRule {
  TRANSITIONS
    .iter()
    .find(|r| r.action == action)
    .expect("every ActionKind has a table row")
}

// ─── Planning ────────────────────────────────────────────────────────────────

/// The side effect a store must apply alongside the status change.
#[derive(Debug, Clone)]
pub enum Effect {
  None,
  /// Bind the reviewer and start the contact-confirmation window.
  Receive {
    reviewer:              Uuid,
    received_at:           DateTime<Utc>,
    confirmation_deadline: DateTime<Utc>,
  },
  ConfirmContact {
    confirmed_at: DateTime<Utc>,
  },
  /// Apply the revised club name (and optionally code), re-checking
  /// uniqueness against established clubs.
  Rename {
    name: String,
    code: Option<String>,
  },
  /// Append a new immutable document version.
  AddDocument {
    kind:         DocumentKind,
    title:        String,
    document_url: String,
  },
  /// Create the schedule, or overwrite its mutable fields, and reset the
  /// result to `Proposed`.
  ProposeSchedule {
    slot: DefenseSlot,
  },
  /// Lock the schedule (`result = Confirmed`).
  ConfirmSchedule,
  /// Clear the result so the slot can be revised.
  ClearScheduleResult,
  RecordDefenseOutcome {
    result:   DefenseResult,
    feedback: Option<String>,
  },
  /// Create the club, its six default roles, the founder membership, and
  /// the president assignment — all inside the same transaction.
  ProvisionClub,
}

/// A validated transition, ready for a store to apply atomically.
#[derive(Debug, Clone)]
pub struct TransitionPlan {
  pub kind:      ActionKind,
  pub from:      RequestStatus,
  pub to:        RequestStatus,
  pub effect:    Effect,
  /// Who to notify once the transition commits.
  pub audiences: Vec<Audience>,
}

/// Validate `action` against the request's current state and compute the
/// transition to apply.
///
/// Checks run in the order the caller perceives them: actor authorization,
/// then state legality, then action-specific guards. No mutation happens
/// here; the store applies the returned plan inside its transaction.
pub fn plan(
  request:  &CharterRequest,
  schedule: Option<&DefenseSchedule>,
  actor:    Actor,
  now:      DateTime<Utc>,
  action:   &WorkflowAction,
) -> Result<TransitionPlan> {
  let kind = action.kind();
  let rule = rule(kind);

  check_actor(request, actor, rule.by, kind)?;

  if !rule.from.contains(&request.status) {
    return Err(Error::InvalidState {
      action:  kind.into(),
      current: request.status,
      allowed: rule.from.to_vec(),
    });
  }

  let (to, effect, audiences) = match action {
    WorkflowAction::Submit => {
      request.validate_for_submission()?;
      (rule.to, Effect::None, vec![Audience::AllStaff])
    }

    WorkflowAction::Receive => {
      let deadline = now + Duration::days(CONTACT_CONFIRMATION_WINDOW_DAYS);
      (
        rule.to,
        Effect::Receive {
          reviewer:              actor.user_id,
          received_at:           now,
          confirmation_deadline: deadline,
        },
        vec![Audience::Owner],
      )
    }

    WorkflowAction::ConfirmContact => {
      match request.confirmation_deadline {
        Some(deadline) if now <= deadline => {}
        Some(deadline) => {
          return Err(Error::Validation(format!(
            "the contact-confirmation deadline ({deadline}) has passed"
          )));
        }
        None => {
          return Err(Error::Configuration(
            "request is awaiting contact confirmation but has no deadline"
              .into(),
          ));
        }
      }
      (
        rule.to,
        Effect::ConfirmContact { confirmed_at: now },
        vec![Audience::Owner],
      )
    }

    WorkflowAction::RejectContact => {
      (rule.to, Effect::None, vec![Audience::Owner])
    }

    WorkflowAction::RequestNameRevision => {
      (rule.to, Effect::None, vec![Audience::Owner])
    }

    WorkflowAction::SubmitNameRevision { name, code } => {
      if name.trim().is_empty() {
        return Err(Error::Validation(
          "the revised club name must not be empty".into(),
        ));
      }
      (
        rule.to,
        Effect::Rename {
          name: name.clone(),
          code: code.clone(),
        },
        vec![Audience::AssignedReviewer],
      )
    }

    WorkflowAction::RequestProposal => {
      (rule.to, Effect::None, vec![Audience::Owner])
    }

    WorkflowAction::SubmitProposal {
      title,
      document_url,
    } => (
      rule.to,
      document_effect(DocumentKind::Proposal, title, document_url)?,
      vec![Audience::AssignedReviewer],
    ),

    WorkflowAction::ApproveProposal | WorkflowAction::RejectProposal => {
      (rule.to, Effect::None, vec![Audience::Owner])
    }

    WorkflowAction::ProposeDefenseSchedule { slot } => {
      slot.validate()?;
      (
        rule.to,
        Effect::ProposeSchedule { slot: slot.clone() },
        vec![Audience::AssignedReviewer],
      )
    }

    WorkflowAction::UpdateDefenseSchedule { slot } => {
      slot.validate()?;
      match schedule {
        None => return Err(Error::ScheduleNotFound(request.request_id)),
        Some(existing) if existing.is_locked() => {
          return Err(Error::Validation(
            "the defense schedule is confirmed and locked; it must be \
             rejected before it can be revised"
              .into(),
          ));
        }
        Some(_) => {}
      }
      (
        rule.to,
        Effect::ProposeSchedule { slot: slot.clone() },
        vec![Audience::AssignedReviewer],
      )
    }

    WorkflowAction::ApproveDefenseSchedule => {
      if schedule.is_none() {
        return Err(Error::ScheduleNotFound(request.request_id));
      }
      (rule.to, Effect::ConfirmSchedule, vec![Audience::Owner])
    }

    WorkflowAction::RejectDefenseSchedule => {
      if schedule.is_none() {
        return Err(Error::ScheduleNotFound(request.request_id));
      }
      (rule.to, Effect::ClearScheduleResult, vec![Audience::Owner])
    }

    WorkflowAction::CompleteDefense { result, feedback } => {
      if !result.is_outcome() {
        return Err(Error::Validation(format!(
          "defense outcome must be passed or failed, not {result}"
        )));
      }
      let existing = schedule
        .ok_or(Error::ScheduleNotFound(request.request_id))?;
      if now < existing.starts_at {
        return Err(Error::Validation(format!(
          "the defense has not started yet (scheduled for {})",
          existing.starts_at
        )));
      }
      let to = if *result == DefenseResult::Passed {
        RequestStatus::DefenseCompleted
      } else {
        RequestStatus::Rejected
      };
      (
        to,
        Effect::RecordDefenseOutcome {
          result:   *result,
          feedback: feedback.clone(),
        },
        vec![Audience::Owner],
      )
    }

    WorkflowAction::SubmitFinalForm {
      title,
      document_url,
    } => (
      rule.to,
      document_effect(DocumentKind::FinalForm, title, document_url)?,
      vec![Audience::AssignedReviewer],
    ),

    WorkflowAction::ApproveFinalForm => {
      (rule.to, Effect::ProvisionClub, vec![Audience::Owner])
    }
  };

  Ok(TransitionPlan {
    kind,
    from: request.status,
    to,
    effect,
    audiences,
  })
}

fn check_actor(
  request: &CharterRequest,
  actor: Actor,
  required: RequiredActor,
  kind: ActionKind,
) -> Result<()> {
  match required {
    RequiredActor::Owner => {
      if !request.is_owner(actor) {
        return Err(Error::Forbidden(format!(
          "only the request owner may {kind}"
        )));
      }
    }
    RequiredActor::AssignedReviewer => {
      if !actor.staff {
        return Err(Error::Forbidden(format!("{kind} requires the STAFF role")));
      }
      if !request.is_assigned_reviewer(actor) {
        return Err(Error::Forbidden(match request.assigned_reviewer {
          Some(_) => "another reviewer is assigned to this request".into(),
          None => "no reviewer has received this request yet".into(),
        }));
      }
    }
    RequiredActor::AnyStaff => {
      if !actor.staff {
        return Err(Error::Forbidden(format!("{kind} requires the STAFF role")));
      }
      // Single-reviewer affinity: a receive-pending request already picked
      // up by someone else cannot be claimed.
      if request.assigned_reviewer.is_some()
        && !request.is_assigned_reviewer(actor)
      {
        return Err(Error::Forbidden(
          "this request was already picked up by another reviewer".into(),
        ));
      }
    }
  }
  Ok(())
}

fn document_effect(
  kind: DocumentKind,
  title: &str,
  document_url: &str,
) -> Result<Effect> {
  if title.trim().is_empty() {
    return Err(Error::Validation("a document title is required".into()));
  }
  document::validate_document_ref(document_url)?;
  Ok(Effect::AddDocument {
    kind,
    title: title.to_owned(),
    document_url: document_url.to_owned(),
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use strum::IntoEnumIterator;

  use super::*;
  use crate::error::ErrorKind;

  fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
  }

  fn owner() -> Actor {
    Actor::student(Uuid::from_u128(1))
  }

  fn reviewer() -> Actor {
    Actor::staff(Uuid::from_u128(2))
  }

  fn request(status: RequestStatus) -> CharterRequest {
    CharterRequest {
      request_id:            Uuid::from_u128(10),
      name:                  Some("Chess Club".into()),
      category:              Some("Sports".into()),
      code:                  None,
      expected_members:      Some(20),
      objectives:            None,
      contact_channels:      None,
      status,
      created_by:            owner().user_id,
      assigned_reviewer:     Some(reviewer().user_id),
      created_at:            t0(),
      received_at:           Some(t0()),
      confirmation_deadline: Some(t0() + Duration::days(5)),
      confirmed_at:          None,
      decided_at:            None,
    }
  }

  fn schedule(result: Option<DefenseResult>) -> DefenseSchedule {
    DefenseSchedule {
      request_id:   Uuid::from_u128(10),
      starts_at:    t0() + Duration::days(10),
      ends_at:      t0() + Duration::days(10) + Duration::hours(1),
      location:     "Room 1".into(),
      meeting_link: None,
      notes:        None,
      result,
      feedback:     None,
      updated_at:   t0(),
    }
  }

  // ── The table itself ──────────────────────────────────────────────────────

  #[test]
  fn every_action_has_exactly_one_rule() {
    for kind in ActionKind::iter() {
      let rows = TRANSITIONS.iter().filter(|r| r.action == kind).count();
      assert_eq!(rows, 1, "{kind} must have exactly one table row");
    }
    assert_eq!(TRANSITIONS.len(), 17);
  }

  #[test]
  fn no_transition_leaves_a_terminal_status() {
    for rule in TRANSITIONS {
      for from in rule.from {
        assert!(
          !from.is_terminal(),
          "{} must not be actionable from terminal {from}",
          rule.action
        );
      }
    }
  }

  #[test]
  fn table_matches_the_designed_graph() {
    let expect = |kind: ActionKind,
                  from: &[RequestStatus],
                  to: RequestStatus| {
      let rule = rule(kind);
      assert_eq!(rule.from, from, "{kind} from-set");
      assert_eq!(rule.to, to, "{kind} target");
    };

    expect(ActionKind::Submit, &[S::Draft], S::Submitted);
    expect(ActionKind::Receive, &[S::Submitted], S::ContactConfirmationPending);
    expect(
      ActionKind::ConfirmContact,
      &[S::ContactConfirmationPending],
      S::ContactConfirmed,
    );
    expect(
      ActionKind::RejectContact,
      &[S::ContactConfirmationPending],
      S::ContactRejected,
    );
    expect(
      ActionKind::SubmitProposal,
      &[S::ProposalRequired, S::ProposalRejected, S::ProposalSubmitted],
      S::ProposalSubmitted,
    );
    expect(
      ActionKind::ProposeDefenseSchedule,
      &[S::ProposalApproved, S::DefenseScheduleRejected],
      S::DefenseScheduleProposed,
    );
    expect(
      ActionKind::SubmitFinalForm,
      &[S::DefenseCompleted, S::FinalFormSubmitted],
      S::FinalFormSubmitted,
    );
    expect(ActionKind::ApproveFinalForm, &[S::FinalFormSubmitted], S::Approved);
  }

  // ── Actor checks ──────────────────────────────────────────────────────────

  #[test]
  fn owner_actions_reject_other_users() {
    let request = request(RequestStatus::Draft);
    let stranger = Actor::student(Uuid::from_u128(99));
    let err = plan(&request, None, stranger, t0(), &WorkflowAction::Submit)
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
  }

  #[test]
  fn reviewer_actions_reject_unassigned_staff() {
    let request = request(RequestStatus::ContactConfirmationPending);
    let other_staff = Actor::staff(Uuid::from_u128(77));
    let err = plan(
      &request,
      None,
      other_staff,
      t0(),
      &WorkflowAction::ConfirmContact,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
  }

  #[test]
  fn reviewer_actions_reject_non_staff() {
    let request = request(RequestStatus::ContactConfirmationPending);
    let err = plan(&request, None, owner(), t0(), &WorkflowAction::ConfirmContact)
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
  }

  #[test]
  fn receive_rejects_staff_when_another_reviewer_holds_the_request() {
    let mut request = request(RequestStatus::Submitted);
    request.assigned_reviewer = Some(Uuid::from_u128(2));
    let other_staff = Actor::staff(Uuid::from_u128(3));
    let err = plan(&request, None, other_staff, t0(), &WorkflowAction::Receive)
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
  }

  #[test]
  fn receive_auto_assigns_the_receiving_reviewer() {
    let mut request = request(RequestStatus::Submitted);
    request.assigned_reviewer = None;
    let plan =
      plan(&request, None, reviewer(), t0(), &WorkflowAction::Receive).unwrap();
    match plan.effect {
      Effect::Receive {
        reviewer: r,
        confirmation_deadline,
        ..
      } => {
        assert_eq!(r, reviewer().user_id);
        assert_eq!(confirmation_deadline, t0() + Duration::days(5));
      }
      other => panic!("unexpected effect: {other:?}"),
    }
  }

  // ── State checks ──────────────────────────────────────────────────────────

  #[test]
  fn illegal_state_names_current_and_allowed() {
    let request = request(RequestStatus::Draft);
    let err = plan(
      &request,
      None,
      reviewer(),
      t0(),
      &WorkflowAction::ApproveFinalForm,
    )
    .unwrap_err();
    match err {
      Error::InvalidState { current, allowed, .. } => {
        assert_eq!(current, RequestStatus::Draft);
        assert_eq!(allowed, vec![RequestStatus::FinalFormSubmitted]);
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn terminal_statuses_admit_nothing() {
    for status in [
      RequestStatus::ContactRejected,
      RequestStatus::Approved,
      RequestStatus::Rejected,
    ] {
      let request = request(status);
      let err = plan(
        &request,
        None,
        reviewer(),
        t0(),
        &WorkflowAction::ApproveFinalForm,
      )
      .unwrap_err();
      assert_eq!(err.kind(), ErrorKind::InvalidState, "from {status}");
    }
  }

  // ── Guards ────────────────────────────────────────────────────────────────

  #[test]
  fn submit_revalidates_required_fields() {
    let mut request = request(RequestStatus::Draft);
    request.expected_members = None;
    let err =
      plan(&request, None, owner(), t0(), &WorkflowAction::Submit).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn confirm_contact_rejects_after_deadline() {
    let request = request(RequestStatus::ContactConfirmationPending);
    let late = t0() + Duration::days(6);
    let err = plan(&request, None, reviewer(), late, &WorkflowAction::ConfirmContact)
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn confirm_contact_succeeds_before_deadline() {
    let request = request(RequestStatus::ContactConfirmationPending);
    let plan = plan(
      &request,
      None,
      reviewer(),
      t0() + Duration::days(4),
      &WorkflowAction::ConfirmContact,
    )
    .unwrap();
    assert_eq!(plan.to, RequestStatus::ContactConfirmed);
  }

  #[test]
  fn update_rejects_a_confirmed_schedule() {
    let request = request(RequestStatus::DefenseScheduleProposed);
    let locked = schedule(Some(DefenseResult::Confirmed));
    let slot = DefenseSlot {
      starts_at:    t0() + Duration::days(12),
      ends_at:      t0() + Duration::days(12) + Duration::hours(1),
      location:     "Room 2".into(),
      meeting_link: None,
      notes:        None,
    };
    let err = plan(
      &request,
      Some(&locked),
      owner(),
      t0(),
      &WorkflowAction::UpdateDefenseSchedule { slot },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn update_succeeds_after_rejection_cleared_the_lock() {
    let request = request(RequestStatus::DefenseScheduleRejected);
    let unlocked = schedule(None);
    let slot = DefenseSlot {
      starts_at:    t0() + Duration::days(12),
      ends_at:      t0() + Duration::days(12) + Duration::hours(1),
      location:     "Room 2".into(),
      meeting_link: None,
      notes:        None,
    };
    let plan = plan(
      &request,
      Some(&unlocked),
      owner(),
      t0(),
      &WorkflowAction::UpdateDefenseSchedule { slot },
    )
    .unwrap();
    assert_eq!(plan.to, RequestStatus::DefenseScheduleProposed);
  }

  #[test]
  fn propose_rejects_inverted_slot() {
    let request = request(RequestStatus::ProposalApproved);
    let slot = DefenseSlot {
      starts_at:    t0() + Duration::hours(2),
      ends_at:      t0() + Duration::hours(1),
      location:     "Room 1".into(),
      meeting_link: None,
      notes:        None,
    };
    let err = plan(
      &request,
      None,
      owner(),
      t0(),
      &WorkflowAction::ProposeDefenseSchedule { slot },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn complete_defense_rejects_before_start_time() {
    let request = request(RequestStatus::DefenseScheduleApproved);
    let confirmed = schedule(Some(DefenseResult::Confirmed));
    let err = plan(
      &request,
      Some(&confirmed),
      reviewer(),
      t0(), // schedule starts at t0 + 10 days
      &WorkflowAction::CompleteDefense {
        result:   DefenseResult::Passed,
        feedback: None,
      },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn complete_defense_rejects_non_outcome_results() {
    let request = request(RequestStatus::DefenseScheduleApproved);
    let confirmed = schedule(Some(DefenseResult::Confirmed));
    for result in [DefenseResult::Proposed, DefenseResult::Confirmed] {
      let err = plan(
        &request,
        Some(&confirmed),
        reviewer(),
        t0() + Duration::days(11),
        &WorkflowAction::CompleteDefense { result, feedback: None },
      )
      .unwrap_err();
      assert_eq!(err.kind(), ErrorKind::Validation);
    }
  }

  #[test]
  fn failed_defense_diverts_to_rejected() {
    let request = request(RequestStatus::DefenseScheduleApproved);
    let confirmed = schedule(Some(DefenseResult::Confirmed));
    let plan = plan(
      &request,
      Some(&confirmed),
      reviewer(),
      t0() + Duration::days(11),
      &WorkflowAction::CompleteDefense {
        result:   DefenseResult::Failed,
        feedback: Some("insufficient membership plan".into()),
      },
    )
    .unwrap();
    assert_eq!(plan.to, RequestStatus::Rejected);
  }

  #[test]
  fn submit_proposal_rejects_bad_document_refs() {
    let request = request(RequestStatus::ProposalRequired);
    let err = plan(
      &request,
      None,
      owner(),
      t0(),
      &WorkflowAction::SubmitProposal {
        title:        "Proposal v1".into(),
        document_url: "https://files.example.edu/malware.exe".into(),
      },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }
}
