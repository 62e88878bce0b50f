//! The request lifecycle status set.
//!
//! Statuses only ever move along the edges of the transition table in
//! [`crate::transition`]; nothing in this crate mutates a status directly.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The lifecycle status of a club-establishment request.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
  Draft,
  Submitted,
  ContactConfirmationPending,
  ContactConfirmed,
  ContactRejected,
  NameRevisionRequired,
  ProposalRequired,
  ProposalSubmitted,
  ProposalRejected,
  ProposalApproved,
  DefenseScheduleProposed,
  DefenseScheduleApproved,
  DefenseScheduleRejected,
  DefenseCompleted,
  FinalFormSubmitted,
  Approved,
  Rejected,
}

impl RequestStatus {
  /// Terminal statuses admit no further transitions.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::ContactRejected | Self::Approved | Self::Rejected)
  }
}
