//! Actors — who is invoking a workflow action.
//!
//! Identity resolution (passwords, sessions, role membership) is an external
//! collaborator's job. The core receives a resolved [`Actor`]: a user id plus
//! whether the identity layer vouches for the STAFF role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id: Uuid,
  /// `true` iff the identity collaborator confirmed the STAFF role.
  pub staff:   bool,
}

impl Actor {
  pub fn student(user_id: Uuid) -> Self {
    Self { user_id, staff: false }
  }

  pub fn staff(user_id: Uuid) -> Self {
    Self { user_id, staff: true }
  }
}
