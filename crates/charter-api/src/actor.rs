//! Caller identity extractor.
//!
//! The engine sits behind the campus gateway, which authenticates users and
//! forwards their identity in two trusted headers:
//!
//! - `x-user-id`: the caller's UUID
//! - `x-user-role`: `student` or `staff`

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use charter_core::actor::Actor;
use uuid::Uuid;

use crate::error::ApiError;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

/// Extractor wrapper: present in a handler signature means identity headers
/// were present and well-formed.
pub struct CallerIdentity(pub Actor);

/// Parse the identity headers directly — used by the extractor and tests.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
  let user_id = headers
    .get(USER_ID_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| {
      ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header"))
    })?;
  let user_id = Uuid::parse_str(user_id).map_err(|_| {
    ApiError::Unauthorized(format!("{USER_ID_HEADER} is not a valid UUID"))
  })?;

  let role = headers
    .get(USER_ROLE_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| {
      ApiError::Unauthorized(format!("missing {USER_ROLE_HEADER} header"))
    })?;

  match role {
    "student" => Ok(Actor::student(user_id)),
    "staff" => Ok(Actor::staff(user_id)),
    other => Err(ApiError::Unauthorized(format!(
      "unknown role {other:?}; expected student or staff"
    ))),
  }
}

impl<State> FromRequestParts<State> for CallerIdentity
where
  State: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &State,
  ) -> Result<Self, Self::Rejection> {
    actor_from_headers(&parts.headers).map(CallerIdentity)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(id: &str, role: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(USER_ID_HEADER, HeaderValue::from_str(id).unwrap());
    map.insert(USER_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
    map
  }

  #[test]
  fn student_headers_parse() {
    let id = Uuid::new_v4();
    let actor =
      actor_from_headers(&headers(&id.to_string(), "student")).unwrap();
    assert_eq!(actor.user_id, id);
    assert!(!actor.staff);
  }

  #[test]
  fn staff_headers_parse() {
    let id = Uuid::new_v4();
    let actor = actor_from_headers(&headers(&id.to_string(), "staff")).unwrap();
    assert!(actor.staff);
  }

  #[test]
  fn missing_id_is_unauthorized() {
    let mut map = HeaderMap::new();
    map.insert(USER_ROLE_HEADER, HeaderValue::from_static("student"));
    assert!(matches!(
      actor_from_headers(&map),
      Err(ApiError::Unauthorized(_))
    ));
  }

  #[test]
  fn malformed_id_is_unauthorized() {
    assert!(matches!(
      actor_from_headers(&headers("not-a-uuid", "student")),
      Err(ApiError::Unauthorized(_))
    ));
  }

  #[test]
  fn unknown_role_is_unauthorized() {
    let id = Uuid::new_v4().to_string();
    assert!(matches!(
      actor_from_headers(&headers(&id, "dean")),
      Err(ApiError::Unauthorized(_))
    ));
  }
}
