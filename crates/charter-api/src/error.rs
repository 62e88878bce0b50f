//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use charter_core::error::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Identity headers were missing or malformed.
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  /// The request itself could not be interpreted.
  #[error("bad request: {0}")]
  BadRequest(String),

  /// A domain refusal or fault, classified by [`ErrorKind`].
  #[error(transparent)]
  Core(charter_core::Error),
}

impl ApiError {
  /// Lift a store error into the API taxonomy via the core classification.
  pub fn from_store<E: Into<charter_core::Error>>(e: E) -> Self {
    Self::Core(e.into())
  }
}

fn kind_label(kind: ErrorKind) -> &'static str {
  match kind {
    ErrorKind::Validation => "validation",
    ErrorKind::InvalidState => "invalid_state",
    ErrorKind::Forbidden => "forbidden",
    ErrorKind::NotFound => "not_found",
    ErrorKind::Configuration => "configuration",
    ErrorKind::Internal => "internal",
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind, message) = match &self {
      ApiError::Unauthorized(m) => {
        (StatusCode::UNAUTHORIZED, "unauthorized", m.clone())
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, "bad_request", m.clone())
      }
      ApiError::Core(e) => {
        let status = match e.kind() {
          ErrorKind::Validation => StatusCode::BAD_REQUEST,
          ErrorKind::Forbidden => StatusCode::FORBIDDEN,
          ErrorKind::NotFound => StatusCode::NOT_FOUND,
          // A stale client raced a committed transition; the request moved on.
          ErrorKind::InvalidState => StatusCode::CONFLICT,
          ErrorKind::Configuration | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
          }
        };
        (status, kind_label(e.kind()), e.to_string())
      }
    };
    (status, Json(json!({ "error": message, "kind": kind }))).into_response()
  }
}
