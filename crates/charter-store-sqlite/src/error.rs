//! Error type for `charter-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] charter_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored value could not be decoded back into its domain type.
  #[error("stored value parse error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    Self::Database(e.into())
  }
}

// Transport layers map errors by the core taxonomy; anything below the
// domain (database, decode) surfaces as a storage fault.
impl From<Error> for charter_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => charter_core::Error::Storage(other.to_string()),
    }
  }
}
