//! SQLite backend for the Charter workflow store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The single connection also
//! serializes per-request mutation: of two racing transitions from the same
//! status, the second observes the committed status change and fails with
//! `InvalidState`.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
