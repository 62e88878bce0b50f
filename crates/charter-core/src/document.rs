//! Versioned sub-documents — the proposal and final-form paperwork a student
//! submits during the workflow.
//!
//! Versions are immutable once created; resubmission always appends a new
//! version, never edits an old one. "Latest" is the version with the
//! greatest creation timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

/// The two document types tracked per request.
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
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
  Proposal,
  FinalForm,
}

/// One immutable version of a proposal or final form. The binary itself
/// lives with the storage collaborator; only the reference URL is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersion {
  pub document_id:  Uuid,
  pub request_id:   Uuid,
  pub kind:         DocumentKind,
  /// Per-(request, kind) sequence number, starting at 1.
  pub seq:          u32,
  pub title:        String,
  pub document_url: String,
  pub created_at:   DateTime<Utc>,
}

// ─── Reference validation ────────────────────────────────────────────────────

/// File extensions accepted for submitted paperwork — the fixed set of
/// office, PDF, and archive formats.
pub const ALLOWED_DOCUMENT_EXTENSIONS: &[&str] = &[
  "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "hwp", "hwpx", "zip",
  "7z",
];

/// Validate a document reference URL before any version is written.
pub fn validate_document_ref(url: &str) -> Result<()> {
  let url = url.trim();
  if url.is_empty() {
    return Err(Error::Validation(
      "a document reference URL is required".into(),
    ));
  }

  // Extension of the final path segment, ignoring query string and fragment.
  let path = url
    .split_once(['?', '#'])
    .map_or(url, |(path, _)| path);
  let file_name = path.rsplit('/').next().unwrap_or(path);
  let extension = file_name
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase());

  match extension {
    Some(ext) if ALLOWED_DOCUMENT_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
    Some(ext) => Err(Error::Validation(format!(
      "document type {ext:?} is not accepted; allowed: {}",
      ALLOWED_DOCUMENT_EXTENSIONS.join(", ")
    ))),
    None => Err(Error::Validation(
      "the document reference has no file extension".into(),
    )),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_office_and_archive_formats() {
    for url in [
      "https://files.example.edu/proposal.pdf",
      "https://files.example.edu/budget.XLSX",
      "https://files.example.edu/forms.zip?version=2",
      "https://files.example.edu/plan.hwp#page=3",
    ] {
      assert!(validate_document_ref(url).is_ok(), "{url}");
    }
  }

  #[test]
  fn rejects_unknown_extensions_and_bare_urls() {
    assert!(validate_document_ref("https://x.example/run.exe").is_err());
    assert!(validate_document_ref("https://x.example/no-extension").is_err());
    assert!(validate_document_ref("   ").is_err());
  }
}
