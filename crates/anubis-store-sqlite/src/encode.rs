//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Verdicts are stored as their symbolic names (`YTA`, `NTA`, ...) and
//! timestamps as `REAL` epoch seconds.

use anubis_core::{Submission, Verdict};

use crate::Result;

// ─── Verdict ─────────────────────────────────────────────────────────────────

pub fn encode_verdict(verdict: Option<Verdict>) -> Option<&'static str> {
  verdict.map(Verdict::symbol)
}

pub fn decode_verdict(s: Option<&str>) -> Result<Option<Verdict>> {
  Ok(s.map(Verdict::from_symbol).transpose()?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that builds a [`SubmissionRow`].
pub const SUBMISSION_COLUMNS: &str =
  "submission_id, title, body, created_utc, verdict, local_verdict";

/// Raw values read directly from a `submissions` row.
pub struct SubmissionRow {
  pub submission_id: String,
  pub title:         String,
  pub body:          String,
  pub created_utc:   f64,
  pub verdict:       Option<String>,
  pub local_verdict: Option<String>,
}

impl SubmissionRow {
  /// Read a row selected with [`SUBMISSION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission_id: row.get(0)?,
      title:         row.get(1)?,
      body:          row.get(2)?,
      created_utc:   row.get(3)?,
      verdict:       row.get(4)?,
      local_verdict: row.get(5)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      submission_id: self.submission_id,
      title:         self.title,
      body:          self.body,
      created_utc:   self.created_utc,
      verdict:       decode_verdict(self.verdict.as_deref())?,
      local_verdict: decode_verdict(self.local_verdict.as_deref())?,
    })
  }
}
