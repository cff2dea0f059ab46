//! Raw submission shapes, exactly as the two sources deliver them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Live API ────────────────────────────────────────────────────────────────

/// The `data` object of a `t3` thing returned by the Reddit API.
///
/// Only the fields Anubis reads are kept; everything else is ignored on
/// deserialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSubmission {
  pub id:              String,
  #[serde(default)]
  pub title:           String,
  #[serde(default)]
  pub selftext:        String,
  pub created_utc:     f64,
  #[serde(default)]
  pub link_flair_text: Option<String>,
  /// Fullname of the subreddit, e.g. `t5_2xhvq`.
  #[serde(default)]
  pub subreddit_id:    String,
  /// Display name of the subreddit.
  #[serde(default)]
  pub subreddit:       String,
}

// ─── Archive dumps ───────────────────────────────────────────────────────────

/// One line of a line-delimited JSON archive dump.
///
/// Archive dumps were written by many different tools over the years, so the
/// record is kept as a loose key-value map and every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveRecord(pub Map<String, Value>);

impl ArchiveRecord {
  /// Look up a string field; non-string values are treated as absent.
  pub fn str_field(&self, key: &str) -> Option<&str> {
    self.0.get(key).and_then(Value::as_str)
  }

  pub fn id(&self) -> Option<&str> { self.str_field("id") }

  pub fn subreddit(&self) -> Option<&str> { self.str_field("subreddit") }

  pub fn link_flair_text(&self) -> Option<&str> {
    self.str_field("link_flair_text")
  }

  /// The raw `created_utc` value; dumps carry it as a number or a string.
  pub fn created_utc(&self) -> Option<&Value> {
    self.0.get("created_utc").filter(|v| !v.is_null())
  }
}

impl From<Map<String, Value>> for ArchiveRecord {
  fn from(map: Map<String, Value>) -> Self { Self(map) }
}

// ─── Either shape ────────────────────────────────────────────────────────────

/// Which adapter a raw record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
  Live,
  Archive,
}

/// A raw record from either adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSubmission {
  Live(LiveSubmission),
  Archive(ArchiveRecord),
}

impl RawSubmission {
  pub fn kind(&self) -> SourceKind {
    match self {
      Self::Live(_) => SourceKind::Live,
      Self::Archive(_) => SourceKind::Archive,
    }
  }

  pub fn link_flair_text(&self) -> Option<&str> {
    match self {
      Self::Live(live) => live.link_flair_text.as_deref(),
      Self::Archive(record) => record.link_flair_text(),
    }
  }
}

impl From<LiveSubmission> for RawSubmission {
  fn from(live: LiveSubmission) -> Self { Self::Live(live) }
}

impl From<ArchiveRecord> for RawSubmission {
  fn from(record: ArchiveRecord) -> Self { Self::Archive(record) }
}
