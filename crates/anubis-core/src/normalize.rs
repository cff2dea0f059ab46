//! Turning raw records into [`Submission`]s.
//!
//! Callers run [`is_relevant`] first and only pass records that belong to the
//! target community and are not meta posts to [`normalize`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  Error, Result,
  raw::{ArchiveRecord, LiveSubmission, RawSubmission},
  submission::Submission,
  verdict::{is_meta_flair, map_verdict},
};

/// The subreddit Anubis follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Community {
  /// Subreddit fullname (`t5_…`), compared against live records.
  pub id:   String,
  /// Display name, compared against archive records.
  pub name: String,
}

impl Default for Community {
  fn default() -> Self {
    Self { id: "t5_2xhvq".into(), name: "AmItheAsshole".into() }
  }
}

/// Whether a raw record belongs to `community` and is worth ingesting.
///
/// Live records are matched on the subreddit id. Archive dumps do not always
/// carry the id, so they are matched on the subreddit name, ignoring case.
pub fn is_relevant(raw: &RawSubmission, community: &Community) -> bool {
  let in_community = match raw {
    RawSubmission::Live(live) => live.subreddit_id == community.id,
    RawSubmission::Archive(record) => record
      .subreddit()
      .is_some_and(|name| name.eq_ignore_ascii_case(&community.name)),
  };

  in_community && !is_meta_flair(raw.link_flair_text())
}

/// Build the canonical [`Submission`] for a raw record.
pub fn normalize(raw: &RawSubmission) -> Result<Submission> {
  match raw {
    RawSubmission::Live(live) => Ok(normalize_live(live)),
    RawSubmission::Archive(record) => normalize_archive(record),
  }
}

fn normalize_live(live: &LiveSubmission) -> Submission {
  Submission {
    submission_id: live.id.clone(),
    title:         live.title.clone(),
    body:          live.selftext.clone(),
    created_utc:   live.created_utc,
    verdict:       map_verdict(live.link_flair_text.as_deref()),
    local_verdict: None,
  }
}

fn normalize_archive(record: &ArchiveRecord) -> Result<Submission> {
  let submission_id = record
    .id()
    .filter(|id| !id.is_empty())
    .ok_or(Error::MissingField("id"))?;

  let created_utc = record
    .created_utc()
    .ok_or(Error::MissingField("created_utc"))
    .and_then(epoch_seconds)?;

  Ok(Submission {
    submission_id: submission_id.to_owned(),
    title:         record.str_field("title").unwrap_or_default().to_owned(),
    body:          record.str_field("selftext").unwrap_or_default().to_owned(),
    created_utc,
    verdict:       map_verdict(record.link_flair_text()),
    local_verdict: None,
  })
}

/// Read an epoch-seconds value stored either as a JSON number or a string.
fn epoch_seconds(value: &Value) -> Result<f64> {
  let invalid = |reason: String| Error::InvalidField { field: "created_utc", reason };

  match value {
    Value::Number(n) => n
      .as_f64()
      .ok_or_else(|| invalid(format!("{n} is not representable as f64"))),
    Value::String(s) => s
      .trim()
      .parse::<f64>()
      .map_err(|e| invalid(format!("{s:?}: {e}"))),
    other => Err(invalid(format!("unexpected JSON value {other}"))),
  }
}
