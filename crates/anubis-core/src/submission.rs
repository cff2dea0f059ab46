//! The canonical submission record tracked by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::verdict::Verdict;

/// One r/AmItheAsshole post, normalized from whichever source produced it.
///
/// Values are immutable; the `with_*` methods build a copy with one field
/// replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
  /// Reddit's base-36 id, without the `t3_` kind prefix.
  pub submission_id: String,
  pub title:         String,
  pub body:          String,
  /// Seconds since the Unix epoch, as reported by the source.
  pub created_utc:   f64,
  /// The verdict the community assigned through post flair.
  pub verdict:       Option<Verdict>,
  /// The verdict a local model assigned.
  pub local_verdict: Option<Verdict>,
}

impl Submission {
  pub fn with_verdict(self, verdict: Option<Verdict>) -> Self {
    Self { verdict, ..self }
  }

  pub fn with_local_verdict(self, local_verdict: Option<Verdict>) -> Self {
    Self { local_verdict, ..self }
  }

  /// Whether the community has not judged this submission yet.
  pub fn is_pending(&self) -> bool { self.verdict.is_none() }

  /// The creation time as a calendar timestamp, if it is representable.
  pub fn created_at(&self) -> Option<DateTime<Utc>> {
    let secs = self.created_utc.trunc() as i64;
    let nanos = (self.created_utc.fract() * 1e9).round() as u32;
    DateTime::from_timestamp(secs, nanos.min(999_999_999))
  }

  /// Title and body joined, which is what the classifiers read.
  pub fn text(&self) -> String { format!("{}\n{}", self.title, self.body) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Submission {
    Submission {
      submission_id: "b7x1qz".into(),
      title:         "AITA for eating the last slice?".into(),
      body:          "It was my pizza.".into(),
      created_utc:   1_554_912_321.0,
      verdict:       None,
      local_verdict: None,
    }
  }

  #[test]
  fn with_verdict_replaces_only_the_verdict() {
    let original = sample();
    let judged = original.clone().with_verdict(Some(Verdict::Nta));

    assert_eq!(judged.verdict, Some(Verdict::Nta));
    assert!(!judged.is_pending());
    assert_eq!(judged.submission_id, original.submission_id);
    assert_eq!(judged.title, original.title);
    assert_eq!(judged.body, original.body);
    assert_eq!(judged.created_utc, original.created_utc);
    assert_eq!(judged.local_verdict, None);
  }

  #[test]
  fn created_at_reads_epoch_seconds() {
    let at = sample().created_at().unwrap();
    assert_eq!(at.timestamp(), 1_554_912_321);
  }
}
