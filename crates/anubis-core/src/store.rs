//! The `SubmissionStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `anubis-store-sqlite`).
//! The bot's pipeline is written against this abstraction only.

use std::future::Future;

use crate::{submission::Submission, verdict::Verdict};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Restricts a listing by the community verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictFilter {
  /// No verdict yet.
  Pending,
  /// Any verdict.
  Judged,
  /// Exactly this verdict.
  Is(Verdict),
}

impl VerdictFilter {
  pub fn matches(&self, verdict: Option<Verdict>) -> bool {
    match self {
      Self::Pending => verdict.is_none(),
      Self::Judged => verdict.is_some(),
      Self::Is(expected) => verdict == Some(*expected),
    }
  }
}

/// Parameters for [`SubmissionStore::list`] and [`SubmissionStore::count`].
///
/// Results are ordered by `submission_id`. Walking a large table is done a
/// page at a time: pass the last id of one page as `after_id` of the next.
#[derive(Debug, Clone, Default)]
pub struct SubmissionQuery {
  pub verdict:  Option<VerdictFilter>,
  /// Only return submissions whose id sorts strictly after this one.
  pub after_id: Option<String>,
  pub limit:    Option<usize>,
}

impl SubmissionQuery {
  pub fn pending() -> Self {
    Self { verdict: Some(VerdictFilter::Pending), ..Default::default() }
  }

  pub fn judged() -> Self {
    Self { verdict: Some(VerdictFilter::Judged), ..Default::default() }
  }

  /// Whether `submission` satisfies the filter part of this query.
  pub fn matches(&self, submission: &Submission) -> bool {
    let verdict_ok = self
      .verdict
      .is_none_or(|filter| filter.matches(submission.verdict));
    let after_ok = self
      .after_id
      .as_deref()
      .is_none_or(|after| submission.submission_id.as_str() > after);
    verdict_ok && after_ok
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Anubis submission store backend.
///
/// Submissions are inserted at most once; a second insert of the same id is
/// silently ignored. The only mutations are the verdict backfills. Nothing is
/// ever deleted.
pub trait SubmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist `submission` unless its id is already stored.
  ///
  /// Returns `true` if a row was written, `false` if the id was present.
  fn insert(
    &self,
    submission: Submission,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Set the community verdict of an existing submission. No other column
  /// changes.
  fn update_verdict<'a>(
    &'a self,
    submission_id: &'a str,
    verdict: Verdict,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Set the locally computed verdict of an existing submission.
  fn update_local_verdict<'a>(
    &'a self,
    submission_id: &'a str,
    verdict: Verdict,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Retrieve a submission by id. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    submission_id: &'a str,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + 'a;

  /// List submissions matching `query`, ordered by id.
  fn list<'a>(
    &'a self,
    query: &'a SubmissionQuery,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + 'a;

  /// Count submissions matching `query`; `limit` is ignored.
  fn count<'a>(
    &'a self,
    query: &'a SubmissionQuery,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}
