//! Verdict classifiers for Anubis.
//!
//! Every model implements [`Judge`]; [`summon`] picks one by [`ModelKind`].
//! Models learn from submissions that already carry a community verdict and
//! predict one for submissions that do not.

mod bayes;
mod majority;
mod report;
mod split;
mod tokenize;

pub mod error;

use anubis_core::{Submission, Verdict};
use serde::{Deserialize, Serialize};

pub use bayes::NaiveBayes;
pub use error::{Error, Result};
pub use majority::MajorityClass;
pub use report::{ClassMetrics, ClassificationReport};
pub use split::train_test_split;

/// A verdict classifier.
pub trait Judge {
  /// Short model name for logs and reports.
  fn name(&self) -> &'static str;

  /// Fit the model to `samples`, replacing anything learned before.
  /// Samples without a verdict are ignored.
  fn train(&mut self, samples: &[Submission]) -> Result<()>;

  /// Predict a verdict; `None` if the model cannot decide (e.g. untrained).
  fn judge(&self, submission: &Submission) -> Option<Verdict>;
}

/// The available model implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
  /// Multinomial naive Bayes over title and body words.
  #[default]
  NaiveBayes,
  /// Always predicts the most common training verdict.
  Majority,
}

/// Construct a fresh, untrained model of the given kind.
pub fn summon(kind: ModelKind) -> Box<dyn Judge> {
  match kind {
    ModelKind::NaiveBayes => Box::new(NaiveBayes::default()),
    ModelKind::Majority => Box::new(MajorityClass::default()),
  }
}

/// The community verdict of every labelled sample.
fn labelled(samples: &[Submission]) -> impl Iterator<Item = (&Submission, Verdict)> {
  samples
    .iter()
    .filter_map(|s| s.verdict.map(|verdict| (s, verdict)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn summon_builds_the_requested_model() {
    assert_eq!(summon(ModelKind::NaiveBayes).name(), "naive_bayes");
    assert_eq!(summon(ModelKind::Majority).name(), "majority");
  }
}
