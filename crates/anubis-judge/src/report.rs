//! Per-verdict evaluation of a trained model.

use std::fmt;

use anubis_core::{Submission, Verdict};

use crate::{Judge, labelled};

/// Precision, recall and F1 for one verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
  pub verdict:   Verdict,
  pub precision: f64,
  pub recall:    f64,
  pub f1:        f64,
  /// Number of test samples whose true verdict is this one.
  pub support:   usize,
}

/// How well a model did on a held-out test set.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
  pub model:     &'static str,
  pub classes:   Vec<ClassMetrics>,
  pub accuracy:  f64,
  /// Labelled test samples evaluated.
  pub total:     usize,
  /// Samples the model declined to judge; they count as misses.
  pub abstained: usize,
}

#[derive(Default, Clone, Copy)]
struct Tally {
  true_positive:  usize,
  false_positive: usize,
  false_negative: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
  if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

impl ClassificationReport {
  /// Judge every labelled sample of `test` and compare with its verdict.
  pub fn evaluate(judge: &dyn Judge, test: &[Submission]) -> Self {
    let mut tallies = [Tally::default(); Verdict::ALL.len()];
    let index = |v: Verdict| Verdict::ALL.iter().position(|x| *x == v).unwrap_or(0);

    let mut total = 0;
    let mut correct = 0;
    let mut abstained = 0;

    for (submission, truth) in labelled(test) {
      total += 1;
      match judge.judge(submission) {
        Some(predicted) if predicted == truth => {
          correct += 1;
          tallies[index(truth)].true_positive += 1;
        }
        Some(predicted) => {
          tallies[index(predicted)].false_positive += 1;
          tallies[index(truth)].false_negative += 1;
        }
        None => {
          abstained += 1;
          tallies[index(truth)].false_negative += 1;
        }
      }
    }

    let classes = Verdict::ALL
      .iter()
      .zip(tallies)
      .map(|(verdict, t)| {
        let precision = ratio(t.true_positive, t.true_positive + t.false_positive);
        let recall = ratio(t.true_positive, t.true_positive + t.false_negative);
        let f1 = if precision + recall == 0.0 {
          0.0
        } else {
          2.0 * precision * recall / (precision + recall)
        };
        ClassMetrics {
          verdict: *verdict,
          precision,
          recall,
          f1,
          support: t.true_positive + t.false_negative,
        }
      })
      .collect();

    Self {
      model: judge.name(),
      classes,
      accuracy: ratio(correct, total),
      total,
      abstained,
    }
  }

  pub fn metrics(&self, verdict: Verdict) -> Option<&ClassMetrics> {
    self.classes.iter().find(|m| m.verdict == verdict)
  }
}

impl fmt::Display for ClassificationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "model: {}", self.model)?;
    writeln!(
      f,
      "{:>8} {:>10} {:>10} {:>10} {:>10}",
      "verdict", "precision", "recall", "f1", "support"
    )?;
    for m in &self.classes {
      writeln!(
        f,
        "{:>8} {:>10.2} {:>10.2} {:>10.2} {:>10}",
        m.verdict.symbol(),
        m.precision,
        m.recall,
        m.f1,
        m.support
      )?;
    }
    write!(
      f,
      "accuracy {:.2} over {} samples ({} abstained)",
      self.accuracy, self.total, self.abstained
    )
  }
}
