//! Majority-class baseline.

use std::collections::BTreeMap;

use anubis_core::{Submission, Verdict};

use crate::{Error, Judge, Result, labelled};

/// Predicts whichever verdict was most common in training, for every input.
///
/// Any real model has to beat this to be worth keeping.
#[derive(Debug, Default)]
pub struct MajorityClass {
  prediction: Option<Verdict>,
}

impl Judge for MajorityClass {
  fn name(&self) -> &'static str { "majority" }

  fn train(&mut self, samples: &[Submission]) -> Result<()> {
    let mut counts: BTreeMap<Verdict, usize> = BTreeMap::new();
    for (_, verdict) in labelled(samples) {
      *counts.entry(verdict).or_default() += 1;
    }

    // Ties go to the verdict that sorts first.
    let best = counts
      .iter()
      .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then(vb.cmp(va)))
      .map(|(verdict, _)| *verdict)
      .ok_or(Error::NoLabelledSamples)?;

    tracing::debug!(verdict = %best, "majority verdict");
    self.prediction = Some(best);
    Ok(())
  }

  fn judge(&self, _submission: &Submission) -> Option<Verdict> { self.prediction }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample(verdict: Option<Verdict>) -> Submission {
    Submission {
      submission_id: "x".into(),
      title:         String::new(),
      body:          String::new(),
      created_utc:   0.0,
      verdict,
      local_verdict: None,
    }
  }

  #[test]
  fn predicts_the_most_common_verdict() {
    let samples = [
      sample(Some(Verdict::Nta)),
      sample(Some(Verdict::Yta)),
      sample(Some(Verdict::Nta)),
      sample(None),
      sample(None),
    ];

    let mut model = MajorityClass::default();
    assert_eq!(model.judge(&sample(None)), None);

    model.train(&samples).unwrap();
    assert_eq!(model.judge(&sample(None)), Some(Verdict::Nta));
  }

  #[test]
  fn ties_go_to_the_first_verdict() {
    let samples = [sample(Some(Verdict::Nah)), sample(Some(Verdict::Yta))];
    let mut model = MajorityClass::default();
    model.train(&samples).unwrap();
    assert_eq!(model.judge(&sample(None)), Some(Verdict::Yta));
  }

  #[test]
  fn unlabelled_training_set_is_an_error() {
    let mut model = MajorityClass::default();
    let err = model.train(&[sample(None)]).unwrap_err();
    assert!(matches!(err, Error::NoLabelledSamples));
  }
}
