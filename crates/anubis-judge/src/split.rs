//! Train/test splitting.

use anubis_core::Submission;
use rand_core::RngCore;

use crate::{Error, Result};

/// Shuffle the labelled samples and split them into training and test sets.
///
/// Samples without a community verdict are dropped first. The training set
/// gets `round(proportion × labelled)` samples, the test set the rest.
pub fn train_test_split<R>(
  samples: &[Submission],
  proportion: f64,
  rng: &mut R,
) -> Result<(Vec<Submission>, Vec<Submission>)>
where
  R: RngCore + ?Sized,
{
  if !(0.0..=1.0).contains(&proportion) {
    return Err(Error::InvalidProportion(proportion));
  }

  let mut labelled: Vec<Submission> = samples
    .iter()
    .filter(|s| s.verdict.is_some())
    .cloned()
    .collect();
  if labelled.is_empty() {
    return Err(Error::NoLabelledSamples);
  }

  // Fisher–Yates.
  for i in (1..labelled.len()).rev() {
    let j = (rng.next_u64() % (i as u64 + 1)) as usize;
    labelled.swap(i, j);
  }

  let train_count = (proportion * labelled.len() as f64).round() as usize;
  let test = labelled.split_off(train_count.min(labelled.len()));

  tracing::info!(
    total = samples.len(),
    train = labelled.len(),
    test = test.len(),
    "split samples"
  );
  Ok((labelled, test))
}
