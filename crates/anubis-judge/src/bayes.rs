//! Multinomial naive Bayes over bag-of-words features.

use std::collections::{BTreeMap, HashMap, HashSet};

use anubis_core::{Submission, Verdict};

use crate::{Error, Judge, Result, labelled, tokenize::tokenize};

#[derive(Debug, Default)]
struct ClassStats {
  documents:    usize,
  token_counts: HashMap<String, usize>,
  total_tokens: usize,
}

/// Word-count naive Bayes with add-one smoothing, scored in log space.
#[derive(Debug, Default)]
pub struct NaiveBayes {
  classes:    BTreeMap<Verdict, ClassStats>,
  vocabulary: HashSet<String>,
  documents:  usize,
}

impl NaiveBayes {
  fn log_score(&self, stats: &ClassStats, tokens: &[String]) -> f64 {
    let vocabulary = self.vocabulary.len() as f64;
    let denominator = (stats.total_tokens as f64 + vocabulary).ln();
    let prior = (stats.documents as f64 / self.documents as f64).ln();

    tokens
      .iter()
      .filter(|token| self.vocabulary.contains(*token))
      .map(|token| {
        let count = stats.token_counts.get(token).copied().unwrap_or(0);
        (count as f64 + 1.0).ln() - denominator
      })
      .fold(prior, |acc, term| acc + term)
  }
}

impl Judge for NaiveBayes {
  fn name(&self) -> &'static str { "naive_bayes" }

  fn train(&mut self, samples: &[Submission]) -> Result<()> {
    let mut classes: BTreeMap<Verdict, ClassStats> = BTreeMap::new();
    let mut vocabulary = HashSet::new();
    let mut documents = 0;

    for (submission, verdict) in labelled(samples) {
      let stats = classes.entry(verdict).or_default();
      stats.documents += 1;
      documents += 1;

      for token in tokenize(&submission.text()) {
        stats.total_tokens += 1;
        *stats.token_counts.entry(token.clone()).or_default() += 1;
        vocabulary.insert(token);
      }
    }

    if documents == 0 {
      return Err(Error::NoLabelledSamples);
    }

    tracing::debug!(
      documents,
      classes = classes.len(),
      vocabulary = vocabulary.len(),
      "trained naive bayes"
    );

    *self = Self { classes, vocabulary, documents };
    Ok(())
  }

  fn judge(&self, submission: &Submission) -> Option<Verdict> {
    let tokens: Vec<String> = tokenize(&submission.text()).collect();

    self
      .classes
      .iter()
      .map(|(verdict, stats)| (*verdict, self.log_score(stats, &tokens)))
      .max_by(|(_, a), (_, b)| a.total_cmp(b))
      .map(|(verdict, _)| verdict)
  }
}
