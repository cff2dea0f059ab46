//! Error types for `anubis-judge`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Training needs at least one submission with a community verdict.
  #[error("no submissions with a verdict to learn from")]
  NoLabelledSamples,

  #[error("train proportion must be within 0..=1, got {0}")]
  InvalidProportion(f64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
