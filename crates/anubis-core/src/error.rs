//! Error types for `anubis-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is absent from a raw record.
  #[error("raw record is missing required field {0:?}")]
  MissingField(&'static str),

  /// A field is present but cannot be interpreted.
  #[error("raw record field {field:?} is invalid: {reason}")]
  InvalidField { field: &'static str, reason: String },

  /// A stored verdict symbol does not name any [`Verdict`](crate::Verdict).
  #[error("unknown verdict symbol: {0:?}")]
  UnknownVerdict(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
