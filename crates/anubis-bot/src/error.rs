//! Error type for the bot's pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("ingest error: {0}")]
  Ingest(#[from] anubis_ingest::Error),

  #[error("model error: {0}")]
  Judge(#[from] anubis_judge::Error),
}

impl Error {
  /// Wrap whatever error type the store backend uses.
  pub fn store<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(error))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
