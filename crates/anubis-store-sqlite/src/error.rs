//! Error type for `anubis-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] anubis_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A verdict update targeted an id that was never inserted.
  #[error("submission not found: {0}")]
  SubmissionNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
