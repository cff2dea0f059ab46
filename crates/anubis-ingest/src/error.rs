//! Error type for `anubis-ingest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("archive line is not valid UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),

  /// The token endpoint answered but did not hand out a token.
  #[error("reddit authentication failed: {0}")]
  Auth(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
