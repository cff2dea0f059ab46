//! Bot configuration.
//!
//! Read from a TOML file and overridden by `ANUBIS_*` environment variables;
//! nested keys use `__`, e.g. `ANUBIS_REDDIT__CLIENT_SECRET`.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anubis_core::Community;
use anubis_ingest::{RedditCredentials, TimeWindow};
use anubis_judge::ModelKind;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
  pub store_path: PathBuf,
  pub community:  Community,
  pub reddit:     RedditConfig,
  pub archive:    ArchiveConfig,
  pub model:      ModelConfig,
}

impl Default for BotConfig {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from("anubis.db"),
      community:  Community::default(),
      reddit:     RedditConfig::default(),
      archive:    ArchiveConfig::default(),
      model:      ModelConfig::default(),
    }
  }
}

/// The live Reddit API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
  pub enabled:             bool,
  pub client_id:           String,
  pub client_secret:       String,
  pub user_agent:          String,
  /// `top` time windows to walk, in order.
  pub windows:             Vec<TimeWindow>,
  pub page_size:           u32,
  /// Stop each window after this many submissions; unbounded if unset.
  pub max_per_window:      Option<usize>,
  pub request_interval_ms: u64,
}

impl Default for RedditConfig {
  fn default() -> Self {
    Self {
      enabled:             true,
      client_id:           String::new(),
      client_secret:       String::new(),
      user_agent:          concat!("anubis/", env!("CARGO_PKG_VERSION")).to_owned(),
      windows:             TimeWindow::DEFAULT.to_vec(),
      page_size:           100,
      max_per_window:      None,
      request_interval_ms: 1000,
    }
  }
}

impl RedditConfig {
  /// API credentials, or `None` if either half is missing.
  pub fn credentials(&self) -> Option<RedditCredentials> {
    if self.client_id.is_empty() || self.client_secret.is_empty() {
      return None;
    }
    Some(RedditCredentials {
      client_id:     self.client_id.clone(),
      client_secret: self.client_secret.clone(),
      user_agent:    self.user_agent.clone(),
    })
  }

  pub fn request_interval(&self) -> Duration {
    Duration::from_millis(self.request_interval_ms)
  }
}

/// Line-delimited JSON archive dumps.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
  pub enabled:   bool,
  /// Archives already downloaded here are read instead of their URL.
  pub cache_dir: PathBuf,
  /// URLs or local paths, read in order.
  pub sources:   Vec<String>,
}

impl Default for ArchiveConfig {
  fn default() -> Self {
    Self {
      enabled:   false,
      cache_dir: PathBuf::from("data"),
      sources:   Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
  pub kind:             ModelKind,
  /// Share of labelled submissions used for training; the rest is the test
  /// set.
  pub train_proportion: f64,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self { kind: ModelKind::default(), train_proportion: 0.7 }
  }
}

impl BotConfig {
  /// Layer the file at `path` (optional) and the environment over the
  /// defaults.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("ANUBIS")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  /// `store_path` with a leading `~` expanded to the home directory.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
