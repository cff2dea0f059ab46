//! Archive locations and the cache-aware resolver.

use std::{
  fmt,
  path::{Path, PathBuf},
};

use reqwest::Url;

/// Where an archive dump lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
  Local(PathBuf),
  /// A remote URL, kept exactly as it was configured.
  Remote(String),
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Local(path) => write!(f, "{}", path.display()),
      Self::Remote(url) => f.write_str(url),
    }
  }
}

/// Rewrites archive URLs to local copies when a file of the same name has
/// already been downloaded into `cache_dir`.
///
/// Matching is by file name only; file contents are not checked.
#[derive(Debug, Clone)]
pub struct LocationResolver {
  cache_dir: PathBuf,
}

impl LocationResolver {
  pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
    Self { cache_dir: cache_dir.into() }
  }

  pub fn cache_dir(&self) -> &Path { &self.cache_dir }

  /// Resolve one configured archive reference.
  ///
  /// - `http(s)` URL whose last path segment names a file in the cache
  ///   directory → that local file.
  /// - any other `http(s)` URL → the reference unchanged.
  /// - `file://` URL → its path.
  /// - anything else is taken to be a local path already.
  pub fn resolve(&self, reference: &str) -> Location {
    let Ok(url) = Url::parse(reference) else {
      return Location::Local(PathBuf::from(reference));
    };

    match url.scheme() {
      "http" | "https" => match self.cached_copy(&url) {
        Some(path) => {
          tracing::debug!(reference, path = %path.display(), "using cached archive");
          Location::Local(path)
        }
        None => Location::Remote(reference.to_owned()),
      },
      "file" => url
        .to_file_path()
        .map(Location::Local)
        .unwrap_or_else(|()| Location::Local(PathBuf::from(reference))),
      _ => Location::Local(PathBuf::from(reference)),
    }
  }

  /// Resolve every reference in order.
  pub fn resolve_all<I, S>(&self, references: I) -> Vec<Location>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    references
      .into_iter()
      .map(|r| self.resolve(r.as_ref()))
      .collect()
  }

  fn cached_copy(&self, url: &Url) -> Option<PathBuf> {
    let file_name = url.path_segments()?.next_back()?;
    if file_name.is_empty() {
      return None;
    }
    let candidate = self.cache_dir.join(file_name);
    candidate.is_file().then_some(candidate)
  }
}
