//! The community verdict and the mapping from Reddit flair text onto it.
//!
//! Flair is matched case-insensitively against one fixed table. Anything not
//! in the table (including no flair at all) maps to `None`, which callers
//! treat as "not judged yet" rather than as a failure.

use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── Verdict ─────────────────────────────────────────────────────────────────

/// The five judgement categories used by r/AmItheAsshole.
///
/// The symbolic name (`YTA`, `NTA`, ...) is what gets stored in the database.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verdict {
  /// You're the asshole.
  Yta,
  /// Not the asshole.
  Nta,
  /// Everyone sucks here.
  Esh,
  /// No assholes here.
  Nah,
  /// Not enough info.
  Info,
}

impl Verdict {
  /// Every verdict, in a stable order.
  pub const ALL: [Verdict; 5] =
    [Verdict::Yta, Verdict::Nta, Verdict::Esh, Verdict::Nah, Verdict::Info];

  /// The symbolic name stored in the `verdict` columns.
  pub fn symbol(self) -> &'static str { self.into() }

  /// Parse a stored symbolic name back into a verdict.
  pub fn from_symbol(s: &str) -> Result<Self> {
    Verdict::from_str(s).map_err(|_| Error::UnknownVerdict(s.to_owned()))
  }

  /// The long, human-readable form.
  pub fn describe(self) -> &'static str {
    match self {
      Verdict::Yta => "you're the asshole",
      Verdict::Nta => "not the asshole",
      Verdict::Esh => "everyone sucks here",
      Verdict::Nah => "no assholes here",
      Verdict::Info => "not enough info",
    }
  }
}

// ─── Flair mapping ───────────────────────────────────────────────────────────

/// Known flair strings, lowercase.
const FLAIR_TABLE: &[(&str, Verdict)] = &[
  ("asshole", Verdict::Yta),
  ("not the a-hole", Verdict::Nta),
  ("everyone sucks", Verdict::Esh),
  ("everyone is shit here", Verdict::Esh),
  ("no a-holes here", Verdict::Nah),
  ("not enough info", Verdict::Info),
];

/// Flair the moderators put on posts about the subreddit itself.
const META_FLAIR: &str = "meta";

/// Map a submission's `link_flair_text` onto a [`Verdict`].
///
/// Returns `None` for absent, empty or unrecognised flair.
pub fn map_verdict(tag: Option<&str>) -> Option<Verdict> {
  let tag = tag?.trim();
  if tag.is_empty() {
    return None;
  }

  let found = FLAIR_TABLE
    .iter()
    .find(|(known, _)| tag.eq_ignore_ascii_case(known))
    .map(|(_, verdict)| *verdict);

  if found.is_none() {
    tracing::debug!(flair = tag, "flair does not map to a verdict");
  }
  found
}

/// Whether `tag` marks an administrative post that should never be ingested.
pub fn is_meta_flair(tag: Option<&str>) -> bool {
  tag.is_some_and(|t| t.trim().eq_ignore_ascii_case(META_FLAIR))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_flair_maps_in_any_case() {
    let cases = [
      ("Asshole", Verdict::Yta),
      ("ASSHOLE", Verdict::Yta),
      ("Not the A-hole", Verdict::Nta),
      ("not the a-hole", Verdict::Nta),
      ("Everyone Sucks", Verdict::Esh),
      ("Everyone Is Shit Here", Verdict::Esh),
      ("No A-holes here", Verdict::Nah),
      ("NO A-HOLES HERE", Verdict::Nah),
      ("Not enough info", Verdict::Info),
      ("  Not Enough Info ", Verdict::Info),
    ];

    for (flair, expected) in cases {
      assert_eq!(map_verdict(Some(flair)), Some(expected), "flair {flair:?}");
    }
  }

  #[test]
  fn unknown_or_missing_flair_is_pending() {
    assert_eq!(map_verdict(None), None);
    assert_eq!(map_verdict(Some("")), None);
    assert_eq!(map_verdict(Some("   ")), None);
    assert_eq!(map_verdict(Some("UPDATE")), None);
    assert_eq!(map_verdict(Some("META")), None);
    assert_eq!(map_verdict(Some("Not the A-hole!")), None);
  }

  #[test]
  fn meta_flair_detection() {
    assert!(is_meta_flair(Some("META")));
    assert!(is_meta_flair(Some("Meta")));
    assert!(!is_meta_flair(Some("Asshole")));
    assert!(!is_meta_flair(None));
  }

  #[test]
  fn symbols_roundtrip_through_storage_names() {
    for verdict in Verdict::ALL {
      assert_eq!(Verdict::from_symbol(verdict.symbol()).unwrap(), verdict);
    }
    assert_eq!(Verdict::Info.symbol(), "INFO");
    assert_eq!(Verdict::Yta.to_string(), "YTA");
    assert!(matches!(
      Verdict::from_symbol("NEI"),
      Err(Error::UnknownVerdict(s)) if s == "NEI"
    ));
  }
}
