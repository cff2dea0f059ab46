//! The live adapter: a pull-based walk over several `top` listing windows.
//!
//! Reddit caps every listing at roughly a thousand entries, so one listing
//! never covers the subreddit's history. Walking several time windows of the
//! `top` listing reaches more distinct submissions; the same submission will
//! often show up in more than one window.

use std::{collections::VecDeque, fmt};

use anubis_core::LiveSubmission;
use serde::{Deserialize, Serialize};

use crate::Result;

// ─── Listing seam ────────────────────────────────────────────────────────────

/// The `t` parameter of a `top` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
  Hour,
  Day,
  Week,
  Month,
  Year,
  All,
}

impl TimeWindow {
  /// The windows walked when none are configured, widest first.
  pub const DEFAULT: [TimeWindow; 5] = [
    TimeWindow::All,
    TimeWindow::Year,
    TimeWindow::Month,
    TimeWindow::Week,
    TimeWindow::Day,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Hour => "hour",
      Self::Day => "day",
      Self::Week => "week",
      Self::Month => "month",
      Self::Year => "year",
      Self::All => "all",
    }
  }
}

impl fmt::Display for TimeWindow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One page of a listing.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
  pub submissions: Vec<LiveSubmission>,
  /// Cursor for the next page; `None` on the last page.
  pub after:       Option<String>,
}

/// Something that can serve pages of a subreddit's `top` listing.
pub trait Listings {
  async fn top(
    &mut self,
    subreddit: &str,
    window: TimeWindow,
    after: Option<&str>,
    limit: u32,
  ) -> Result<ListingPage>;
}

/// Something that can look up the current state of known submissions.
///
/// Used by the verdict backfill: flair is added by moderators hours or days
/// after a submission was first seen.
pub trait FlairSource {
  /// Fetch the submissions with the given base-36 ids. Ids that no longer
  /// resolve are simply missing from the result.
  async fn lookup(&mut self, ids: &[String]) -> Result<Vec<LiveSubmission>>;
}

// ─── Feed ────────────────────────────────────────────────────────────────────

/// Progress through the window currently being walked.
struct WindowCursor {
  window:    TimeWindow,
  after:     Option<String>,
  fetched:   usize,
  exhausted: bool,
}

impl WindowCursor {
  fn new(window: TimeWindow) -> Self {
    Self { window, after: None, fetched: 0, exhausted: false }
  }
}

/// Yields the submissions of every configured listing window in turn.
pub struct LiveFeed<L> {
  listings:       L,
  subreddit:      String,
  windows:        VecDeque<TimeWindow>,
  page_size:      u32,
  max_per_window: Option<usize>,
  current:        Option<WindowCursor>,
  buffered:       VecDeque<LiveSubmission>,
}

impl<L: Listings> LiveFeed<L> {
  pub fn new(
    listings: L,
    subreddit: impl Into<String>,
    windows: impl IntoIterator<Item = TimeWindow>,
  ) -> Self {
    Self {
      listings,
      subreddit: subreddit.into(),
      windows: windows.into_iter().collect(),
      page_size: 100,
      max_per_window: None,
      current: None,
      buffered: VecDeque::new(),
    }
  }

  /// Entries requested per listing page; Reddit allows at most 100.
  pub fn page_size(mut self, page_size: u32) -> Self {
    self.page_size = page_size.clamp(1, 100);
    self
  }

  /// Stop each window after this many submissions.
  pub fn max_per_window(mut self, max: Option<usize>) -> Self {
    self.max_per_window = max;
    self
  }

  /// Hand back the listing source, e.g. to reuse the API client.
  pub fn into_inner(self) -> L { self.listings }

  /// Pull the next submission, fetching another page when the buffer runs
  /// dry. Returns `Ok(None)` once every window is exhausted.
  pub async fn next(&mut self) -> Result<Option<LiveSubmission>> {
    loop {
      if let Some(submission) = self.buffered.pop_front() {
        return Ok(Some(submission));
      }

      let Some(cursor) = self.current.as_mut() else {
        match self.windows.pop_front() {
          Some(window) => {
            tracing::info!(subreddit = %self.subreddit, %window, "walking listing window");
            self.current = Some(WindowCursor::new(window));
            continue;
          }
          None => return Ok(None),
        }
      };

      if cursor.exhausted {
        tracing::info!(
          window = %cursor.window,
          fetched = cursor.fetched,
          "listing window exhausted"
        );
        self.current = None;
        continue;
      }

      let remaining = self
        .max_per_window
        .map(|max| max.saturating_sub(cursor.fetched));
      let limit = match remaining {
        Some(remaining) => self
          .page_size
          .min(u32::try_from(remaining).unwrap_or(u32::MAX)),
        None => self.page_size,
      };
      if limit == 0 {
        cursor.exhausted = true;
        continue;
      }

      let mut page = self
        .listings
        .top(&self.subreddit, cursor.window, cursor.after.as_deref(), limit)
        .await?;
      if let Some(remaining) = remaining {
        page.submissions.truncate(remaining);
      }

      tracing::debug!(
        window = %cursor.window,
        count = page.submissions.len(),
        after = ?page.after,
        "fetched listing page"
      );

      cursor.fetched += page.submissions.len();
      cursor.exhausted = page.after.is_none()
        || page.submissions.is_empty()
        || remaining.is_some_and(|r| r <= page.submissions.len());
      cursor.after = page.after;
      self.buffered.extend(page.submissions);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  /// Serves canned pages: `pages[window]` is a list of pages of ids.
  #[derive(Default)]
  struct FakeListings {
    pages:    HashMap<&'static str, Vec<Vec<&'static str>>>,
    requests: Vec<(TimeWindow, Option<String>, u32)>,
  }

  impl FakeListings {
    fn with(mut self, window: TimeWindow, pages: Vec<Vec<&'static str>>) -> Self {
      self.pages.insert(window.as_str(), pages);
      self
    }
  }

  fn live(id: &str) -> LiveSubmission {
    LiveSubmission {
      id:              id.into(),
      title:           format!("title {id}"),
      selftext:        String::new(),
      created_utc:     1_600_000_000.0,
      link_flair_text: None,
      subreddit_id:    "t5_2xhvq".into(),
      subreddit:       "AmItheAsshole".into(),
    }
  }

  impl Listings for FakeListings {
    async fn top(
      &mut self,
      _subreddit: &str,
      window: TimeWindow,
      after: Option<&str>,
      limit: u32,
    ) -> Result<ListingPage> {
      self.requests.push((window, after.map(str::to_owned), limit));

      let pages = self.pages.get(window.as_str()).cloned().unwrap_or_default();
      let index = match after {
        None => 0,
        Some(cursor) => cursor.trim_start_matches("page").parse::<usize>().unwrap(),
      };
      let Some(ids) = pages.get(index) else {
        return Ok(ListingPage::default());
      };

      let after = (index + 1 < pages.len()).then(|| format!("page{}", index + 1));
      Ok(ListingPage { submissions: ids.iter().map(|id| live(id)).collect(), after })
    }
  }

  async fn drain<L: Listings>(feed: &mut LiveFeed<L>) -> Vec<String> {
    let mut ids = vec![];
    while let Some(submission) = feed.next().await.unwrap() {
      ids.push(submission.id);
    }
    ids
  }

  #[tokio::test]
  async fn walks_every_window_and_follows_cursors() {
    let listings = FakeListings::default()
      .with(TimeWindow::All, vec![vec!["a", "b"], vec!["c"]])
      .with(TimeWindow::Week, vec![vec!["c", "d"]]);

    let mut feed = LiveFeed::new(listings, "AmItheAsshole", [TimeWindow::All, TimeWindow::Week]);
    let ids = drain(&mut feed).await;

    // Repeats across windows are passed through untouched.
    assert_eq!(ids, ["a", "b", "c", "c", "d"]);

    let listings = feed.into_inner();
    assert_eq!(listings.requests.len(), 3);
    assert_eq!(listings.requests[1], (TimeWindow::All, Some("page1".into()), 100));
  }

  #[tokio::test]
  async fn empty_window_is_skipped() {
    let listings = FakeListings::default().with(TimeWindow::Day, vec![vec!["x"]]);

    let mut feed = LiveFeed::new(listings, "AmItheAsshole", [TimeWindow::Year, TimeWindow::Day]);
    assert_eq!(drain(&mut feed).await, ["x"]);
  }

  #[tokio::test]
  async fn max_per_window_caps_each_window() {
    let listings = FakeListings::default()
      .with(TimeWindow::All, vec![vec!["a", "b"], vec!["c", "d"]])
      .with(TimeWindow::Year, vec![vec!["e", "f", "g", "h"]]);

    let mut feed = LiveFeed::new(listings, "AmItheAsshole", [TimeWindow::All, TimeWindow::Year])
      .page_size(2)
      .max_per_window(Some(3));

    assert_eq!(drain(&mut feed).await, ["a", "b", "c", "e", "f", "g"]);
    let listings = feed.into_inner();
    // Second page of `all` only asks for the one remaining entry.
    assert_eq!(listings.requests[1].2, 1);
  }

  #[tokio::test]
  async fn no_windows_means_no_submissions() {
    let mut feed = LiveFeed::new(FakeListings::default(), "AmItheAsshole", []);
    assert!(feed.next().await.unwrap().is_none());
  }
}
