//! The work behind each run mode.
//!
//! Every stage awaits the one before it: records are pulled one at a time
//! from an adapter, filtered, normalized and stored before the next is
//! fetched.

use anubis_core::{
  Community, RawSubmission, Submission, is_relevant, map_verdict, normalize,
  store::{SubmissionQuery, SubmissionStore},
};
use anubis_ingest::{ArchiveReader, FlairSource, Listings, LiveFeed};
use anubis_judge::{ClassificationReport, Judge, train_test_split};
use rand_core::RngCore;

use crate::{Error, Result};

/// Submissions pulled from the store per page when walking a filter.
pub const PAGE_SIZE: usize = 100;

/// What happened to the records of one ingest run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
  /// Records pulled from the adapter.
  pub seen:       usize,
  /// Wrong community, or a meta post.
  pub skipped:    usize,
  /// Records that could not be normalized.
  pub rejected:   usize,
  pub inserted:   usize,
  /// Already stored; left untouched.
  pub duplicates: usize,
}

/// Outcome of one backfill pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackfillStats {
  /// Pending submissions looked up.
  pub checked: usize,
  /// Verdicts written.
  pub updated: usize,
  /// Ids the flair source no longer knows about.
  pub missing: usize,
}

// ─── Ingest ──────────────────────────────────────────────────────────────────

async fn ingest<S: SubmissionStore>(
  store: &S,
  community: &Community,
  raw: RawSubmission,
  stats: &mut IngestStats,
) -> Result<()> {
  stats.seen += 1;

  if !is_relevant(&raw, community) {
    stats.skipped += 1;
    return Ok(());
  }

  let submission = match normalize(&raw) {
    Ok(submission) => submission,
    Err(error) => {
      tracing::warn!(source = ?raw.kind(), %error, "skipping record that could not be normalized");
      stats.rejected += 1;
      return Ok(());
    }
  };

  let submission_id = submission.submission_id.clone();
  if store.insert(submission).await.map_err(Error::store)? {
    tracing::debug!(%submission_id, source = ?raw.kind(), "stored submission");
    stats.inserted += 1;
  } else {
    stats.duplicates += 1;
  }
  Ok(())
}

/// Drain the live feed into the store.
pub async fn scrape_live<S, L>(
  store: &S,
  feed: &mut LiveFeed<L>,
  community: &Community,
) -> Result<IngestStats>
where
  S: SubmissionStore,
  L: Listings,
{
  let mut stats = IngestStats::default();
  while let Some(live) = feed.next().await? {
    ingest(store, community, RawSubmission::from(live), &mut stats).await?;
  }

  tracing::info!(?stats, "live scrape finished");
  Ok(stats)
}

/// Drain every configured archive into the store. Broken archives are
/// skipped by the reader and never fail the run.
pub async fn scrape_archives<S>(
  store: &S,
  reader: &mut ArchiveReader,
  community: &Community,
) -> Result<IngestStats>
where
  S: SubmissionStore,
{
  let mut stats = IngestStats::default();
  while let Some(record) = reader.next().await {
    ingest(store, community, RawSubmission::from(record), &mut stats).await?;
  }

  tracing::info!(?stats, failed_archives = reader.failures(), "archive scrape finished");
  Ok(stats)
}

// ─── Backfill ────────────────────────────────────────────────────────────────

/// Look up the current flair of every pending submission and store the
/// verdict of those whose flair now maps to one.
pub async fn backfill<S, F>(store: &S, flair: &mut F, page_size: usize) -> Result<BackfillStats>
where
  S: SubmissionStore,
  F: FlairSource,
{
  let mut stats = BackfillStats::default();
  let mut query = SubmissionQuery {
    limit: Some(page_size.max(1)),
    ..SubmissionQuery::pending()
  };

  loop {
    let page = store.list(&query).await.map_err(Error::store)?;
    let Some(last) = page.last() else { break };
    query.after_id = Some(last.submission_id.clone());

    let ids: Vec<String> = page.into_iter().map(|s| s.submission_id).collect();
    let found = flair.lookup(&ids).await?;
    stats.checked += ids.len();
    stats.missing += ids.len().saturating_sub(found.len());

    for live in found {
      let Some(verdict) = map_verdict(live.link_flair_text.as_deref()) else {
        continue;
      };
      store
        .update_verdict(&live.id, verdict)
        .await
        .map_err(Error::store)?;
      tracing::debug!(submission_id = %live.id, %verdict, "backfilled verdict");
      stats.updated += 1;
    }
  }

  tracing::info!(?stats, "backfill finished");
  Ok(stats)
}

// ─── Models ──────────────────────────────────────────────────────────────────

/// Every submission with a community verdict.
async fn judged<S: SubmissionStore>(store: &S) -> Result<Vec<Submission>> {
  store
    .list(&SubmissionQuery::judged())
    .await
    .map_err(Error::store)
}

/// Split the judged submissions, fit `judge` to the training part and
/// evaluate it on the rest.
pub async fn train<S, R>(
  store: &S,
  judge: &mut dyn Judge,
  proportion: f64,
  rng: &mut R,
) -> Result<ClassificationReport>
where
  S: SubmissionStore,
  R: RngCore + ?Sized,
{
  let samples = judged(store).await?;
  let (training, test) = train_test_split(&samples, proportion, rng)?;

  judge.train(&training)?;
  let report = ClassificationReport::evaluate(judge, &test);

  tracing::info!(
    model = report.model,
    accuracy = report.accuracy,
    train = training.len(),
    test = test.len(),
    "trained model"
  );
  Ok(report)
}

/// Store the model's verdict for every pending submission it can judge.
/// Returns how many were written.
pub async fn judge_pending<S>(store: &S, judge: &dyn Judge, page_size: usize) -> Result<usize>
where
  S: SubmissionStore,
{
  let mut written = 0;
  let mut query = SubmissionQuery {
    limit: Some(page_size.max(1)),
    ..SubmissionQuery::pending()
  };

  loop {
    let page = store.list(&query).await.map_err(Error::store)?;
    let Some(last) = page.last() else { break };
    query.after_id = Some(last.submission_id.clone());

    for submission in &page {
      let Some(verdict) = judge.judge(submission) else {
        continue;
      };
      store
        .update_local_verdict(&submission.submission_id, verdict)
        .await
        .map_err(Error::store)?;
      written += 1;
    }
  }

  tracing::info!(model = judge.name(), written, "judged pending submissions");
  Ok(written)
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use anubis_core::{LiveSubmission, Verdict};
  use anubis_ingest::{ListingPage, Location, TimeWindow};
  use anubis_judge::{MajorityClass, ModelKind, summon};
  use anubis_store_sqlite::SqliteStore;

  use super::*;

  fn live(id: &str, flair: Option<&str>, subreddit_id: &str) -> LiveSubmission {
    LiveSubmission {
      id:              id.into(),
      title:           format!("AITA {id}"),
      selftext:        "body".into(),
      created_utc:     1_554_912_321.0,
      link_flair_text: flair.map(Into::into),
      subreddit_id:    subreddit_id.into(),
      subreddit:       "AmItheAsshole".into(),
    }
  }

  fn stored(id: &str, verdict: Option<Verdict>) -> Submission {
    Submission {
      submission_id: id.into(),
      title:         "AITA".into(),
      body:          String::new(),
      created_utc:   0.0,
      verdict,
      local_verdict: None,
    }
  }

  /// One `all` page, then nothing.
  struct OnePage(Option<Vec<LiveSubmission>>);

  impl Listings for OnePage {
    async fn top(
      &mut self,
      _subreddit: &str,
      _window: TimeWindow,
      _after: Option<&str>,
      _limit: u32,
    ) -> anubis_ingest::Result<ListingPage> {
      Ok(ListingPage { submissions: self.0.take().unwrap_or_default(), after: None })
    }
  }

  /// Current flair by id; ids absent from the map are unknown.
  struct Flairs(HashMap<&'static str, Option<&'static str>>);

  impl FlairSource for Flairs {
    async fn lookup(&mut self, ids: &[String]) -> anubis_ingest::Result<Vec<LiveSubmission>> {
      Ok(
        ids
          .iter()
          .filter_map(|id| {
            self
              .0
              .get(id.as_str())
              .map(|flair| live(id, *flair, "t5_2xhvq"))
          })
          .collect(),
      )
    }
  }

  #[tokio::test]
  async fn live_scrape_filters_and_dedups() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.insert(stored("old", None)).await.unwrap();

    let mut feed = LiveFeed::new(
      OnePage(Some(vec![
        live("a", Some("Not the A-hole"), "t5_2xhvq"),
        live("b", None, "t5_2xhvq"),
        live("c", None, "t5_other"),
        live("d", Some("META"), "t5_2xhvq"),
        live("old", Some("Asshole"), "t5_2xhvq"),
      ])),
      "AmItheAsshole",
      [TimeWindow::All],
    );

    let stats = scrape_live(&store, &mut feed, &Community::default()).await.unwrap();

    assert_eq!(stats, IngestStats {
      seen:       5,
      skipped:    2,
      rejected:   0,
      inserted:   2,
      duplicates: 1,
    });
    assert_eq!(store.get("a").await.unwrap().unwrap().verdict, Some(Verdict::Nta));
    assert_eq!(store.get("b").await.unwrap().unwrap().verdict, None);
    // The duplicate did not overwrite the first insert.
    assert_eq!(store.get("old").await.unwrap().unwrap().verdict, None);
  }

  #[tokio::test]
  async fn archive_scrape_survives_a_broken_archive() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.ndjson");
    let good = dir.path().join("good.ndjson");
    std::fs::write(&broken, "{ this is not json\n").unwrap();
    std::fs::write(
      &good,
      concat!(
        r#"{"id":"g1","subreddit":"amitheasshole","title":"t","selftext":"s","created_utc":"1554912321","link_flair_text":"Asshole"}"#, "\n",
        r#"{"id":"g2","subreddit":"AmItheAsshole","created_utc":1554912400}"#, "\n",
        r#"{"subreddit":"AmItheAsshole","created_utc":1554912400}"#, "\n",
        r#"{"id":"g4","subreddit":"relationships","created_utc":1554912400}"#, "\n",
      ),
    )
    .unwrap();

    let mut reader =
      ArchiveReader::new([Location::Local(broken), Location::Local(good)]).unwrap();
    let store = SqliteStore::open_in_memory().await.unwrap();

    let stats = scrape_archives(&store, &mut reader, &Community::default())
      .await
      .unwrap();

    assert_eq!(stats.seen, 4);
    assert_eq!(stats.inserted, 2);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(reader.failures(), 1);

    let g1 = store.get("g1").await.unwrap().unwrap();
    assert_eq!(g1.verdict, Some(Verdict::Yta));
    assert_eq!(g1.created_utc, 1_554_912_321.0);
    assert_eq!(store.get("g2").await.unwrap().unwrap().verdict, None);
  }

  #[tokio::test]
  async fn backfill_fills_mapped_flairs_only() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    for id in ["p1", "p2", "p3", "p4", "p5"] {
      store.insert(stored(id, None)).await.unwrap();
    }
    store.insert(stored("done", Some(Verdict::Esh))).await.unwrap();

    let mut flairs = Flairs(HashMap::from([
      ("p1", Some("Asshole")),
      ("p2", None),
      ("p3", Some("not the a-hole")),
      ("p4", Some("Update")),
      ("done", Some("Asshole")),
    ]));

    // A page size of two makes the walk cross several pages.
    let stats = backfill(&store, &mut flairs, 2).await.unwrap();

    assert_eq!(stats, BackfillStats { checked: 5, updated: 2, missing: 1 });
    assert_eq!(store.get("p1").await.unwrap().unwrap().verdict, Some(Verdict::Yta));
    assert_eq!(store.get("p3").await.unwrap().unwrap().verdict, Some(Verdict::Nta));
    assert_eq!(store.get("p2").await.unwrap().unwrap().verdict, None);
    assert_eq!(store.get("p4").await.unwrap().unwrap().verdict, None);
    assert_eq!(store.get("done").await.unwrap().unwrap().verdict, Some(Verdict::Esh));

    let pending = store.count(&SubmissionQuery::pending()).await.unwrap();
    assert_eq!(pending, 3);
  }

  #[tokio::test]
  async fn backfill_on_empty_store_does_nothing() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut flairs = Flairs(HashMap::new());
    let stats = backfill(&store, &mut flairs, PAGE_SIZE).await.unwrap();
    assert_eq!(stats, BackfillStats::default());
  }

  /// Never produces the same number twice in a row.
  struct Counter(u64);

  impl RngCore for Counter {
    fn next_u32(&mut self) -> u32 { self.next_u64() as u32 }

    fn next_u64(&mut self) -> u64 {
      self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
      self.0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
      for byte in dest {
        *byte = self.next_u64() as u8;
      }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
      self.fill_bytes(dest);
      Ok(())
    }
  }

  #[tokio::test]
  async fn train_then_judge_pending() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    for i in 0..8 {
      store
        .insert(stored(&format!("n{i}"), Some(Verdict::Nta)))
        .await
        .unwrap();
    }
    store.insert(stored("y0", Some(Verdict::Yta))).await.unwrap();
    store.insert(stored("y1", Some(Verdict::Yta))).await.unwrap();
    store.insert(stored("q1", None)).await.unwrap();
    store.insert(stored("q2", None)).await.unwrap();

    let mut judge = MajorityClass::default();
    let report = train(&store, &mut judge, 0.5, &mut Counter(7)).await.unwrap();

    assert_eq!(report.model, "majority");
    assert_eq!(report.total, 5);

    let written = judge_pending(&store, &judge, 1).await.unwrap();
    assert_eq!(written, 2);

    let q1 = store.get("q1").await.unwrap().unwrap();
    assert!(q1.local_verdict.is_some());
    assert_eq!(q1.verdict, None);
    // Judged submissions keep their local column empty.
    assert_eq!(store.get("n0").await.unwrap().unwrap().local_verdict, None);
  }

  #[tokio::test]
  async fn train_without_labels_fails() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.insert(stored("q1", None)).await.unwrap();

    let mut judge = summon(ModelKind::NaiveBayes);
    let err = train(&store, judge.as_mut(), 0.7, &mut Counter(1))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Judge(anubis_judge::Error::NoLabelledSamples)));
  }

  #[tokio::test]
  async fn untrained_model_writes_nothing() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.insert(stored("q1", None)).await.unwrap();

    let judge = summon(ModelKind::NaiveBayes);
    assert_eq!(judge_pending(&store, judge.as_ref(), PAGE_SIZE).await.unwrap(), 0);
  }
}
