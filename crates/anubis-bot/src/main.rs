//! `anubis` binary.
//!
//! Reads `anubis.toml` (or the path given with `--config`), opens the SQLite
//! store and runs one mode:
//!
//! ```text
//! anubis scrape   # pull live and archived submissions into the store
//! anubis update   # backfill verdicts of pending submissions
//! anubis train    # fit the configured model and print its report
//! anubis judge    # train, then record a verdict for pending submissions
//! ```

use std::path::PathBuf;

use anubis_bot::{
  BotConfig,
  config::ArchiveConfig,
  pipeline::{self, PAGE_SIZE},
};
use anubis_ingest::{ArchiveReader, LiveFeed, LocationResolver, RedditClient};
use anubis_judge::summon;
use anubis_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use rand_core::OsRng;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Anubis, judge of AITA submissions")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "anubis.toml")]
  config: PathBuf,

  #[arg(value_enum)]
  mode: Mode,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
  Scrape,
  Train,
  Judge,
  Update,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = BotConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let store_path = config.store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.mode {
    Mode::Scrape => scrape(&store, &config).await,
    Mode::Update => update(&store, &config).await,
    Mode::Train => train(&store, &config).await.map(drop),
    Mode::Judge => {
      let judge = train(&store, &config).await?;
      pipeline::judge_pending(&store, judge.as_ref(), PAGE_SIZE)
        .await
        .context("failed to judge pending submissions")?;
      Ok(())
    }
  }
}

async fn reddit_client(config: &BotConfig) -> anyhow::Result<RedditClient> {
  let credentials = config
    .reddit
    .credentials()
    .context("reddit.client_id and reddit.client_secret must be set")?;
  let mut client = RedditClient::new(credentials, config.reddit.request_interval())
    .context("failed to build reddit client")?;
  client
    .authenticate()
    .await
    .context("failed to authenticate with reddit")?;
  Ok(client)
}

async fn scrape(store: &SqliteStore, config: &BotConfig) -> anyhow::Result<()> {
  if !config.reddit.enabled && !config.archive.enabled {
    tracing::warn!("both reddit and archive sources are disabled; nothing to scrape");
    return Ok(());
  }

  if config.reddit.enabled {
    let client = reddit_client(config).await?;
    let mut feed = LiveFeed::new(
      client,
      config.community.name.clone(),
      config.reddit.windows.iter().copied(),
    )
    .page_size(config.reddit.page_size)
    .max_per_window(config.reddit.max_per_window);

    pipeline::scrape_live(store, &mut feed, &config.community)
      .await
      .context("live scrape failed")?;
  }

  if config.archive.enabled {
    let mut reader = archive_reader(&config.archive)?;
    pipeline::scrape_archives(store, &mut reader, &config.community)
      .await
      .context("archive scrape failed")?;
  }

  Ok(())
}

fn archive_reader(config: &ArchiveConfig) -> anyhow::Result<ArchiveReader> {
  let resolver = LocationResolver::new(&config.cache_dir);
  let locations = resolver.resolve_all(&config.sources);
  ArchiveReader::new(locations).context("failed to build archive reader")
}

async fn update(store: &SqliteStore, config: &BotConfig) -> anyhow::Result<()> {
  let mut client = reddit_client(config).await?;
  pipeline::backfill(store, &mut client, PAGE_SIZE)
    .await
    .context("verdict backfill failed")?;
  Ok(())
}

async fn train(
  store: &SqliteStore,
  config: &BotConfig,
) -> anyhow::Result<Box<dyn anubis_judge::Judge>> {
  let mut judge = summon(config.model.kind);
  let report = pipeline::train(store, judge.as_mut(), config.model.train_proportion, &mut OsRng)
    .await
    .context("training failed")?;

  println!("{report}");
  Ok(judge)
}
