//! Ingestion adapters for Anubis.
//!
//! Two producers of raw submissions, both pulled one record at a time:
//!
//! - [`LiveFeed`] walks the subreddit's `top` listings through the Reddit
//!   API ([`RedditClient`]).
//! - [`ArchiveReader`] streams line-delimited JSON archive dumps from local
//!   files or URLs, with [`LocationResolver`] preferring cached copies.
//!
//! Neither adapter deduplicates; the store's at-most-once insert does that.

// Native `async fn` in traits; the traits are only used generically.
#![allow(async_fn_in_trait)]

pub mod archive;
pub mod error;
pub mod live;
pub mod location;
pub mod reddit;

pub use archive::ArchiveReader;
pub use error::{Error, Result};
pub use live::{FlairSource, ListingPage, Listings, LiveFeed, TimeWindow};
pub use location::{Location, LocationResolver};
pub use reddit::{RedditClient, RedditCredentials};
