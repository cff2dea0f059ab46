//! Core types and trait definitions for the Anubis submission store.
//!
//! This crate carries no HTTP or database dependencies. Ingestion, storage
//! and classifier crates all build on the types defined here.

// Native `async fn` in traits; the store trait spells out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod normalize;
pub mod raw;
pub mod store;
pub mod submission;
pub mod verdict;

pub use error::{Error, Result};
pub use normalize::{Community, is_relevant, normalize};
pub use raw::{ArchiveRecord, LiveSubmission, RawSubmission, SourceKind};
pub use submission::Submission;
pub use verdict::{Verdict, is_meta_flair, map_verdict};
