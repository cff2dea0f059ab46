//! The Anubis bot: configuration and the four run modes.
//!
//! The binary in `main.rs` wires configured components together; the mode
//! logic itself lives in [`pipeline`] and is written against the
//! [`SubmissionStore`](anubis_core::store::SubmissionStore) trait.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::BotConfig;
pub use error::{Error, Result};
