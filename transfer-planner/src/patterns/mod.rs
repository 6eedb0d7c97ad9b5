//! Transfer patterns: the distinct sequences of change stops used by
//! earliest-arrival journeys between every pair of stops over a day.
//!
//! [`TransferPatternScanner`] computes the journeys from one origin,
//! [`TransferPattern`] turns them into storable rows, and [`PatternJob`]
//! runs both over many origins on a pool of worker threads.

mod config;
mod profile;
mod repository;
mod worker;

pub use config::{MAX_WRITE_ATTEMPTS_VAR, PatternConfig, WORKERS_VAR};
pub use profile::{PatternTree, TransferPatternScanner};
pub use repository::{
    MemoryPatternStore, PatternStore, SqlitePatternStore, StoreError, TransferPattern, WriteOutcome,
    store_with_retry,
};
pub use worker::{JobError, JobSummary, PatternJob};
