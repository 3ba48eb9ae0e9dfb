//! Local cache for session datasets
//!
//! One Parquet file per (session, dataset kind) under a configurable root,
//! written atomically and expired after 30 days. The loader wraps a
//! [`TimingProvider`](crate::client::TimingProvider) with this cache.

pub mod columnar;
pub mod key;
pub mod loader;
pub mod storage;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cache TTL configuration per data type
pub struct CacheTtl;

impl CacheTtl {
    // Finished sessions never change upstream; the limit only bounds how long
    // a provider-side correction can stay invisible.
    pub const SESSION_DATA: Duration = Duration::from_secs(30 * 24 * 60 * 60); // 30 days

    pub const CALENDAR: Duration = Duration::from_secs(30 * 24 * 60 * 60); // 30 days
}

/// Independently cached dataset of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Results,
    Laps,
    Qualifying,
    Weather,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Results,
        DatasetKind::Laps,
        DatasetKind::Qualifying,
        DatasetKind::Weather,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Results => "results",
            DatasetKind::Laps => "laps",
            DatasetKind::Qualifying => "qualifying",
            DatasetKind::Weather => "weather",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when the upstream fetch fails and only expired entries exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Surface `DataUnavailable`
    #[default]
    Refuse,
    /// Serve the expired copy and log a warning
    ServeStale,
}

// Re-export main types
pub use columnar::Dataset;
pub use loader::{DatasetSource, LoadedSession, SessionLoader};
pub use storage::{CacheEntry, CacheStore, Lookup};
