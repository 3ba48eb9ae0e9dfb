//! Upstream timing data provider

use async_trait::async_trait;

use crate::adapter::RawSession;
use crate::error::Result;
use crate::session::{CalendarEvent, SessionId};

#[cfg(test)]
pub mod fixtures;
pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpTimingProvider;
#[cfg(test)]
pub use mock::MockTimingProvider;

/// Timing data provider trait
///
/// Treated as an opaque fetch-by-session API. A race session typically takes
/// 20-30 seconds to fetch, which is what the local cache exists to avoid.
#[async_trait]
pub trait TimingProvider: Send + Sync {
    /// Event calendar for one season
    async fn fetch_schedule(&self, year: i32) -> Result<Vec<CalendarEvent>>;

    /// Raw payload for one session, in whatever schema version the provider serves
    async fn fetch_session(&self, session: &SessionId) -> Result<RawSession>;
}
