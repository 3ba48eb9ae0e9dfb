//! Mock timing provider for testing
//!
//! Provides a mock implementation of [`TimingProvider`] for unit testing
//! without making real API calls.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::TimingProvider;
use crate::adapter::RawSession;
use crate::error::{ApiError, Result};
use crate::session::{CalendarEvent, SessionId};

/// Mock provider for testing.
///
/// Configure expected responses via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockTimingProvider::new()
///     .with_schedule(calendar_2024())
///     .await
///     .with_session(race_payload_v2())
///     .await;
///
/// let raw = mock.fetch_session(&id).await?;
/// assert_eq!(mock.call_counts().await.fetch_session, 1);
/// ```
#[derive(Default)]
pub struct MockTimingProvider {
    /// Calendar to return from fetch_schedule
    schedule: Arc<Mutex<Vec<CalendarEvent>>>,
    /// Payload to return from fetch_session
    session: Arc<Mutex<Option<Value>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Fail every session fetch with a network error
    offline: Arc<Mutex<bool>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Sessions requested, in order
    requested: Arc<Mutex<Vec<SessionId>>>,
}

/// Tracks provider call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub fetch_schedule: usize,
    pub fetch_session: usize,
}

impl CallCounts {
    /// Get total number of provider calls made.
    pub fn total(&self) -> usize {
        self.fetch_schedule + self.fetch_session
    }
}

impl MockTimingProvider {
    /// Create a new mock provider with default (empty) responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the calendar to return from fetch_schedule.
    pub async fn with_schedule(self, events: Vec<CalendarEvent>) -> Self {
        *self.schedule.lock().await = events;
        self
    }

    /// Configure the raw payload to return from fetch_session.
    pub async fn with_session(self, payload: Value) -> Self {
        *self.session.lock().await = Some(payload);
        self
    }

    /// Configure an error to return on the next call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Make every later fetch_session call fail, as if the provider were down.
    pub async fn go_offline(&self) {
        *self.offline.lock().await = true;
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Get every session requested so far.
    pub async fn requested(&self) -> Vec<SessionId> {
        self.requested.lock().await.clone()
    }

    /// Check if there's a pending error and consume it.
    async fn check_error(&self) -> Result<()> {
        let mut error = self.error.lock().await;
        if let Some(e) = error.take() {
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl TimingProvider for MockTimingProvider {
    async fn fetch_schedule(&self, _year: i32) -> Result<Vec<CalendarEvent>> {
        self.check_error().await?;

        let mut counts = self.call_count.lock().await;
        counts.fetch_schedule += 1;

        Ok(self.schedule.lock().await.clone())
    }

    async fn fetch_session(&self, session: &SessionId) -> Result<RawSession> {
        self.requested.lock().await.push(session.clone());
        self.check_error().await?;
        if *self.offline.lock().await {
            return Err(ApiError::Network("provider offline".to_string()).into());
        }

        let mut counts = self.call_count.lock().await;
        counts.fetch_session += 1;

        let payload = self.session.lock().await.clone();
        payload
            .map(RawSession::from_value)
            .ok_or_else(|| ApiError::NotFound(session.canonical()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::{calendar_2024, race_payload_v2, session_id};
    use crate::error::Error;
    use crate::session::SessionType;

    #[tokio::test]
    async fn test_mock_returns_configured_data() {
        let mock = MockTimingProvider::new()
            .with_schedule(calendar_2024())
            .await
            .with_session(race_payload_v2())
            .await;

        assert_eq!(mock.fetch_schedule(2024).await.unwrap(), calendar_2024());
        let raw = mock
            .fetch_session(&session_id(1, SessionType::Race))
            .await
            .unwrap();
        assert!(matches!(raw, RawSession::V2(_)));

        let counts = mock.call_counts().await;
        assert_eq!(counts.fetch_schedule, 1);
        assert_eq!(counts.fetch_session, 1);
        assert_eq!(counts.total(), 2);
    }

    #[tokio::test]
    async fn test_mock_error_is_consumed_once() {
        let mock = MockTimingProvider::new()
            .with_error(ApiError::ServerError("boom".to_string()))
            .await;

        assert!(matches!(
            mock.fetch_schedule(2024).await,
            Err(Error::Api(ApiError::ServerError(_)))
        ));
        assert!(mock.fetch_schedule(2024).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_offline_and_missing_session() {
        let mock = MockTimingProvider::new();
        let id = session_id(1, SessionType::Race);

        assert!(matches!(
            mock.fetch_session(&id).await,
            Err(Error::Api(ApiError::NotFound(_)))
        ));

        mock.go_offline().await;
        assert!(matches!(
            mock.fetch_session(&id).await,
            Err(Error::Api(ApiError::Network(_)))
        ));
        assert_eq!(mock.requested().await.len(), 2);
    }
}
