//! HTTP timing provider
//!
//! ```text
//! GET {base}/{year}/schedule.json
//! GET {base}/{year}/{round}/{session code}.json
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::TimingProvider;
use crate::adapter::RawSession;
use crate::error::{ApiError, ConfigError, Result};
use crate::session::{CalendarEvent, SessionId, SessionType};

/// Request timeout. Full race payloads are large and slow to assemble upstream.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timing API client
pub struct HttpTimingProvider {
    http: HttpClient,
    base_url: Option<String>,
}

/// One schedule row as served by the API
#[derive(Debug, Deserialize)]
struct ScheduleEvent {
    round: u32,
    name: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    sessions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    events: Vec<ScheduleEvent>,
}

impl HttpTimingProvider {
    /// Create a client for `base_url`.
    ///
    /// Without a base URL the client still constructs, so fully cached
    /// sessions load offline; any actual fetch fails with a config error.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("paddock/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    fn url(&self, path: &str) -> Result<String> {
        let base = self.base_url.as_ref().ok_or(ConfigError::MissingApiHost)?;
        Ok(format!("{}{}", base, path))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        log::debug!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let data = response.json::<T>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(data)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_string()).into()),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }
}

#[async_trait]
impl TimingProvider for HttpTimingProvider {
    async fn fetch_schedule(&self, year: i32) -> Result<Vec<CalendarEvent>> {
        let response: ScheduleResponse = self.get(&format!("/{}/schedule.json", year)).await?;

        Ok(response
            .events
            .into_iter()
            .map(|event| CalendarEvent {
                year,
                round: event.round,
                name: event.name,
                location: event.location,
                country: event.country,
                sessions: event
                    .sessions
                    .iter()
                    .filter_map(|s| SessionType::from_code(s))
                    .collect(),
            })
            .collect())
    }

    async fn fetch_session(&self, session: &SessionId) -> Result<RawSession> {
        let path = format!(
            "/{}/{}/{}.json",
            session.year(),
            session.round(),
            session.session_type().code()
        );
        self.get(&path).await
    }
}
