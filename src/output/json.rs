//! JSON output formatting

use chrono::Utc;
use serde::Serialize;

use crate::cache::{DatasetKind, DatasetSource, LoadedSession};

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    /// The actual data
    pub data: T,

    /// Metadata about the response
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// Timestamp of the response
    pub timestamp: String,

    /// CLI version
    pub version: String,

    /// Session the data belongs to, for session commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionMeta>,
}

/// Which session was loaded and where each dataset came from
#[derive(Debug, Serialize)]
pub struct SessionMeta {
    /// Canonical cache key, e.g. `2024_05_chinese-grand-prix_r`
    pub id: String,
    pub name: String,
    pub sources: Vec<SourceMeta>,
}

#[derive(Debug, Serialize)]
pub struct SourceMeta {
    pub dataset: DatasetKind,
    pub source: DatasetSource,
}

impl From<&LoadedSession> for SessionMeta {
    fn from(loaded: &LoadedSession) -> Self {
        Self {
            id: loaded.id.canonical(),
            name: loaded.id.to_string(),
            sources: loaded
                .sources
                .iter()
                .map(|(dataset, source)| SourceMeta {
                    dataset: *dataset,
                    source: *source,
                })
                .collect(),
        }
    }
}

impl<T> JsonOutput<T> {
    /// Create a new JSON output with metadata
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                session: None,
            },
        }
    }

    /// Attach session provenance to the metadata
    pub fn with_session(mut self, loaded: &LoadedSession) -> Self {
        self.meta.session = Some(SessionMeta::from(loaded));
        self
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    let output = JsonOutput::new(data);
    serde_json::to_string_pretty(&output)
}

/// Format session-derived data as pretty-printed JSON with provenance
pub fn format_session_json<T: Serialize + ?Sized>(
    data: &T,
    loaded: &LoadedSession,
) -> Result<String, serde_json::Error> {
    let output = JsonOutput::new(data).with_session(loaded);
    serde_json::to_string_pretty(&output)
}
