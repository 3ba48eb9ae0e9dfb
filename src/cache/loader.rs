//! Cache-first session loading
//!
//! Every dataset kind is checked in the cache independently. If any kind is
//! missing, the session is fetched once upstream, normalized, and the missing
//! kinds are written back. Cache faults never fail a load; they only cost a
//! refetch.

use chrono::{Datelike, Utc};
use serde::Serialize;

use super::storage::{CacheEntry, CacheStore, Lookup};
use super::{Dataset, DatasetKind, StalePolicy};
use crate::adapter;
use crate::analysis::{PitStop, Stint, hints_from_laps, pit_stops, segment};
use crate::client::TimingProvider;
use crate::error::{Error, Result};
use crate::models::SessionData;
use crate::session::{CalendarEvent, EventRef, SessionId, SessionResolver, SessionType, validate_year};

/// Where a dataset in a [`LoadedSession`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSource {
    Cache,
    Upstream,
    /// Cached copy served because the upstream fetch failed
    Stale,
}

/// A fully loaded session with derived stints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedSession {
    pub id: SessionId,
    pub data: SessionData,
    pub stints: Vec<Stint>,
    pub pit_stops: Vec<PitStop>,
    pub sources: Vec<(DatasetKind, DatasetSource)>,
}

impl LoadedSession {
    /// Whether every dataset was served from the cache.
    pub fn fully_cached(&self) -> bool {
        self.sources
            .iter()
            .all(|(_, source)| *source == DatasetSource::Cache)
    }
}

/// Loads sessions through the cache from any [`TimingProvider`].
pub struct SessionLoader<P: TimingProvider> {
    provider: P,
    store: Option<CacheStore>,
    policy: StalePolicy,
    refresh: bool,
    current_year: i32,
}

impl<P: TimingProvider> SessionLoader<P> {
    /// Create a loader. Without a store every load goes upstream.
    pub fn new(provider: P, store: Option<CacheStore>) -> Self {
        Self {
            provider,
            store,
            policy: StalePolicy::default(),
            refresh: false,
            current_year: Utc::now().year(),
        }
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Ignore fresh cache entries and refetch; results are still written back.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    #[cfg(test)]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> Option<&CacheStore> {
        self.store.as_ref()
    }

    /// Resolve and load one session.
    pub async fn load(
        &self,
        year: i32,
        event: &EventRef,
        session_type: SessionType,
    ) -> Result<LoadedSession> {
        let id = self.resolve(year, event, session_type).await?;
        self.load_session(id).await
    }

    /// Resolve a session against the (cached) season calendar.
    pub async fn resolve(
        &self,
        year: i32,
        event: &EventRef,
        session_type: SessionType,
    ) -> Result<SessionId> {
        validate_year(year, self.current_year)?;
        let calendar = self.calendar(year).await?;
        SessionResolver::new(&calendar, self.current_year).resolve(year, event, session_type)
    }

    /// Season calendar, from the cache when fresh.
    pub async fn calendar(&self, year: i32) -> Result<Vec<CalendarEvent>> {
        let cached = match &self.store {
            Some(store) => store.lookup_calendar(year, Utc::now()),
            None => Lookup::Miss,
        };

        if !self.refresh
            && let Lookup::Fresh(events) = cached
        {
            log::debug!("Cache hit: calendar {}", year);
            return Ok(events);
        }

        match self.provider.fetch_schedule(year).await {
            Ok(events) => {
                if let Some(store) = &self.store
                    && !events.is_empty()
                    && let Err(e) = store.put_calendar(year, &events)
                {
                    log::warn!("Failed to cache {} calendar: {}", year, e);
                }
                Ok(events)
            }
            Err(Error::Api(e)) => match cached {
                Lookup::Fresh(events) => {
                    log::warn!("Calendar fetch failed ({}); using cached {} calendar", e, year);
                    Ok(events)
                }
                Lookup::Stale(events) if self.policy == StalePolicy::ServeStale => {
                    log::warn!("Calendar fetch failed ({}); using expired {} calendar", e, year);
                    Ok(events)
                }
                _ => Err(Error::DataUnavailable(format!(
                    "could not fetch the {} calendar: {}",
                    year, e
                ))),
            },
            Err(e) => Err(e),
        }
    }

    /// Load an already resolved session.
    pub async fn load_session(&self, id: SessionId) -> Result<LoadedSession> {
        let now = Utc::now();
        let mut data = SessionData::default();
        let mut sources = Vec::new();
        let mut missed = Vec::new();
        // Cached copies to fall back on if the fetch fails, with their expiry
        let mut fallback: Vec<(CacheEntry, bool)> = Vec::new();

        for kind in DatasetKind::ALL {
            let lookup = match &self.store {
                Some(store) => store.lookup(&id, kind, now),
                None => Lookup::Miss,
            };
            match lookup {
                Lookup::Fresh(entry) if !self.refresh => {
                    log::debug!("Cache hit: {} {}", id.canonical(), kind);
                    entry.payload.install(&mut data);
                    sources.push((kind, DatasetSource::Cache));
                }
                Lookup::Fresh(entry) => {
                    missed.push(kind);
                    fallback.push((entry, false));
                }
                Lookup::Stale(entry) => {
                    log::debug!("Cache expired: {} {}", id.canonical(), kind);
                    missed.push(kind);
                    fallback.push((entry, true));
                }
                Lookup::Miss => {
                    log::debug!("Cache miss: {} {}", id.canonical(), kind);
                    missed.push(kind);
                }
            }
        }

        if !missed.is_empty() {
            match self.fetch(&id).await {
                Ok(fetched) => {
                    for kind in missed {
                        let dataset = Dataset::from_session(&fetched, kind);
                        self.write_back(&id, &dataset);
                        dataset.install(&mut data);
                        sources.push((kind, DatasetSource::Upstream));
                    }
                }
                Err(Error::Api(e)) => {
                    let covered = fallback.len() == missed.len();
                    let allowed = fallback
                        .iter()
                        .all(|(_, expired)| !expired || self.policy == StalePolicy::ServeStale);
                    if !(covered && allowed) {
                        return Err(Error::DataUnavailable(format!("{}: {}", id, e)));
                    }

                    log::warn!("Fetch failed for {} ({}); serving cached copy", id, e);
                    for (entry, _) in fallback {
                        sources.push((entry.kind, DatasetSource::Stale));
                        entry.payload.install(&mut data);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        sources.sort_by_key(|(kind, _)| DatasetKind::ALL.iter().position(|k| k == kind));

        let hints = hints_from_laps(&data.laps);
        let stints = segment(&data.laps, &hints);
        let stops = pit_stops(&stints);

        Ok(LoadedSession {
            id,
            data,
            stints,
            pit_stops: stops,
            sources,
        })
    }

    async fn fetch(&self, id: &SessionId) -> Result<SessionData> {
        log::debug!("Fetching {} from upstream", id.canonical());
        let raw = self.provider.fetch_session(id).await?;
        adapter::normalize(raw)
    }

    /// Best-effort cache write. Failures only cost a refetch next time.
    fn write_back(&self, id: &SessionId, dataset: &Dataset) {
        if let Some(store) = &self.store
            && let Err(e) = store.put(id, dataset)
        {
            log::warn!("Not caching {} for {}: {}", dataset.kind(), id.canonical(), e);
        }
    }
}
