//! File-per-entry cache storage
//!
//! Entries are written to a hidden temp file next to their final path and
//! renamed into place, so readers see either the old or the new file, never a
//! partial one. Concurrent writers to the same key are not coordinated; the
//! last rename wins.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::columnar::{self, Dataset};
use super::key::{self, CALENDAR_DIR, ENTRY_EXTENSION};
use super::{CacheTtl, DatasetKind};
use crate::error::CacheError;
use crate::session::{CalendarEvent, SessionId};

type Result<T> = std::result::Result<T, CacheError>;

/// One cached dataset of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub session: SessionId,
    pub kind: DatasetKind,
    pub payload: Dataset,
    pub written_at: DateTime<Utc>,
}

/// Outcome of a cache lookup that distinguishes expired entries from absent ones.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Fresh(T),
    Stale(T),
    Miss,
}

#[cfg(test)]
impl<T> Lookup<T> {
    /// The value if it has not expired.
    pub fn fresh(self) -> Option<T> {
        match self {
            Lookup::Fresh(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CalendarFile {
    written_at: DateTime<Utc>,
    events: Vec<CalendarEvent>,
}

/// Parquet-file cache rooted at an explicit directory.
pub struct CacheStore {
    root: PathBuf,
    ttl: Duration,
}

impl CacheStore {
    /// Get the default cache directory (~/.cache/paddock on Linux)
    pub fn default_dir() -> Result<PathBuf> {
        let cache_base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(cache_base.join("paddock"))
    }

    /// Use `root` as the cache directory. Nothing is created until the first write.
    pub fn open_at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ttl: CacheTtl::SESSION_DATA,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get a cached dataset if present and not expired.
    ///
    /// Corrupt entries are deleted and reported as absent.
    #[cfg(test)]
    pub fn get(&self, session: &SessionId, kind: DatasetKind) -> Option<CacheEntry> {
        self.lookup(session, kind, Utc::now()).fresh()
    }

    /// Look up an entry as of `now`, keeping expired entries visible.
    pub fn lookup(
        &self,
        session: &SessionId,
        kind: DatasetKind,
        now: DateTime<Utc>,
    ) -> Lookup<CacheEntry> {
        match self.read_entry(session, kind) {
            Ok(None) => Lookup::Miss,
            Ok(Some(entry)) if self.is_expired(entry.written_at, now) => Lookup::Stale(entry),
            Ok(Some(entry)) => Lookup::Fresh(entry),
            Err(CacheError::Read { path, reason }) => {
                log::warn!(
                    "Discarding corrupt cache entry {}: {}",
                    path.display(),
                    reason
                );
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                }
                Lookup::Miss
            }
            Err(e) => {
                log::warn!("Cache lookup failed: {}", e);
                Lookup::Miss
            }
        }
    }

    fn read_entry(&self, session: &SessionId, kind: DatasetKind) -> Result<Option<CacheEntry>> {
        let path = key::entry_path(&self.root, session, kind);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::Io(format!(
                    "Failed to open {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let (payload, meta) =
            columnar::read_dataset(file, kind).map_err(|reason| CacheError::Read {
                path: path.clone(),
                reason,
            })?;

        Ok(Some(CacheEntry {
            session: session.clone(),
            kind,
            payload,
            written_at: meta.written_at,
        }))
    }

    /// Store a dataset, stamped with the current time
    pub fn put(&self, session: &SessionId, payload: &Dataset) -> Result<()> {
        self.put_at(session, payload, Utc::now())
    }

    /// Store a dataset with an explicit write timestamp
    pub fn put_at(
        &self,
        session: &SessionId,
        payload: &Dataset,
        written_at: DateTime<Utc>,
    ) -> Result<()> {
        let path = key::entry_path(&self.root, session, payload.kind());
        write_atomic(&path, |out| {
            columnar::write_dataset(out, payload, written_at)
        })?;
        log::debug!(
            "Cached {} rows of {} for {}",
            payload.len(),
            payload.kind(),
            session.canonical()
        );
        Ok(())
    }

    /// Delete one entry. Returns whether anything was removed.
    pub fn invalidate(&self, session: &SessionId, kind: DatasetKind) -> Result<bool> {
        let path = key::entry_path(&self.root, session, kind);
        match fs::remove_file(&path) {
            Ok(()) => {
                // Drop the session directory once its last entry is gone
                let dir = key::session_dir(&self.root, session);
                if let Err(e) = fs::remove_dir(&dir) {
                    log::debug!("Keeping session directory {}: {}", dir.display(), e);
                }
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Delete every entry of one session. Returns the number of entries removed.
    pub fn invalidate_session(&self, session: &SessionId) -> Result<usize> {
        let dir = key::session_dir(&self.root, session);
        if !dir.exists() {
            return Ok(0);
        }
        let removed = entry_files(&dir).len();
        fs::remove_dir_all(&dir)
            .map_err(|e| CacheError::Io(format!("Failed to remove {}: {}", dir.display(), e)))?;
        Ok(removed)
    }

    /// Clear all cache entries and calendars
    pub fn clear_all(&self) -> Result<ClearStats> {
        let mut stats = ClearStats::default();

        for dir in self.owned_dirs() {
            let is_calendar = dir.file_name().is_some_and(|n| n == CALENDAR_DIR);
            if is_calendar {
                stats.calendars_removed += count_files(&dir, "json");
            } else {
                stats.entries_removed += entry_files(&dir).len();
            }

            if let Err(e) = fs::remove_dir_all(&dir) {
                log::warn!("Failed to clear {}: {}", dir.display(), e);
            }
        }

        Ok(stats)
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        let now = Utc::now();
        let mut stats = CacheStats::default();

        for dir in self.owned_dirs() {
            if dir.file_name().is_some_and(|n| n == CALENDAR_DIR) {
                continue;
            }
            stats.sessions += 1;

            for path in entry_files(&dir) {
                stats.total_entries += 1;
                stats.total_size_bytes += fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

                let meta = File::open(&path)
                    .map_err(|e| e.to_string())
                    .and_then(columnar::read_meta);
                match meta {
                    Ok(meta) => {
                        if self.is_expired(meta.written_at, now) {
                            stats.expired_entries += 1;
                        } else {
                            stats.valid_entries += 1;
                        }
                        let ts = meta.written_at.timestamp();
                        stats.oldest_entry = Some(stats.oldest_entry.map_or(ts, |o| o.min(ts)));
                        stats.newest_entry = Some(stats.newest_entry.map_or(ts, |n| n.max(ts)));
                    }
                    Err(_) => stats.corrupt_entries += 1,
                }
            }
        }

        Ok(stats)
    }

    /// Cached season calendar as of `now`.
    pub fn lookup_calendar(&self, year: i32, now: DateTime<Utc>) -> Lookup<Vec<CalendarEvent>> {
        let path = key::calendar_path(&self.root, year);
        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Lookup::Miss,
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                return Lookup::Miss;
            }
        };

        match serde_json::from_slice::<CalendarFile>(&contents) {
            Ok(file) if self.is_expired(file.written_at, now) => Lookup::Stale(file.events),
            Ok(file) => Lookup::Fresh(file.events),
            Err(e) => {
                log::warn!("Discarding corrupt calendar {}: {}", path.display(), e);
                if let Err(e) = fs::remove_file(&path) {
                    log::debug!("Failed to remove {}: {}", path.display(), e);
                }
                Lookup::Miss
            }
        }
    }

    /// Store a season calendar
    pub fn put_calendar(&self, year: i32, events: &[CalendarEvent]) -> Result<()> {
        let path = key::calendar_path(&self.root, year);
        let file = CalendarFile {
            written_at: Utc::now(),
            events: events.to_vec(),
        };
        write_atomic(&path, |out| {
            serde_json::to_writer(out, &file).map_err(|e| e.to_string())
        })
    }

    fn is_expired(&self, written_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(written_at).num_seconds() >= self.ttl.as_secs() as i64
    }

    /// Subdirectories of the root that this cache created.
    fn owned_dirs(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n == CALENDAR_DIR || looks_like_session_dir(n))
            })
            .collect()
    }
}

/// Statistics about cache clear operation
#[derive(Debug, Default)]
pub struct ClearStats {
    pub entries_removed: usize,
    pub calendars_removed: usize,
}

/// Statistics about cache state
#[derive(Debug, Default)]
pub struct CacheStats {
    pub sessions: usize,
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub corrupt_entries: usize,
    pub total_size_bytes: u64,
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}

/// Write via a sibling temp file and rename it over `path`.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::result::Result<(), String>,
{
    let write_error = |reason: String| CacheError::Write {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
    }

    let tmp = key::temp_path(path);
    let written = File::create(&tmp)
        .map_err(|e| e.to_string())
        .and_then(|file| {
            let mut out = BufWriter::new(file);
            write(&mut out)?;
            out.flush().map_err(|e| e.to_string())?;
            let file = out.into_inner().map_err(|e| e.to_string())?;
            file.sync_all().map_err(|e| e.to_string())
        })
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| e.to_string()));

    if let Err(reason) = written {
        if let Err(e) = fs::remove_file(&tmp) {
            log::debug!("Failed to remove {}: {}", tmp.display(), e);
        }
        return Err(write_error(reason));
    }
    Ok(())
}

fn entry_files(dir: &Path) -> Vec<PathBuf> {
    files_with_extension(dir, ENTRY_EXTENSION)
}

fn count_files(dir: &Path, extension: &str) -> usize {
    files_with_extension(dir, extension).len()
}

fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == extension))
        .collect()
}

/// Session directories start with a four-digit year and an underscore.
fn looks_like_session_dir(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 5 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'_'
}
