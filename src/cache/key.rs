//! Cache file layout
//!
//! ```text
//! <root>/<session canonical id>/<kind>.parquet
//! <root>/calendar/<year>.json
//! ```

use std::path::{Path, PathBuf};

use super::DatasetKind;
use crate::session::SessionId;

/// File extension of dataset entries
pub const ENTRY_EXTENSION: &str = "parquet";

/// Subdirectory holding cached season calendars
pub const CALENDAR_DIR: &str = "calendar";

/// Directory holding every dataset of one session.
pub fn session_dir(root: &Path, session: &SessionId) -> PathBuf {
    root.join(session.canonical())
}

/// Path of one dataset entry.
pub fn entry_path(root: &Path, session: &SessionId, kind: DatasetKind) -> PathBuf {
    session_dir(root, session).join(format!("{}.{}", kind.as_str(), ENTRY_EXTENSION))
}

/// Path of a cached season calendar.
pub fn calendar_path(root: &Path, year: i32) -> PathBuf {
    root.join(CALENDAR_DIR).join(format!("{}.json", year))
}

/// Sibling temp file for atomic replace. Same directory, so the final rename
/// never crosses filesystems.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    final_path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}
