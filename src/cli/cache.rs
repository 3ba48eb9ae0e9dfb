//! Cache management commands

use colored::Colorize;

use crate::cache::{CacheStore, DatasetKind};
use crate::cli::{CommandContext, GlobalOptions, OutputFormat, SessionArgs};
use crate::error::Result;
use crate::output::formatters::{format_size, format_timestamp_local};
use crate::output::{json, table};

/// Show cache status/statistics
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let cache = ctx.cache_store();
    let stats = cache.stats()?;
    let path = cache.root().display().to_string();

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": path,
                "sessions": stats.sessions,
                "total_entries": stats.total_entries,
                "valid_entries": stats.valid_entries,
                "expired_entries": stats.expired_entries,
                "corrupt_entries": stats.corrupt_entries,
                "total_size_bytes": stats.total_size_bytes,
                "total_size_human": format_size(stats.total_size_bytes),
                "oldest_entry_timestamp": stats.oldest_entry,
                "newest_entry_timestamp": stats.newest_entry,
            });
            println!("{}", json::format_json(&json)?);
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            let mut pairs = vec![
                ("Location", path),
                ("Sessions", stats.sessions.to_string()),
                ("Valid entries", stats.valid_entries.to_string()),
                ("Expired", stats.expired_entries.to_string()),
                ("Total size", format_size(stats.total_size_bytes)),
            ];
            if stats.corrupt_entries > 0 {
                pairs.push(("Unreadable", stats.corrupt_entries.to_string()));
            }
            if let Some(oldest) = stats.oldest_entry {
                pairs.push(("Oldest entry", format_timestamp_local(oldest)));
            }
            if let Some(newest) = stats.newest_entry {
                pairs.push(("Newest entry", format_timestamp_local(newest)));
            }

            println!("{}", "Cache Status".bold());
            println!("{}", table::format_pairs(&pairs));
        }
    }

    Ok(())
}

/// Clear all cache entries
pub fn clear(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let stats = ctx.cache_store().clear_all()?;

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "entries_removed": stats.entries_removed,
                "calendars_removed": stats.calendars_removed,
                "success": true,
            });
            println!("{}", json::format_json(&json)?);
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            if stats.entries_removed + stats.calendars_removed > 0 {
                println!(
                    "{} Cleared {} cache entries and {} calendars",
                    "✓".green(),
                    stats.entries_removed,
                    stats.calendars_removed
                );
            } else {
                println!("Cache was already empty");
            }
        }
    }

    Ok(())
}

/// Show cache path
pub fn path(opts: &GlobalOptions) -> Result<()> {
    let path = match opts.cache_dir_ref() {
        // Skip config loading when the directory is given outright
        Some(dir) => dir.to_path_buf(),
        None => CommandContext::new(opts)?.cache_root().to_path_buf(),
    };
    println!("{}", path.display());
    Ok(())
}

/// Remove cached data for one session, or one dataset of it
pub async fn invalidate(
    opts: &GlobalOptions,
    args: &SessionArgs,
    dataset: Option<DatasetKind>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let id = ctx.resolve(args).await?;
    let cache: CacheStore = ctx.cache_store();

    let removed = match dataset {
        Some(kind) => usize::from(cache.invalidate(&id, kind)?),
        None => cache.invalidate_session(&id)?,
    };

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "session": id.canonical(),
                "dataset": dataset,
                "entries_removed": removed,
            });
            println!("{}", json::format_json(&json)?);
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            if removed > 0 {
                println!("{} Removed {} cached entries for {}", "✓".green(), removed, id);
            } else {
                println!("Nothing cached for {}", id);
            }
        }
    }

    Ok(())
}
