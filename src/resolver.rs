use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::config::{Config, MIN_TIMESTAMP_LEN};
use crate::version::{Mode, SnapshotEntry, VersionView};

/// Resolve the historical versions of `target` found under the
/// configured snapshot root.
///
/// Enumeration is best-effort: a missing snapshot root yields an empty
/// result, and snapshots that lack the target, cannot be stat'ed, or
/// carry an unparseable timestamp token are skipped without failing
/// the call. Only a target outside the base directory is an error.
pub fn resolve(target: &Path,
               config: &Config,
               mode: Mode)
               -> Result<Vec<VersionView>>
{
    let rel = target.strip_prefix(&config.base_dir)
                    .with_context(|| {
                        format!("{} is not under base directory {}",
                                target.display(),
                                config.base_dir.display())
                    })?;

    // Live mtime is best-effort; unknown means nothing gets excluded
    // on its account in unique mode
    let live_mtime = fs::metadata(target).and_then(|m| m.modified()).ok();

    let mut entries = collect_entries(rel, config);

    // Sort by snapshot timestamp descending (most recent first).
    // Listing order is lexical and only makes the result deterministic
    // for equal timestamps; this sort is authoritative.
    entries.sort_by(|a, b| b.snapshot_time.cmp(&a.snapshot_time));

    let views: Vec<VersionView> = entries.into_iter().map(VersionView::from_entry).collect();

    match mode
    {
        Mode::All => Ok(views),
        Mode::Unique => Ok(dedup_unique(views, live_mtime)),
    }
}

/// Scan the snapshot root for snapshots that contain the target
fn collect_entries(rel: &Path,
                   config: &Config)
                   -> Vec<SnapshotEntry>
{
    let read_dir = match fs::read_dir(&config.snapshot_root)
    {
        Ok(rd) => rd,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = read_dir.filter_map(|e| e.ok())
                                         .map(|e| e.file_name().to_string_lossy().to_string())
                                         .collect();
    names.sort();

    let mut entries = Vec::new();

    for name in names
    {
        let candidate = config.snapshot_root.join(&name).join(rel);

        // Snapshots that don't mirror the target are skipped silently
        let Ok(metadata) = fs::metadata(&candidate)
        else
        {
            continue;
        };
        let Ok(modified) = metadata.modified()
        else
        {
            continue;
        };

        // Snapshots whose name carries no parseable timestamp are
        // dropped entirely
        let Some(snapshot_time) = parse_snapshot_time(&name, &config.snapshot_time_format)
        else
        {
            continue;
        };

        entries.push(SnapshotEntry {
            snapshot_id: name,
            snapshot_time,
            modified,
            path: candidate,
        });
    }

    entries
}

/// Parse the timestamp token from a snapshot directory name.
///
/// The token is the final dot-delimited segment; the name must contain
/// a dot and the token must be at least MIN_TIMESTAMP_LEN characters.
fn parse_snapshot_time(name: &str,
                       format: &str)
                       -> Option<NaiveDateTime>
{
    let (_, token) = name.rsplit_once('.')?;
    if token.len() < MIN_TIMESTAMP_LEN
    {
        return None;
    }
    NaiveDateTime::parse_from_str(token, format).ok()
}

/// Keep the most recent snapshot per distinct mtime, excluding the
/// live target's mtime when it is known
fn dedup_unique(views: Vec<VersionView>,
                live_mtime: Option<SystemTime>)
                -> Vec<VersionView>
{
    let mut seen: HashSet<SystemTime> = HashSet::new();
    let mut unique = Vec::new();

    for mut view in views
    {
        if Some(view.modified) == live_mtime
        {
            continue;
        }
        if !seen.insert(view.modified)
        {
            continue;
        }
        view.is_unique = true;
        unique.push(view);
    }

    unique
}

/// For each row of the all-mode result, whether it is the first
/// occurrence of a modification time that the unique-mode result also
/// contains. Drives row highlighting; reuses the unique result instead
/// of recomputing it.
pub fn first_unique_flags(all: &[VersionView],
                          unique: &[VersionView])
                          -> Vec<bool>
{
    let unique_mtimes: HashSet<SystemTime> = unique.iter().map(|v| v.modified).collect();
    let mut seen: HashSet<SystemTime> = HashSet::new();

    all.iter()
       .map(|v| unique_mtimes.contains(&v.modified) && seen.insert(v.modified))
       .collect()
}
