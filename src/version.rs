use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};

/// Which versions to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode
{
    /// Every snapshot that contains the target, including repeats of
    /// the same content across consecutive snapshots
    All,
    /// Only snapshots whose content differs from the live target and
    /// from every more recent snapshot (approximated by mtime)
    Unique,
}

/// A snapshot that contains the target, before mode filtering
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry
{
    /// Name of the snapshot directory (e.g. "home.20240115T1230")
    pub snapshot_id: String,
    /// Timestamp parsed from the snapshot directory name
    pub snapshot_time: NaiveDateTime,
    /// Modification time of the target as it exists inside the snapshot
    pub modified: SystemTime,
    /// Absolute path to the target inside the snapshot
    pub path: PathBuf,
}

/// One row of resolved version output
#[derive(Debug, Clone, PartialEq)]
pub struct VersionView
{
    pub snapshot_id: String,
    pub snapshot_time: NaiveDateTime,
    pub modified: SystemTime,
    pub path: PathBuf,
    pub is_unique: bool,
}

impl VersionView
{
    /// Build a view from a snapshot entry; uniqueness is decided later
    pub fn from_entry(entry: SnapshotEntry) -> Self
    {
        Self {
            snapshot_id: entry.snapshot_id,
            snapshot_time: entry.snapshot_time,
            modified: entry.modified,
            path: entry.path,
            is_unique: false,
        }
    }

    /// Formats the snapshot timestamp for display
    pub fn formatted_snapshot_time(&self) -> String
    {
        format_timestamp(&self.snapshot_time)
    }

    /// Formats the target's modification time for display
    pub fn formatted_modified_time(&self) -> String
    {
        format_system_time(self.modified)
    }

    /// Combined display label: snapshot time, then modified time,
    /// both in the same human pattern
    pub fn display_label(&self) -> String
    {
        format!("{}    {}",
                self.formatted_snapshot_time(),
                self.formatted_modified_time())
    }
}

/// Format a timestamp as e.g. "Jan 15 2024 12:30pm"
pub fn format_timestamp(time: &NaiveDateTime) -> String
{
    time.format("%b %d %Y %-I:%M%P").to_string()
}

/// Format a filesystem mtime in local time, same pattern
pub fn format_system_time(time: SystemTime) -> String
{
    let local: DateTime<Local> = time.into();
    local.format("%b %d %Y %-I:%M%P").to_string()
}

#[cfg(test)]
mod tests
{
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn timestamp_format_uses_unpadded_hour_and_lowercase_meridiem()
    {
        let morning = NaiveDate::from_ymd_opt(2024, 1, 12)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(format_timestamp(&morning), "Jan 12 2024 9:00am");

        let noonish = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(format_timestamp(&noonish), "Jan 15 2024 12:30pm");
    }

    #[test]
    fn display_label_joins_snapshot_and_modified_times()
    {
        let time = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap();
        let modified = SystemTime::now();
        let view = VersionView {
            snapshot_id: "home.20240302T1805".to_string(),
            snapshot_time: time,
            modified,
            path: PathBuf::from("/home/.snapshots/home.20240302T1805/user/notes.txt"),
            is_unique: false,
        };

        let label = view.display_label();
        assert!(label.starts_with("Mar 02 2024 6:05pm    "));
        assert!(label.ends_with(&format_system_time(modified)));
    }
}
