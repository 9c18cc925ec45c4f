use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum RestoreError
{
    /// Renaming the live target to its backup name failed; nothing
    /// was copied and the target is untouched
    #[error("failed to back up {target}: {source}")]
    BackupFailed
    {
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The copy failed after the backup rename succeeded; the previous
    /// version survives at `backup` but the original path is gone
    #[error("restore copy to {target} failed, previous version preserved at {backup}: {source}")]
    CopyFailed
    {
        target: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Restore a snapshot version over the live target.
///
/// Two steps: rename the live target to a backup name carrying its
/// current mtime, then copy the snapshot version to the original path
/// (recursively for directories, preserving modification times). The
/// copy is only attempted once the rename has succeeded, and the
/// snapshot source is never mutated. Returns the backup path.
pub fn restore(source: &Path,
               target: &Path)
               -> Result<PathBuf, RestoreError>
{
    let backup = backup_path(target).map_err(|e| RestoreError::BackupFailed {
                                        target: target.to_path_buf(),
                                        source: e,
                                    })?;

    fs::rename(target, &backup).map_err(|e| RestoreError::BackupFailed {
                                   target: target.to_path_buf(),
                                   source: e,
                               })?;

    if let Err(e) = copy_recursive(source, target)
    {
        return Err(RestoreError::CopyFailed {
            target: target.to_path_buf(),
            backup,
            source: e,
        });
    }

    Ok(backup)
}

/// Backup name for the live target: its current mtime, formatted as
/// YYYYMMDD-HHMMSS, inserted between base name and extension
fn backup_path(target: &Path) -> io::Result<PathBuf>
{
    let modified = fs::metadata(target)?.modified()?;
    let local: DateTime<Local> = modified.into();
    let stamp = local.format("%Y%m%d-%H%M%S");

    let stem = target.file_stem().unwrap_or_default().to_string_lossy();
    let backup_name = match target.extension()
    {
        Some(ext) => format!("{}-{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}-{}", stem, stamp),
    };

    Ok(target.with_file_name(backup_name))
}

/// Copy a file or directory tree, carrying modification times over.
/// Mtime preservation matters: the resolver treats mtime as the
/// content-change signal, so a restored version must keep the mtime
/// of the snapshot it came from.
fn copy_recursive(source: &Path,
                  target: &Path)
                  -> io::Result<()>
{
    if !fs::metadata(source)?.is_dir()
    {
        fs::copy(source, target)?;
        return copy_mtime(source, target);
    }

    let mut dir_times: Vec<(PathBuf, SystemTime)> = Vec::new();

    for entry in WalkDir::new(source)
    {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry.path()
                       .strip_prefix(source)
                       .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let dest = target.join(rel);

        if entry.file_type().is_dir()
        {
            fs::create_dir_all(&dest)?;
            let modified = entry.metadata().map_err(io::Error::from)?.modified()?;
            dir_times.push((dest, modified));
        }
        else
        {
            fs::copy(entry.path(), &dest)?;
            copy_mtime(entry.path(), &dest)?;
        }
    }

    // Writing children bumps parent mtimes; apply directory times
    // deepest-first once all content is in place
    for (dest, modified) in dir_times.into_iter().rev()
    {
        let dir = fs::File::open(&dest)?;
        dir.set_modified(modified)?;
    }

    Ok(())
}

fn copy_mtime(source: &Path,
              dest: &Path)
              -> io::Result<()>
{
    let modified = fs::metadata(source)?.modified()?;
    let file = fs::File::open(dest)?;
    file.set_modified(modified)
}

#[cfg(test)]
mod tests
{
    use std::fs::File;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;

    fn at(secs: u64) -> SystemTime
    {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn write_file(path: &Path,
                  content: &str,
                  mtime: SystemTime)
    {
        if let Some(parent) = path.parent()
        {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        File::open(path).unwrap().set_modified(mtime).unwrap();
    }

    #[test]
    fn restores_file_and_keeps_backup_of_live_version()
    {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("notes.txt");
        let source = dir.path().join("snap/notes.txt");

        write_file(&target, "live content", at(1_700_000_000));
        write_file(&source, "snapshot content", at(1_600_000_000));

        let backup = restore(&source, &target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "snapshot content");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "live content");

        // Backup name inserts the live mtime between stem and extension
        let name = backup.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("notes-"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), "notes-YYYYMMDD-HHMMSS.txt".len());
    }

    #[test]
    fn restored_file_keeps_the_snapshot_mtime()
    {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("notes.txt");
        let source = dir.path().join("snap/notes.txt");

        write_file(&target, "live", at(1_700_000_000));
        write_file(&source, "old", at(1_600_000_000));

        restore(&source, &target).unwrap();

        let modified = fs::metadata(&target).unwrap().modified().unwrap();
        assert_eq!(modified, at(1_600_000_000));
    }

    #[test]
    fn restore_does_not_touch_the_source()
    {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("notes.txt");
        let source = dir.path().join("snap/notes.txt");

        write_file(&target, "live", at(1_700_000_000));
        write_file(&source, "old", at(1_600_000_000));

        restore(&source, &target).unwrap();

        assert_eq!(fs::read_to_string(&source).unwrap(), "old");
        assert_eq!(fs::metadata(&source).unwrap().modified().unwrap(), at(1_600_000_000));
    }

    #[test]
    fn restores_directories_recursively()
    {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("project");
        let source = dir.path().join("snap/project");

        write_file(&target.join("main.rs"), "live main", at(1_700_000_000));
        write_file(&source.join("main.rs"), "old main", at(1_600_000_000));
        write_file(&source.join("src/lib.rs"), "old lib", at(1_600_000_100));

        let backup = restore(&source, &target).unwrap();

        assert_eq!(fs::read_to_string(target.join("main.rs")).unwrap(), "old main");
        assert_eq!(fs::read_to_string(target.join("src/lib.rs")).unwrap(), "old lib");
        assert_eq!(fs::metadata(target.join("src/lib.rs")).unwrap().modified().unwrap(),
                   at(1_600_000_100));

        // The full previous tree survives under the backup name
        assert_eq!(fs::read_to_string(backup.join("main.rs")).unwrap(), "live main");
    }

    #[test]
    fn missing_target_aborts_before_any_copy()
    {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("gone.txt");
        let source = dir.path().join("snap/gone.txt");

        write_file(&source, "old", at(1_600_000_000));

        let err = restore(&source, &target).unwrap_err();
        assert!(matches!(err, RestoreError::BackupFailed { .. }));
        assert!(!target.exists());
        assert_eq!(fs::read_to_string(&source).unwrap(), "old");
    }

    #[test]
    fn failed_copy_surfaces_the_backup_path()
    {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("notes.txt");
        let source = dir.path().join("snap/notes.txt");

        write_file(&target, "live", at(1_700_000_000));
        // Source never written: the rename succeeds, the copy cannot

        let err = restore(&source, &target).unwrap_err();
        match err
        {
            RestoreError::CopyFailed { backup, .. } =>
            {
                assert!(backup.exists());
                assert_eq!(fs::read_to_string(&backup).unwrap(), "live");
                assert!(!target.exists());
            }
            other => panic!("expected CopyFailed, got {other:?}"),
        }
    }
}
