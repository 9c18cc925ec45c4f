use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Minimum length of the timestamp token in a snapshot directory name
pub const MIN_TIMESTAMP_LEN: usize = 9;

/// Filesystem layout and naming conventions for the snapshot tree.
///
/// Loaded from `$XDG_CONFIG_HOME/snapver/config.toml`; a missing file
/// means defaults. The timestamp format is configuration because it is
/// imposed by whatever external tool produces the snapshot directories.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config
{
    /// Base directory the snapshot trees mirror
    pub base_dir: PathBuf,
    /// Directory containing one subdirectory per snapshot
    pub snapshot_root: PathBuf,
    /// strftime pattern for the timestamp token at the end of a
    /// snapshot directory name
    pub snapshot_time_format: String,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            base_dir: PathBuf::from("/home"),
            snapshot_root: PathBuf::from("/home/.snapshots"),
            snapshot_time_format: "%Y%m%dT%H%M".to_string(),
        }
    }
}

impl Config
{
    /// Load configuration from the user config directory, falling back
    /// to defaults when no file exists
    pub fn load() -> Result<Self>
    {
        let Some(config_dir) = dirs::config_dir()
        else
        {
            return Ok(Self::default());
        };

        let path = config_dir.join("snapver").join("config.toml");
        if !path.exists()
        {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn parses_full_config()
    {
        let text = r#"
            base_dir = "/srv/data"
            snapshot_root = "/srv/.snapshots"
            snapshot_time_format = "%Y-%m-%dT%H%M"
        "#;

        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.snapshot_root, PathBuf::from("/srv/.snapshots"));
        assert_eq!(config.snapshot_time_format, "%Y-%m-%dT%H%M");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults()
    {
        let config: Config = toml::from_str("snapshot_root = \"/backup\"").unwrap();
        assert_eq!(config.snapshot_root, PathBuf::from("/backup"));
        assert_eq!(config.base_dir, Config::default().base_dir);
        assert_eq!(config.snapshot_time_format, Config::default().snapshot_time_format);
    }

    #[test]
    fn unknown_fields_are_rejected()
    {
        let result = toml::from_str::<Config>("snapsot_root = \"/typo\"");
        assert!(result.is_err());
    }
}
