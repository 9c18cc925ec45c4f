use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Named groups of package identifiers, loaded from a TOML file.
///
/// Replaces a hand-edited, comment-toggled source list: enabling or
/// disabling a package is an edit to the config file, and group
/// selection happens at runtime.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PackageGroups
{
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

impl PackageGroups
{
    /// Default location: `$XDG_CONFIG_HOME/snapver/groups.toml`
    pub fn default_path() -> Option<PathBuf>
    {
        dirs::config_dir().map(|d| d.join("snapver").join("groups.toml"))
    }

    /// Load group definitions from a TOML file
    pub fn load(path: &Path) -> Result<Self>
    {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read groups file at {}", path.display()))?;
        let groups = toml::from_str(&text)
            .with_context(|| format!("Failed to parse groups file at {}", path.display()))?;
        Ok(groups)
    }

    /// Group names in display order
    pub fn names(&self) -> Vec<&str>
    {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Deduplicated union of the packages in the selected groups.
    /// Unknown group names resolve to nothing.
    pub fn selected_packages(&self,
                             selected: &[&str])
                             -> BTreeSet<String>
    {
        let mut packages = BTreeSet::new();
        for name in selected
        {
            if let Some(group) = self.groups.get(*name)
            {
                packages.extend(group.iter().cloned());
            }
        }
        packages
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn sample() -> PackageGroups
    {
        toml::from_str(r#"
            [groups]
            "Video Capture" = [
                "com.obsproject.Studio",
                "com.obsproject.Studio.Plugin.DroidCam",
            ]
            "Gaming" = [
                "com.usebottles.bottles",
                "com.discordapp.Discord",
            ]
            "Chat" = [
                "com.discordapp.Discord",
            ]
        "#)
        .unwrap()
    }

    #[test]
    fn selection_unions_and_dedupes_across_groups()
    {
        let groups = sample();
        let packages = groups.selected_packages(&["Gaming", "Chat"]);

        let expected: Vec<&str> = vec!["com.discordapp.Discord", "com.usebottles.bottles"];
        let actual: Vec<&str> = packages.iter().map(String::as_str).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn unknown_groups_resolve_to_nothing()
    {
        let groups = sample();
        assert!(groups.selected_packages(&["Nonexistent"]).is_empty());
        assert!(groups.selected_packages(&[]).is_empty());
    }

    #[test]
    fn names_are_sorted_and_stable()
    {
        let groups = sample();
        assert_eq!(groups.names(), vec!["Chat", "Gaming", "Video Capture"]);
    }

    #[test]
    fn empty_file_yields_no_groups()
    {
        let groups: PackageGroups = toml::from_str("").unwrap();
        assert!(groups.names().is_empty());
    }
}
