use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::query::sort::{FolderSort, FolderSortKey, ItemSortKey, SortSelection};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub browse: BrowseConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("perch/library.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            browse: BrowseConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Application-wide item ordering; folders may override it.
    #[serde(default = "default_item_sort")]
    pub item_sort: ItemSortKey,

    #[serde(default)]
    pub item_sort_ascending: bool,

    #[serde(default = "default_folder_sort")]
    pub folder_sort: FolderSortKey,

    #[serde(default = "default_true")]
    pub folder_sort_ascending: bool,
}

fn default_item_sort() -> ItemSortKey {
    ItemSortKey::AddedAt
}

fn default_folder_sort() -> FolderSortKey {
    FolderSortKey::Name
}

fn default_true() -> bool {
    true
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            item_sort: default_item_sort(),
            item_sort_ascending: false,
            folder_sort: default_folder_sort(),
            folder_sort_ascending: default_true(),
        }
    }
}

impl BrowseConfig {
    pub fn item_sort(&self) -> SortSelection {
        SortSelection { key: self.item_sort, ascending: self.item_sort_ascending }
    }

    pub fn folder_sort(&self) -> FolderSort {
        FolderSort { key: self.folder_sort, ascending: self.folder_sort_ascending }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of tag suggestions returned for search assist.
    #[serde(default = "default_tag_suggestion_limit")]
    pub tag_suggestion_limit: usize,
}

fn default_tag_suggestion_limit() -> usize {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { tag_suggestion_limit: default_tag_suggestion_limit() }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("perch/config.toml")
    }

    /// Load from the given path, or the platform config dir. A missing file
    /// is not an error; defaults apply.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path.unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.browse.item_sort(), SortSelection {
            key: ItemSortKey::AddedAt,
            ascending: false,
        });
        assert_eq!(config.browse.folder_sort().key, FolderSortKey::Name);
        assert_eq!(config.search.tag_suggestion_limit, 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [browse]
            item_sort = "name"
            item_sort_ascending = true
            "#,
        )
        .expect("parse");
        assert_eq!(config.browse.item_sort().key, ItemSortKey::Name);
        assert!(config.browse.item_sort_ascending);
        assert_eq!(config.search.tag_suggestion_limit, 30);
    }
}
