//! Sort selections and the global-or-override resolution rule.

use serde::{Deserialize, Serialize};

/// Ordering criterion for item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSortKey {
    Name,
    AddedAt,
    FileSize,
    Duration,
    Random,
}

impl ItemSortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSortKey::Name => "name",
            ItemSortKey::AddedAt => "added_at",
            ItemSortKey::FileSize => "file_size",
            ItemSortKey::Duration => "duration",
            ItemSortKey::Random => "random",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "name" => Some(ItemSortKey::Name),
            "added_at" => Some(ItemSortKey::AddedAt),
            "file_size" => Some(ItemSortKey::FileSize),
            "duration" => Some(ItemSortKey::Duration),
            "random" => Some(ItemSortKey::Random),
            _ => None,
        }
    }
}

/// Ordering criterion for folder listings. Folders never sort by an item
/// criterion; root/child enumeration always uses one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderSortKey {
    Name,
    AddedAt,
}

/// An item ordering choice: criterion plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSelection {
    pub key: ItemSortKey,
    pub ascending: bool,
}

/// A folder ordering choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSort {
    pub key: FolderSortKey,
    pub ascending: bool,
}

/// How a folder orders its items: the application-wide default, or the
/// folder's own explicit choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderSortOverride {
    UseGlobal,
    UseExplicit(SortSelection),
}

/// Resolve the ordering to apply for an item listing under a folder:
/// an explicit override wins, otherwise the global selection.
pub fn resolve_item_sort(global: SortSelection, local: FolderSortOverride) -> SortSelection {
    match local {
        FolderSortOverride::UseGlobal => global,
        FolderSortOverride::UseExplicit(sel) => sel,
    }
}

fn direction(ascending: bool) -> &'static str {
    if ascending {
        "ASC"
    } else {
        "DESC"
    }
}

/// Render the ORDER BY clause for an item listing. `Random` yields a fresh
/// permutation on every execution. Every other key carries a tie-break on
/// item_id so repeated queries over unchanged data are reproducible.
pub fn item_order_clause(sel: SortSelection) -> String {
    let dir = direction(sel.ascending);
    match sel.key {
        ItemSortKey::Random => "ORDER BY RANDOM()".to_string(),
        ItemSortKey::Name => format!("ORDER BY i.name COLLATE NOCASE {dir}, i.item_id ASC"),
        ItemSortKey::AddedAt => format!("ORDER BY i.added_at {dir}, i.item_id ASC"),
        ItemSortKey::FileSize => format!("ORDER BY i.size_bytes {dir}, i.item_id ASC"),
        ItemSortKey::Duration => format!("ORDER BY i.duration {dir}, i.item_id ASC"),
    }
}

/// Render the ORDER BY clause for a folder listing, with the same
/// folder_id tie-break.
pub fn folder_order_clause(sort: FolderSort) -> String {
    let dir = direction(sort.ascending);
    match sort.key {
        FolderSortKey::Name => format!("ORDER BY f.name COLLATE NOCASE {dir}, f.folder_id ASC"),
        FolderSortKey::AddedAt => format!("ORDER BY f.added_at {dir}, f.folder_id ASC"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrip() {
        for key in [
            ItemSortKey::Name,
            ItemSortKey::AddedAt,
            ItemSortKey::FileSize,
            ItemSortKey::Duration,
            ItemSortKey::Random,
        ] {
            assert_eq!(ItemSortKey::from_str(key.as_str()), Some(key));
        }
        assert_eq!(ItemSortKey::from_str("modified_at"), None);
    }

    #[test]
    fn test_resolution_prefers_explicit() {
        let global = SortSelection { key: ItemSortKey::AddedAt, ascending: false };
        let local = SortSelection { key: ItemSortKey::Name, ascending: true };

        assert_eq!(resolve_item_sort(global, FolderSortOverride::UseGlobal), global);
        assert_eq!(
            resolve_item_sort(global, FolderSortOverride::UseExplicit(local)),
            local
        );
    }

    #[test]
    fn test_order_clause_tie_break() {
        let sel = SortSelection { key: ItemSortKey::FileSize, ascending: false };
        assert_eq!(item_order_clause(sel), "ORDER BY i.size_bytes DESC, i.item_id ASC");

        let sel = SortSelection { key: ItemSortKey::Random, ascending: true };
        assert_eq!(item_order_clause(sel), "ORDER BY RANDOM()");

        let sort = FolderSort { key: FolderSortKey::Name, ascending: true };
        assert_eq!(
            folder_order_clause(sort),
            "ORDER BY f.name COLLATE NOCASE ASC, f.folder_id ASC"
        );
    }
}
