//! Tag-frequency aggregation for search assist.
//!
//! Tags are not stored rows: each qualifying item's JSON tag column is
//! decoded at read time and counted in the layer, which keeps the invariant
//! visible — a tag's count is the number of qualifying items holding it, not
//! the number of occurrences.

use std::collections::{BTreeSet, HashMap};

use rusqlite::params_from_iter;
use tracing::debug;

use crate::db::{decode_tags, Database, StoreError, TagCount};

use super::expr::Expr;
use super::items::base_item_predicate;

/// Which item set the aggregation runs over. Scoping rules match the item
/// and folder listings exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope {
    All,
    Uncategorized,
    Folder(i64),
}

impl Database {
    /// Ranked `(tag, count)` suggestions: count descending, ties by tag
    /// ascending, truncated to `limit`. Tags already contained in the
    /// combined search text are suppressed — no point suggesting what the
    /// user has typed.
    pub fn suggested_tags(
        &self,
        library_id: i64,
        scope: TagScope,
        item_search: &str,
        tag_search: &str,
        limit: usize,
    ) -> Result<Vec<TagCount>, StoreError> {
        let mut clauses = vec![base_item_predicate(library_id, item_search)];
        match scope {
            TagScope::All => {}
            TagScope::Uncategorized => clauses.push(Expr::Uncategorized),
            TagScope::Folder(folder_id) => clauses.push(Expr::InFolders(vec![folder_id])),
        }
        let predicate = Expr::All(clauses);

        let mut params = Vec::new();
        let where_sql = predicate.to_sql("i", &mut params);
        let sql = format!("SELECT i.tags FROM items i WHERE {where_sql}");
        debug!("tag aggregation query: {sql}");

        let mut stmt = self.conn.prepare(&sql)?;
        let tag_columns = stmt
            .query_map(params_from_iter(params), |row| row.get::<_, Option<String>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // An item contributes at most once per distinct tag it holds.
        let mut counts: HashMap<String, i64> = HashMap::new();
        for raw in &tag_columns {
            let distinct: BTreeSet<String> = decode_tags(raw.as_deref()).into_iter().collect();
            for tag in distinct {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }

        let tag_filter = tag_search.trim().to_lowercase();
        let suppressed = combined_search_text(item_search, tag_search).to_lowercase();

        let mut ranked: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .filter(|tc| tc.count > 0)
            .filter(|tc| tag_filter.is_empty() || tc.tag.to_lowercase().contains(&tag_filter))
            .filter(|tc| !suppressed.contains(&tc.tag.to_lowercase()))
            .collect();

        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        ranked.truncate(limit);
        Ok(ranked)
    }
}

/// The item free-text and tag free-text joined by one space, empty parts
/// skipped. A tag contained in this string is already "typed" and gets
/// suppressed — including very short tags that are substrings of almost
/// anything; that behavior is intentional.
fn combined_search_text(item_search: &str, tag_search: &str) -> String {
    let parts: Vec<&str> = [item_search.trim(), tag_search.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    parts.join(" ")
}
