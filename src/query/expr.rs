//! Typed predicate tree and LIKE escaping.
//!
//! Every WHERE clause in this layer is built from [`Expr`] nodes and rendered
//! in one place, so escaping and parameter binding are never re-derived at a
//! call site. User text enters a query only as a bound parameter.

use rusqlite::types::Value;

/// A predicate over the entity table aliased by the query
/// (`i` for items, `f` for folders).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Conjunction. Empty renders as always-true.
    All(Vec<Expr>),
    /// Disjunction.
    Any(Vec<Expr>),
    /// `library_id = ?`
    LibraryIs(i64),
    /// `is_deleted = 0`
    NotDeleted,
    /// Case-insensitive substring containment against one column.
    /// `pattern` is already escaped and `%`-wrapped; see [`Expr::contains`].
    Contains { column: &'static str, pattern: String },
    /// `parent_id IS NULL`
    ParentIsNull,
    /// `parent_id = ?`
    ParentIs(i64),
    /// Membership row exists for the item in any of the given folders.
    InFolders(Vec<i64>),
    /// No membership row exists for the item at all.
    Uncategorized,
}

/// Neutralize LIKE wildcards in `token`. Order matters: the escape character
/// itself first, then the multi-character wildcard, then the single-character
/// wildcard.
pub fn escape_like(token: &str) -> String {
    token
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl Expr {
    /// Containment predicate for one column: escapes `token` and wraps it as
    /// `%token%`. The only constructor that touches user text.
    pub fn contains(column: &'static str, token: &str) -> Expr {
        Expr::Contains {
            column,
            pattern: format!("%{}%", escape_like(token)),
        }
    }

    /// Render this node as a SQL fragment, pushing bound values onto `params`
    /// in rendering order.
    pub fn to_sql(&self, alias: &str, params: &mut Vec<Value>) -> String {
        match self {
            Expr::All(exprs) => {
                if exprs.is_empty() {
                    return "1".to_string();
                }
                let parts: Vec<String> = exprs.iter().map(|e| e.to_sql(alias, params)).collect();
                format!("({})", parts.join(" AND "))
            }
            Expr::Any(exprs) => {
                if exprs.is_empty() {
                    return "0".to_string();
                }
                let parts: Vec<String> = exprs.iter().map(|e| e.to_sql(alias, params)).collect();
                format!("({})", parts.join(" OR "))
            }
            Expr::LibraryIs(id) => {
                params.push(Value::Integer(*id));
                format!("{alias}.library_id = ?")
            }
            Expr::NotDeleted => format!("{alias}.is_deleted = 0"),
            Expr::Contains { column, pattern } => {
                params.push(Value::Text(pattern.clone()));
                format!("{alias}.{column} LIKE ? ESCAPE '\\'")
            }
            Expr::ParentIsNull => format!("{alias}.parent_id IS NULL"),
            Expr::ParentIs(id) => {
                params.push(Value::Integer(*id));
                format!("{alias}.parent_id = ?")
            }
            Expr::InFolders(folder_ids) => {
                let placeholders: Vec<&str> = folder_ids.iter().map(|_| "?").collect();
                for id in folder_ids {
                    params.push(Value::Integer(*id));
                }
                format!(
                    "EXISTS (SELECT 1 FROM folder_items fi \
                     WHERE fi.library_id = {alias}.library_id \
                     AND fi.item_id = {alias}.item_id \
                     AND fi.folder_id IN ({}))",
                    placeholders.join(", ")
                )
            }
            Expr::Uncategorized => format!(
                "NOT EXISTS (SELECT 1 FROM folder_items fi \
                 WHERE fi.library_id = {alias}.library_id \
                 AND fi.item_id = {alias}.item_id)"
            ),
        }
    }
}

/// Build the free-text predicates for a search string: one node per
/// whitespace-delimited token, each true when the token matches any of
/// `columns`. Callers AND the returned nodes together; blank input yields an
/// empty vector, meaning "match everything".
pub fn search_predicates(raw: &str, columns: &[&'static str]) -> Vec<Expr> {
    raw.trim()
        .split_whitespace()
        .map(|token| {
            let fields: Vec<Expr> = columns
                .iter()
                .map(|column| Expr::contains(column, token))
                .collect();
            Expr::Any(fields)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_order() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        // Backslash is doubled before wildcards are escaped, so a literal
        // "\%" becomes "\\" + "\%".
        assert_eq!(escape_like("\\%"), "\\\\\\%");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_contains_wraps_pattern() {
        let expr = Expr::contains("name", "50%");
        assert_eq!(
            expr,
            Expr::Contains { column: "name", pattern: "%50\\%%".to_string() }
        );
    }

    #[test]
    fn test_blank_search_yields_no_predicates() {
        assert!(search_predicates("", &["name"]).is_empty());
        assert!(search_predicates("   \t\n ", &["name"]).is_empty());
    }

    #[test]
    fn test_one_predicate_per_token() {
        let exprs = search_predicates("  two\nwords ", &["name", "annotation", "tags"]);
        assert_eq!(exprs.len(), 2);
        match &exprs[0] {
            Expr::Any(fields) => assert_eq!(fields.len(), 3),
            other => panic!("expected Any, got {other:?}"),
        }
    }

    #[test]
    fn test_rendering_binds_in_order() {
        let expr = Expr::All(vec![
            Expr::LibraryIs(7),
            Expr::NotDeleted,
            Expr::Any(vec![
                Expr::contains("name", "cat"),
                Expr::contains("tags", "cat"),
            ]),
        ]);
        let mut params = Vec::new();
        let sql = expr.to_sql("i", &mut params);

        assert_eq!(
            sql,
            "(i.library_id = ? AND i.is_deleted = 0 AND \
             (i.name LIKE ? ESCAPE '\\' OR i.tags LIKE ? ESCAPE '\\'))"
        );
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], Value::Integer(7));
        assert_eq!(params[1], Value::Text("%cat%".to_string()));
    }

    #[test]
    fn test_membership_rendering() {
        let mut params = Vec::new();
        let sql = Expr::InFolders(vec![3, 4]).to_sql("i", &mut params);
        assert!(sql.contains("fi.folder_id IN (?, ?)"));
        assert_eq!(params, vec![Value::Integer(3), Value::Integer(4)]);

        let mut params = Vec::new();
        let sql = Expr::Uncategorized.to_sql("i", &mut params);
        assert!(sql.starts_with("NOT EXISTS"));
        assert!(params.is_empty());
    }
}
