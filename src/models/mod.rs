use rusqlite::params;

use crate::db::DbPool;
use crate::error::ContentResult;

pub mod block;
pub mod feature;
pub mod gallery;
pub mod menu;
pub mod message;
pub mod order;
pub mod overlay;
pub mod section;
pub mod service;
pub mod settings;

/// Translation languages. Default-language text (French) lives on the main
/// row; a missing translation row means "fall back to the default fields".
pub const LANGS: &[&str] = &["en", "es", "it"];

/// Shared reorder protocol for all ordered child collections.
///
/// Rewrites `position = index` for every id in the submitted order, in one
/// transaction. The submitted order is authoritative, not a diff. Empty list
/// is a no-op. Ids not owned by the parent are skipped via the WHERE clause;
/// for duplicate ids the last occurrence wins (later update overwrites).
/// `table` and `parent_col` are compile-time constants from the callers.
pub(crate) fn reorder_children(
    pool: &DbPool,
    table: &str,
    parent_col: &str,
    parent_id: i64,
    ordered_ids: &[i64],
) -> ContentResult<()> {
    if ordered_ids.is_empty() {
        return Ok(());
    }

    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    let sql = format!(
        "UPDATE {} SET position = ?1 WHERE id = ?2 AND {} = ?3",
        table, parent_col
    );
    for (index, id) in ordered_ids.iter().enumerate() {
        tx.execute(&sql, params![index as i64, id, parent_id])?;
    }
    tx.commit()?;
    Ok(())
}

/// Next dense position within a parent's children.
pub(crate) fn next_position(
    conn: &rusqlite::Connection,
    table: &str,
    parent_col: &str,
    parent_id: i64,
) -> rusqlite::Result<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM {} WHERE {} = ?1",
        table, parent_col
    );
    conn.query_row(&sql, params![parent_id], |row| row.get(0))
}
