//! Read-only schema introspection helpers shared by migrations and repositories.

use rusqlite::Connection;

pub(crate) fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    object_exists(conn, "table", table)
}

pub(crate) fn index_exists(conn: &Connection, index: &str) -> rusqlite::Result<bool> {
    object_exists(conn, "index", index)
}

/// Returns column names of `table` in declaration order (empty when absent).
pub(crate) fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}

pub(crate) fn table_has_column(
    conn: &Connection,
    table: &str,
    column: &str,
) -> rusqlite::Result<bool> {
    let columns = table_columns(conn, table)?;
    Ok(columns.iter().any(|name| name == column))
}

pub(crate) fn user_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))
}

fn object_exists(conn: &Connection, kind: &str, name: &str) -> rusqlite::Result<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = ?1 AND name = ?2
        );",
        [kind, name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
