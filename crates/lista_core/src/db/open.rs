//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by repository behavior.
//! - Run schema bootstrap before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have every migration step applied.
//! - Unreachable or non-SQLite files surface as `DbError::Connection`.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const IN_MEMORY_PATH: &str = ":memory:";

/// Connection tuning applied during bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Opens a SQLite database file and brings its schema up to date.
///
/// # Side effects
/// - Creates the file when it does not exist yet.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with(path, &OpenOptions::default())
}

/// Same as [`open_db`] with explicit connection options.
pub fn open_db_with(path: impl AsRef<Path>, options: &OpenOptions) -> DbResult<Connection> {
    let path = path.as_ref();
    let connect = || Connection::open(path);
    open_with_mode("file", path.to_path_buf(), options, connect)
}

/// Opens an in-memory SQLite database and applies the schema.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with_mode(
        "memory",
        PathBuf::from(IN_MEMORY_PATH),
        &OpenOptions::default(),
        Connection::open_in_memory,
    )
}

fn open_with_mode(
    mode: &str,
    path: PathBuf,
    options: &OpenOptions,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match connect().and_then(|conn| probe(&conn).map(|()| conn)) {
        Ok(conn) => conn,
        Err(source) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                source
            );
            return Err(DbError::Connection { path, source });
        }
    };

    match bootstrap_connection(&mut conn, options) {
        Ok(applied) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={} migrated_steps={}",
                mode,
                started_at.elapsed().as_millis(),
                applied
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Forces SQLite to read the file header so corrupt files fail here.
fn probe(conn: &Connection) -> rusqlite::Result<()> {
    let _count: i64 = conn.query_row("SELECT count(*) FROM sqlite_master;", [], |row| row.get(0))?;
    Ok(())
}

fn bootstrap_connection(conn: &mut Connection, options: &OpenOptions) -> DbResult<usize> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(options.busy_timeout)?;
    let applied = apply_migrations(conn)?;
    Ok(applied.len())
}
