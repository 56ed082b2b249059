//! Owned database handle with explicit open/close lifecycle.
//!
//! # Responsibility
//! - Own exactly one bootstrapped connection per process.
//! - Hand out repositories that borrow that connection.
//!
//! # Invariants
//! - A `Store` only exists once schema bootstrap has succeeded.
//! - `close` surfaces close failures instead of swallowing them on drop.

use crate::config::AppConfig;
use crate::db::{open_db_in_memory, open_db_with, DbError, DbResult, OpenOptions};
use crate::repo::child_repo::SqliteChildRepository;
use crate::repo::team_repo::SqliteTeamRepository;
use crate::repo::RepoResult;
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Opens (creating if needed) and bootstraps the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: &OpenOptions) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = open_db_with(path, options)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens the database configured in `config`.
    pub fn from_config(config: &AppConfig) -> DbResult<Self> {
        Self::open_with(&config.db_path, &config.open_options())
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            path: None,
        })
    }

    /// File backing this store; `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn teams(&self) -> RepoResult<SqliteTeamRepository<'_>> {
        SqliteTeamRepository::try_new(&self.conn)
    }

    pub fn children(&self) -> RepoResult<SqliteChildRepository<'_>> {
        SqliteChildRepository::try_new(&self.conn)
    }

    /// Closes the connection. Callers drain in-flight work first.
    pub fn close(self) -> DbResult<()> {
        let Self { conn, path } = self;
        conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
        info!(
            "event=db_close module=db status=ok mode={}",
            if path.is_some() { "file" } else { "memory" }
        );
        Ok(())
    }
}
