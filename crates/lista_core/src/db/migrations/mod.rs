//! Schema bootstrap and forward migration for `teams`/`children`.
//!
//! # Responsibility
//! - Create the canonical tables on a fresh database.
//! - Detect older `children` shapes and migrate them without losing rows.
//! - Apply every pending step atomically in one transaction.
//!
//! # Invariants
//! - Steps run in registry order; each is guarded by a precondition over the
//!   live schema, so re-running bootstrap on a migrated file is a no-op.
//! - `PRAGMA user_version` is stamped in the same transaction as the steps.
//! - Age is never persisted; legacy `edad` values are converted to
//!   `fecha_nacimiento` and the column is dropped by a table rebuild.

use crate::db::introspect::{
    index_exists, table_columns, table_exists, table_has_column, user_version,
};
use crate::db::{DbError, DbResult};
use crate::model::age::{birth_date_for_age, format_birth_date, today_local};
use chrono::NaiveDate;
use log::{error, info};
use rusqlite::{params, Connection, TransactionBehavior};
use std::time::Instant;

/// Schema version written to `PRAGMA user_version` once bootstrap succeeds.
pub const SCHEMA_VERSION: u32 = 1;

/// Ages above this are treated as corrupt legacy values during backfill.
const MAX_LEGACY_AGE: i64 = 120;
const REBUILD_TABLE: &str = "children_rebuild";
const CHILDREN_TEAM_INDEX: &str = "idx_children_team_id";
/// Pseudo-step reported when stamping the version or committing fails.
const FINALIZE_STEP: &str = "stamp_schema_version";

const CHILDREN_TEAM_INDEX_DDL: &str = "CREATE INDEX idx_children_team_id ON children(team_id);";
const BACKFILL_SELECT_SQL: &str = "SELECT rowid, CAST(edad AS INTEGER) FROM children;";
const BACKFILL_UPDATE_SQL: &str = "UPDATE children SET fecha_nacimiento = ?2 WHERE rowid = ?1;";

const TEAMS_DDL: &str = "CREATE TABLE teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL UNIQUE,
    descripcion TEXT,
    color TEXT NOT NULL DEFAULT '#3B82F6',
    activo INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);";

/// Target column -> expression reading it from a legacy `children` table.
const CHILD_COPY_COLUMNS: &[(&str, &str)] = &[
    ("id", "id"),
    ("nombre", "nombre"),
    ("apellido", "apellido"),
    ("fecha_nacimiento", "fecha_nacimiento"),
    ("estado_fisico", "COALESCE(estado_fisico, 'En forma')"),
    ("condicion_pago", "COALESCE(condicion_pago, 'Al dia')"),
    (
        "team_id",
        "CASE WHEN team_id IN (SELECT id FROM teams) THEN team_id END",
    ),
    (
        "created_at",
        "COALESCE(created_at, strftime('%Y-%m-%d %H:%M:%f', 'now'))",
    ),
    (
        "updated_at",
        "COALESCE(updated_at, strftime('%Y-%m-%d %H:%M:%f', 'now'))",
    ),
];

fn children_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            apellido TEXT NOT NULL,
            fecha_nacimiento TEXT NOT NULL,
            estado_fisico TEXT NOT NULL DEFAULT 'En forma',
            condicion_pago TEXT NOT NULL DEFAULT 'Al dia',
            team_id INTEGER REFERENCES teams(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );"
    )
}

struct MigrationStep {
    name: &'static str,
    pending: fn(&Connection) -> rusqlite::Result<bool>,
    apply: fn(&Connection, NaiveDate) -> rusqlite::Result<()>,
}

const STEPS: &[MigrationStep] = &[
    MigrationStep {
        name: "create_teams",
        pending: teams_missing,
        apply: create_teams,
    },
    MigrationStep {
        name: "create_children",
        pending: children_missing,
        apply: create_children,
    },
    MigrationStep {
        name: "add_children_team_id",
        pending: children_lacks_team_id,
        apply: add_children_team_id,
    },
    MigrationStep {
        name: "derive_birth_date_from_age",
        pending: children_stores_age,
        apply: derive_birth_date_from_age,
    },
    MigrationStep {
        name: "create_children_team_index",
        pending: children_team_index_missing,
        apply: create_children_team_index,
    },
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_VERSION
}

/// Returns registered step names in execution order.
pub fn step_names() -> Vec<&'static str> {
    STEPS.iter().map(|step| step.name).collect()
}

/// Applies all pending steps using today's local date for age backfill.
///
/// Returns the names of the steps that actually ran.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<Vec<&'static str>> {
    apply_migrations_at(conn, today_local())
}

/// Applies all pending steps, deriving legacy birth dates relative to `today`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is stamped newer than this build.
/// - `Migration` naming the failing step; no step of the batch is kept.
pub fn apply_migrations_at(conn: &mut Connection, today: NaiveDate) -> DbResult<Vec<&'static str>> {
    let current_version = user_version(conn)?;
    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut applied = Vec::new();

    for step in STEPS {
        let started_at = Instant::now();
        let outcome = match (step.pending)(&tx) {
            Ok(true) => (step.apply)(&tx, today).map(|()| true),
            other => other,
        };

        match outcome {
            Ok(true) => {
                info!(
                    "event=schema_migrate module=db status=ok step={} duration_ms={}",
                    step.name,
                    started_at.elapsed().as_millis()
                );
                applied.push(step.name);
            }
            Ok(false) => {}
            Err(source) => {
                error!(
                    "event=schema_migrate module=db status=error step={} duration_ms={} error={}",
                    step.name,
                    started_at.elapsed().as_millis(),
                    source
                );
                return Err(DbError::Migration {
                    step: step.name,
                    source,
                });
            }
        }
    }

    let finalized = if current_version != SCHEMA_VERSION {
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
    } else {
        Ok(())
    };
    if let Err(source) = finalized.and_then(|()| tx.commit()) {
        error!(
            "event=schema_migrate module=db status=error step={} error={}",
            FINALIZE_STEP, source
        );
        return Err(DbError::Migration {
            step: FINALIZE_STEP,
            source,
        });
    }

    Ok(applied)
}

fn teams_missing(conn: &Connection) -> rusqlite::Result<bool> {
    Ok(!table_exists(conn, "teams")?)
}

fn create_teams(conn: &Connection, _today: NaiveDate) -> rusqlite::Result<()> {
    conn.execute_batch(TEAMS_DDL)
}

fn children_missing(conn: &Connection) -> rusqlite::Result<bool> {
    Ok(!table_exists(conn, "children")?)
}

fn create_children(conn: &Connection, _today: NaiveDate) -> rusqlite::Result<()> {
    conn.execute_batch(&children_ddl("children"))
}

fn children_lacks_team_id(conn: &Connection) -> rusqlite::Result<bool> {
    if !table_exists(conn, "children")? {
        return Ok(false);
    }
    Ok(!table_has_column(conn, "children", "team_id")?)
}

fn add_children_team_id(conn: &Connection, _today: NaiveDate) -> rusqlite::Result<()> {
    conn.execute_batch(
        "ALTER TABLE children ADD COLUMN team_id INTEGER REFERENCES teams(id) ON DELETE CASCADE;",
    )
}

fn children_stores_age(conn: &Connection) -> rusqlite::Result<bool> {
    let columns = table_columns(conn, "children")?;
    let has = |name: &str| columns.iter().any(|column| column == name);
    Ok(has("edad") && !has("fecha_nacimiento"))
}

fn derive_birth_date_from_age(conn: &Connection, today: NaiveDate) -> rusqlite::Result<()> {
    conn.execute_batch("ALTER TABLE children ADD COLUMN fecha_nacimiento TEXT;")?;
    let backfilled = backfill_birth_dates(conn, today)?;
    info!("event=schema_backfill module=db status=ok rows={backfilled}");
    rebuild_children_table(conn)
}

/// Writes `today - edad years` into `fecha_nacimiento` for every row.
///
/// Missing or out-of-range ages are clamped into `0..=MAX_LEGACY_AGE`.
fn backfill_birth_dates(conn: &Connection, today: NaiveDate) -> rusqlite::Result<usize> {
    let mut select = conn.prepare(BACKFILL_SELECT_SQL)?;
    let rows = select
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<(i64, Option<i64>)>>>()?;

    let mut update = conn.prepare(BACKFILL_UPDATE_SQL)?;
    for (rowid, age) in &rows {
        let years = age.unwrap_or(0).clamp(0, MAX_LEGACY_AGE) as u32;
        let birth = format_birth_date(birth_date_for_age(years, today));
        update.execute(params![rowid, birth])?;
    }

    Ok(rows.len())
}

/// SQLite cannot drop or retype columns in place: copy into a table with
/// the canonical shape, then swap it in under the original name.
fn rebuild_children_table(conn: &Connection) -> rusqlite::Result<()> {
    let existing = table_columns(conn, "children")?;
    let (targets, sources): (Vec<&str>, Vec<&str>) = CHILD_COPY_COLUMNS
        .iter()
        .filter(|(column, _)| existing.iter().any(|name| name == column))
        .map(|(column, expr)| (*column, *expr))
        .unzip();

    conn.execute_batch(&children_ddl(REBUILD_TABLE))?;
    conn.execute(
        &format!(
            "INSERT INTO {REBUILD_TABLE} ({}) SELECT {} FROM children;",
            targets.join(", "),
            sources.join(", ")
        ),
        [],
    )?;
    conn.execute_batch(&format!(
        "DROP TABLE children;
         ALTER TABLE {REBUILD_TABLE} RENAME TO children;"
    ))
}

fn children_team_index_missing(conn: &Connection) -> rusqlite::Result<bool> {
    if !table_exists(conn, "children")? {
        return Ok(false);
    }
    Ok(!index_exists(conn, CHILDREN_TEAM_INDEX)?)
}

fn create_children_team_index(conn: &Connection, _today: NaiveDate) -> rusqlite::Result<()> {
    conn.execute_batch(CHILDREN_TEAM_INDEX_DDL)
}
