//! Child repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, bulk import and aggregate queries over `children`.
//! - Derive `edad` from `fecha_nacimiento` for every row read.
//!
//! # Invariants
//! - Names are whitespace-normalized and birth dates written as `YYYY-MM-DD`
//!   on every write path, including bulk import.
//! - A write referencing a missing team fails with `UnknownTeam`.
//! - Listings are ordered by `apellido, nombre, id`.

use crate::model::age::{age_on, format_birth_date, parse_birth_date, today_local};
use crate::model::child::{
    normalize_person_name, Child, ChildId, NewChild, PaymentStatus, PhysicalState,
};
use crate::model::stats::{RosterAccumulator, RosterStats};
use crate::model::team::TeamId;
use crate::repo::{
    ensure_connection_ready, is_foreign_key_violation, parse_timestamp, RepoError, RepoResult,
    NOW_SQL,
};
use chrono::NaiveDate;
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const CHILD_SELECT_SQL: &str = "SELECT
    c.id,
    c.nombre,
    c.apellido,
    c.fecha_nacimiento,
    c.estado_fisico,
    c.condicion_pago,
    c.team_id,
    t.nombre AS team_nombre,
    t.color AS team_color,
    c.created_at,
    c.updated_at
FROM children c
LEFT JOIN teams t ON t.id = c.team_id";

const CHILD_ORDER_SQL: &str =
    "ORDER BY c.apellido COLLATE NOCASE ASC, c.nombre COLLATE NOCASE ASC, c.id ASC";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("teams", &["id", "nombre", "color"]),
    (
        "children",
        &[
            "id",
            "nombre",
            "apellido",
            "fecha_nacimiento",
            "estado_fisico",
            "condicion_pago",
            "team_id",
            "created_at",
            "updated_at",
        ],
    ),
];

/// Outcome of a bulk import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    /// Input positions skipped because their `team_id` does not exist.
    pub skipped_unknown_team: Vec<usize>,
}

/// Repository interface for child operations.
pub trait ChildRepository {
    fn list_children(&self) -> RepoResult<Vec<Child>>;
    fn list_children_by_team(&self, team_id: TeamId) -> RepoResult<Vec<Child>>;
    fn get_child(&self, id: ChildId) -> RepoResult<Option<Child>>;
    /// Normalizes and inserts one child; returns the stored row with age.
    fn create_child(&self, child: &NewChild) -> RepoResult<Child>;
    /// Full replace of mutable fields; `None` when `id` does not exist.
    fn update_child(&self, id: ChildId, child: &NewChild) -> RepoResult<Option<Child>>;
    /// Physical delete; `false` when `id` does not exist.
    fn delete_child(&self, id: ChildId) -> RepoResult<bool>;
    /// Removes every child row regardless of team; returns removed count.
    fn delete_all_children(&self) -> RepoResult<usize>;
    /// Count and age aggregates across all children.
    fn child_stats(&self) -> RepoResult<RosterStats>;
    /// Inserts a batch in one transaction, skipping rows with unknown teams.
    fn import_children(&self, rows: &[NewChild]) -> RepoResult<ImportSummary>;
}

/// SQLite-backed child repository.
pub struct SqliteChildRepository<'conn> {
    conn: &'conn Connection,
    today: NaiveDate,
}

impl<'conn> SqliteChildRepository<'conn> {
    /// Creates repository from a bootstrapped connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_today(conn, today_local())
    }

    /// Creates repository that derives ages relative to `today`.
    pub fn with_today(conn: &'conn Connection, today: NaiveDate) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn, today })
    }

    fn query_children(&self, filter: &str, team_id: Option<TeamId>) -> RepoResult<Vec<Child>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHILD_SELECT_SQL} {filter} {CHILD_ORDER_SQL};"))?;
        let mut rows = match team_id {
            Some(team_id) => stmt.query([team_id])?,
            None => stmt.query([])?,
        };
        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            children.push(parse_child_row(row, self.today)?);
        }
        Ok(children)
    }

    fn load_child(&self, id: ChildId) -> RepoResult<Option<Child>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHILD_SELECT_SQL} WHERE c.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_child_row(row, self.today)?));
        }
        Ok(None)
    }
}

impl ChildRepository for SqliteChildRepository<'_> {
    fn list_children(&self) -> RepoResult<Vec<Child>> {
        self.query_children("", None)
    }

    fn list_children_by_team(&self, team_id: TeamId) -> RepoResult<Vec<Child>> {
        self.query_children("WHERE c.team_id = ?1", Some(team_id))
    }

    fn get_child(&self, id: ChildId) -> RepoResult<Option<Child>> {
        self.load_child(id)
    }

    fn create_child(&self, child: &NewChild) -> RepoResult<Child> {
        let id = insert_child(self.conn, child)?;
        self.load_child(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("inserted child {id} not readable")))
    }

    fn update_child(&self, id: ChildId, child: &NewChild) -> RepoResult<Option<Child>> {
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE children
                     SET
                        nombre = ?2,
                        apellido = ?3,
                        fecha_nacimiento = ?4,
                        estado_fisico = ?5,
                        condicion_pago = ?6,
                        team_id = ?7,
                        updated_at = {NOW_SQL}
                     WHERE id = ?1;"
                ),
                params![
                    id,
                    normalize_person_name(&child.nombre),
                    normalize_person_name(&child.apellido),
                    format_birth_date(child.fecha_nacimiento),
                    child.estado_fisico.as_str(),
                    child.condicion_pago.as_str(),
                    child.team_id,
                ],
            )
            .map_err(|err| map_child_write_error(err, child.team_id))?;

        if changed == 0 {
            return Ok(None);
        }
        self.load_child(id)
    }

    fn delete_child(&self, id: ChildId) -> RepoResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM children WHERE id = ?1;", [id])?;
        Ok(removed > 0)
    }

    fn delete_all_children(&self) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM children;", [])?;
        info!("event=child_delete_all module=repo status=ok removed={removed}");
        Ok(removed)
    }

    fn child_stats(&self) -> RepoResult<RosterStats> {
        let mut stmt = self
            .conn
            .prepare("SELECT fecha_nacimiento, estado_fisico, condicion_pago FROM children;")?;
        let mut rows = stmt.query([])?;
        let mut acc = RosterAccumulator::default();
        while let Some(row) = rows.next()? {
            let birth: String = row.get(0)?;
            let state: String = row.get(1)?;
            let payment: String = row.get(2)?;
            let (age, state, payment) = roster_entry(&birth, &state, &payment, self.today)?;
            acc.push(age, state, payment);
        }
        Ok(acc.finish())
    }

    fn import_children(&self, rows: &[NewChild]) -> RepoResult<ImportSummary> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut summary = ImportSummary::default();

        for (index, child) in rows.iter().enumerate() {
            if !team_exists(&tx, child.team_id)? {
                summary.skipped_unknown_team.push(index);
                continue;
            }
            insert_child(&tx, child)?;
            summary.inserted += 1;
        }

        tx.commit()?;
        info!(
            "event=child_bulk_import module=repo status=ok inserted={} skipped={}",
            summary.inserted,
            summary.skipped_unknown_team.len()
        );
        Ok(summary)
    }
}

/// Parses the per-child fields that aggregates need.
pub(crate) fn roster_entry(
    birth: &str,
    state: &str,
    payment: &str,
    today: NaiveDate,
) -> RepoResult<(u32, PhysicalState, PaymentStatus)> {
    let birth = parse_stored_birth_date(birth)?;
    Ok((
        age_on(birth, today),
        parse_stored_state(state)?,
        parse_stored_payment(payment)?,
    ))
}

fn insert_child(conn: &Connection, child: &NewChild) -> RepoResult<ChildId> {
    conn.execute(
        "INSERT INTO children (
            nombre,
            apellido,
            fecha_nacimiento,
            estado_fisico,
            condicion_pago,
            team_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            normalize_person_name(&child.nombre),
            normalize_person_name(&child.apellido),
            format_birth_date(child.fecha_nacimiento),
            child.estado_fisico.as_str(),
            child.condicion_pago.as_str(),
            child.team_id,
        ],
    )
    .map_err(|err| map_child_write_error(err, child.team_id))?;
    Ok(conn.last_insert_rowid())
}

fn team_exists(conn: &Connection, team_id: TeamId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM teams WHERE id = ?1);",
        [team_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_child_row(row: &Row<'_>, today: NaiveDate) -> RepoResult<Child> {
    let birth_text: String = row.get("fecha_nacimiento")?;
    let fecha_nacimiento = parse_stored_birth_date(&birth_text)?;
    let state_text: String = row.get("estado_fisico")?;
    let payment_text: String = row.get("condicion_pago")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Child {
        id: row.get("id")?,
        nombre: row.get("nombre")?,
        apellido: row.get("apellido")?,
        fecha_nacimiento,
        edad: age_on(fecha_nacimiento, today),
        estado_fisico: parse_stored_state(&state_text)?,
        condicion_pago: parse_stored_payment(&payment_text)?,
        team_id: row.get("team_id")?,
        team_nombre: row.get("team_nombre")?,
        team_color: row.get("team_color")?,
        created_at: parse_timestamp(&created_at, "children.created_at")?,
        updated_at: parse_timestamp(&updated_at, "children.updated_at")?,
    })
}

fn parse_stored_birth_date(value: &str) -> RepoResult<NaiveDate> {
    parse_birth_date(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid date `{value}` in children.fecha_nacimiento"))
    })
}

fn parse_stored_state(value: &str) -> RepoResult<PhysicalState> {
    PhysicalState::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid value `{value}` in children.estado_fisico"))
    })
}

fn parse_stored_payment(value: &str) -> RepoResult<PaymentStatus> {
    PaymentStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid value `{value}` in children.condicion_pago"))
    })
}

fn map_child_write_error(err: rusqlite::Error, team_id: TeamId) -> RepoError {
    if is_foreign_key_violation(&err) {
        RepoError::UnknownTeam(team_id)
    } else {
        err.into()
    }
}
