//! Team repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and aggregate queries over `teams`.
//! - Guard deletion of teams that still have children assigned.
//!
//! # Invariants
//! - `list_teams` returns only `activo = 1` rows, newest first.
//! - `delete_team` counts and deletes inside one immediate transaction, so a
//!   child inserted concurrently cannot slip between the check and the delete.
//! - Name collisions surface as `UniqueConstraintViolation`, not raw SQLite errors.

use crate::model::age::today_local;
use crate::model::stats::RosterAccumulator;
use crate::model::team::{NewTeam, Team, TeamId, TeamStats};
use crate::repo::child_repo::roster_entry;
use crate::repo::{
    ensure_connection_ready, is_foreign_key_violation, is_unique_violation, parse_bool,
    parse_timestamp, RepoError, RepoResult, NOW_SQL,
};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const TEAM_SELECT_SQL: &str = "SELECT
    id,
    nombre,
    descripcion,
    color,
    activo,
    created_at,
    updated_at
FROM teams";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "teams",
        &[
            "id",
            "nombre",
            "descripcion",
            "color",
            "activo",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "children",
        &["team_id", "fecha_nacimiento", "estado_fisico", "condicion_pago"],
    ),
];

/// Repository interface for team operations.
pub trait TeamRepository {
    /// Lists visible (`activo`) teams, most recently created first.
    fn list_teams(&self) -> RepoResult<Vec<Team>>;
    /// Gets one team by id regardless of `activo`.
    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>>;
    /// Inserts a visible team and returns the stored row.
    fn create_team(&self, team: &NewTeam) -> RepoResult<Team>;
    /// Replaces `nombre/descripcion/color`; `None` when `id` does not exist.
    fn update_team(&self, id: TeamId, team: &NewTeam) -> RepoResult<Option<Team>>;
    /// Physically deletes a childless team; `false` when `id` does not exist.
    fn delete_team(&self, id: TeamId) -> RepoResult<bool>;
    /// Team row plus aggregates over its children.
    fn team_stats(&self, id: TeamId) -> RepoResult<Option<TeamStats>>;
    /// Aggregates for every visible team, in `list_teams` order.
    fn list_teams_with_stats(&self) -> RepoResult<Vec<TeamStats>>;
    /// Reassigns every child of `from` to `to`; returns moved row count.
    ///
    /// Does not check that `to` exists beyond the storage foreign key.
    fn move_children(&self, from: TeamId, to: TeamId) -> RepoResult<usize>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
    today: NaiveDate,
}

impl<'conn> SqliteTeamRepository<'conn> {
    /// Creates repository from a bootstrapped connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_today(conn, today_local())
    }

    /// Creates repository that derives ages relative to `today`.
    pub fn with_today(conn: &'conn Connection, today: NaiveDate) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn, today })
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn list_teams(&self) -> RepoResult<Vec<Team>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TEAM_SELECT_SQL}
             WHERE activo = 1
             ORDER BY created_at DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut teams = Vec::new();
        while let Some(row) = rows.next()? {
            teams.push(parse_team_row(row)?);
        }
        Ok(teams)
    }

    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>> {
        load_team(self.conn, id)
    }

    fn create_team(&self, team: &NewTeam) -> RepoResult<Team> {
        self.conn
            .execute(
                "INSERT INTO teams (nombre, descripcion, color, activo)
                 VALUES (?1, ?2, ?3, 1);",
                params![team.nombre, team.descripcion, team.color],
            )
            .map_err(|err| map_team_write_error(err, team))?;

        let id = self.conn.last_insert_rowid();
        load_team(self.conn, id)?
            .ok_or_else(|| RepoError::InvalidData(format!("inserted team {id} not readable")))
    }

    fn update_team(&self, id: TeamId, team: &NewTeam) -> RepoResult<Option<Team>> {
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE teams
                     SET
                        nombre = ?2,
                        descripcion = ?3,
                        color = ?4,
                        updated_at = {NOW_SQL}
                     WHERE id = ?1;"
                ),
                params![id, team.nombre, team.descripcion, team.color],
            )
            .map_err(|err| map_team_write_error(err, team))?;

        if changed == 0 {
            return Ok(None);
        }
        load_team(self.conn, id)
    }

    fn delete_team(&self, id: TeamId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let children: u32 = tx.query_row(
            "SELECT COUNT(*) FROM children WHERE team_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        if children > 0 {
            warn!(
                "event=team_delete_blocked module=repo status=rejected team_id={} children={}",
                id, children
            );
            return Err(RepoError::HasDependentChildren {
                team_id: id,
                children,
            });
        }

        let removed = tx.execute("DELETE FROM teams WHERE id = ?1;", [id])?;
        tx.commit()?;

        info!(
            "event=team_delete module=repo status=ok team_id={} removed={}",
            id,
            removed > 0
        );
        Ok(removed > 0)
    }

    fn team_stats(&self, id: TeamId) -> RepoResult<Option<TeamStats>> {
        let Some(team) = load_team(self.conn, id)? else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT fecha_nacimiento, estado_fisico, condicion_pago
             FROM children
             WHERE team_id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut acc = RosterAccumulator::default();
        while let Some(row) = rows.next()? {
            let birth: String = row.get("fecha_nacimiento")?;
            let state: String = row.get("estado_fisico")?;
            let payment: String = row.get("condicion_pago")?;
            let (age, state, payment) = roster_entry(&birth, &state, &payment, self.today)?;
            acc.push(age, state, payment);
        }

        Ok(Some(TeamStats {
            team,
            stats: acc.finish(),
        }))
    }

    fn list_teams_with_stats(&self) -> RepoResult<Vec<TeamStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                t.id,
                t.nombre,
                t.descripcion,
                t.color,
                t.activo,
                t.created_at,
                t.updated_at,
                c.fecha_nacimiento,
                c.estado_fisico,
                c.condicion_pago
             FROM teams t
             LEFT JOIN children c ON c.team_id = t.id
             WHERE t.activo = 1
             ORDER BY t.created_at DESC, t.id DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        let mut current: Option<(Team, RosterAccumulator)> = None;

        while let Some(row) = rows.next()? {
            let team_id: TeamId = row.get("id")?;
            if current.as_ref().map(|(team, _)| team.id) != Some(team_id) {
                if let Some((team, acc)) = current.take() {
                    result.push(TeamStats {
                        team,
                        stats: acc.finish(),
                    });
                }
                current = Some((parse_team_row(row)?, RosterAccumulator::default()));
            }

            // LEFT JOIN yields one all-NULL child row for a childless team.
            let Some(birth) = row.get::<_, Option<String>>("fecha_nacimiento")? else {
                continue;
            };
            let state: String = row.get("estado_fisico")?;
            let payment: String = row.get("condicion_pago")?;
            let (age, state, payment) = roster_entry(&birth, &state, &payment, self.today)?;
            if let Some((_, acc)) = current.as_mut() {
                acc.push(age, state, payment);
            }
        }

        if let Some((team, acc)) = current {
            result.push(TeamStats {
                team,
                stats: acc.finish(),
            });
        }
        Ok(result)
    }

    fn move_children(&self, from: TeamId, to: TeamId) -> RepoResult<usize> {
        let moved = self
            .conn
            .execute(
                &format!(
                    "UPDATE children
                     SET
                        team_id = ?2,
                        updated_at = {NOW_SQL}
                     WHERE team_id = ?1;"
                ),
                params![from, to],
            )
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    RepoError::UnknownTeam(to)
                } else {
                    err.into()
                }
            })?;

        info!(
            "event=team_move_children module=repo status=ok from={} to={} moved={}",
            from, to, moved
        );
        Ok(moved)
    }
}

fn load_team(conn: &Connection, id: TeamId) -> RepoResult<Option<Team>> {
    let mut stmt = conn.prepare(&format!("{TEAM_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_team_row(row)?));
    }
    Ok(None)
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    Ok(Team {
        id: row.get("id")?,
        nombre: row.get("nombre")?,
        descripcion: row.get("descripcion")?,
        color: row.get("color")?,
        activo: parse_bool(row.get("activo")?, "teams.activo")?,
        created_at: parse_timestamp(&created_at, "teams.created_at")?,
        updated_at: parse_timestamp(&updated_at, "teams.updated_at")?,
    })
}

fn map_team_write_error(err: rusqlite::Error, team: &NewTeam) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::UniqueConstraintViolation {
            field: "nombre",
            value: team.nombre.clone(),
        }
    } else {
        err.into()
    }
}
