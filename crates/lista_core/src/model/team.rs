//! Team domain model.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes.
//! - `nombre` is unique across all teams (case-sensitive).
//! - `activo` only filters list queries; deletion is physical.

use crate::model::stats::RosterStats;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage-assigned team identifier.
pub type TeamId = i64;

/// Color used when a team is created without one.
pub const DEFAULT_TEAM_COLOR: &str = "#3B82F6";

/// Persisted team row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub nombre: String,
    pub descripcion: Option<String>,
    /// `#RRGGBB` hex color.
    pub color: String,
    /// Visibility flag for list queries.
    pub activo: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Mutable team fields, used for both create and full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub color: String,
}

impl NewTeam {
    /// Creates a team payload with no description and the default color.
    pub fn new(nombre: impl Into<String>) -> Self {
        Self {
            nombre: nombre.into(),
            descripcion: None,
            color: DEFAULT_TEAM_COLOR.to_string(),
        }
    }
}

/// Team row together with aggregates over its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStats {
    #[serde(flatten)]
    pub team: Team,
    pub stats: RosterStats,
}
