//! Core data layer for the youth-sports roster ("Lista de Chicos").
//! This crate owns the schema, the team/child invariants and their validation.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
mod store;

pub use config::{AppConfig, ConfigError};
pub use db::{DbError, DbResult};
pub use logging::{
    default_log_level, init_logging, init_logging_from, logging_status, LoggingError,
};
pub use model::age::{age_on, today_local};
pub use model::child::{Child, ChildId, NewChild, PaymentStatus, PhysicalState};
pub use model::stats::RosterStats;
pub use model::team::{NewTeam, Team, TeamId, TeamStats, DEFAULT_TEAM_COLOR};
pub use repo::child_repo::{ChildRepository, ImportSummary, SqliteChildRepository};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use repo::{RepoError, RepoResult};
pub use service::child_service::{ChildService, ImportReport, RejectedRow};
pub use service::input::{ChildInput, TeamInput, ValidationError};
pub use service::team_service::TeamService;
pub use service::{ServiceError, ServiceResult};
pub use store::Store;
