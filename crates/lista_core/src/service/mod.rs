//! Use-case services over the team/child repositories.
//!
//! # Responsibility
//! - Validate raw caller input before it reaches a repository.
//! - Translate repository sentinels (`None`/`false`) into not-found errors.
//! - Keep callers decoupled from storage details.

use crate::model::child::ChildId;
use crate::model::team::TeamId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod child_service;
pub mod input;
pub mod team_service;

pub use input::ValidationError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from team/child use-case operations.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    TeamNotFound(TeamId),
    ChildNotFound(ChildId),
    DuplicateTeamName(String),
    /// Team still has children; reassign or remove them first.
    TeamHasChildren { team_id: TeamId, children: u32 },
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TeamNotFound(id) => write!(f, "team not found: {id}"),
            Self::ChildNotFound(id) => write!(f, "child not found: {id}"),
            Self::DuplicateTeamName(name) => write!(f, "a team named `{name}` already exists"),
            Self::TeamHasChildren { team_id, children } => write!(
                f,
                "team {team_id} has {children} children assigned; move or delete them first"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UniqueConstraintViolation { value, .. } => Self::DuplicateTeamName(value),
            RepoError::HasDependentChildren { team_id, children } => {
                Self::TeamHasChildren { team_id, children }
            }
            RepoError::UnknownTeam(id) => Self::TeamNotFound(id),
            other => Self::Repo(other),
        }
    }
}
