//! Team use-case service.
//!
//! # Invariants
//! - Writes go through `TeamInput::validate`.
//! - Moving children requires both teams to exist and differ.

use crate::model::team::{Team, TeamId, TeamStats};
use crate::repo::team_repo::TeamRepository;
use crate::service::input::{TeamInput, ValidationError};
use crate::service::{ServiceError, ServiceResult};

pub struct TeamService<R: TeamRepository> {
    repo: R,
}

impl<R: TeamRepository> TeamService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_teams(&self) -> ServiceResult<Vec<Team>> {
        Ok(self.repo.list_teams()?)
    }

    pub fn get_team(&self, id: TeamId) -> ServiceResult<Team> {
        self.repo
            .get_team(id)?
            .ok_or(ServiceError::TeamNotFound(id))
    }

    pub fn create_team(&self, input: &TeamInput) -> ServiceResult<Team> {
        let team = input.validate()?;
        Ok(self.repo.create_team(&team)?)
    }

    pub fn update_team(&self, id: TeamId, input: &TeamInput) -> ServiceResult<Team> {
        let team = input.validate()?;
        self.repo
            .update_team(id, &team)?
            .ok_or(ServiceError::TeamNotFound(id))
    }

    /// Deletes a team with no children.
    ///
    /// Returns `TeamHasChildren` unchanged when the repository refuses.
    pub fn delete_team(&self, id: TeamId) -> ServiceResult<()> {
        if self.repo.delete_team(id)? {
            Ok(())
        } else {
            Err(ServiceError::TeamNotFound(id))
        }
    }

    pub fn team_stats(&self, id: TeamId) -> ServiceResult<TeamStats> {
        self.repo
            .team_stats(id)?
            .ok_or(ServiceError::TeamNotFound(id))
    }

    pub fn list_teams_with_stats(&self) -> ServiceResult<Vec<TeamStats>> {
        Ok(self.repo.list_teams_with_stats()?)
    }

    /// Moves every child of `from` into `to`; returns moved count.
    pub fn move_children(&self, from: TeamId, to: TeamId) -> ServiceResult<usize> {
        if from == to {
            return Err(ValidationError::SameTeam(from).into());
        }
        for id in [from, to] {
            if self.repo.get_team(id)?.is_none() {
                return Err(ServiceError::TeamNotFound(id));
            }
        }
        Ok(self.repo.move_children(from, to)?)
    }
}
