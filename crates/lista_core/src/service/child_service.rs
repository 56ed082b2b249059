//! Child use-case service.
//!
//! # Responsibility
//! - Validate child payloads before create/update/import.
//! - Report per-row outcomes for spreadsheet-style bulk imports.

use crate::model::child::{Child, ChildId, NewChild};
use crate::model::stats::RosterStats;
use crate::model::team::TeamId;
use crate::repo::child_repo::ChildRepository;
use crate::service::input::ChildInput;
use crate::service::{ServiceError, ServiceResult};

/// One import row that was not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// Position in the submitted batch.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub rejected: Vec<RejectedRow>,
}

pub struct ChildService<R: ChildRepository> {
    repo: R,
}

impl<R: ChildRepository> ChildService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all children, or only those of `team_id` when given.
    pub fn list_children(&self, team_id: Option<TeamId>) -> ServiceResult<Vec<Child>> {
        let children = match team_id {
            Some(team_id) => self.repo.list_children_by_team(team_id)?,
            None => self.repo.list_children()?,
        };
        Ok(children)
    }

    pub fn get_child(&self, id: ChildId) -> ServiceResult<Child> {
        self.repo
            .get_child(id)?
            .ok_or(ServiceError::ChildNotFound(id))
    }

    pub fn create_child(&self, input: &ChildInput) -> ServiceResult<Child> {
        let child = input.validate()?;
        Ok(self.repo.create_child(&child)?)
    }

    pub fn update_child(&self, id: ChildId, input: &ChildInput) -> ServiceResult<Child> {
        let child = input.validate()?;
        self.repo
            .update_child(id, &child)?
            .ok_or(ServiceError::ChildNotFound(id))
    }

    pub fn delete_child(&self, id: ChildId) -> ServiceResult<()> {
        if self.repo.delete_child(id)? {
            Ok(())
        } else {
            Err(ServiceError::ChildNotFound(id))
        }
    }

    pub fn delete_all_children(&self) -> ServiceResult<usize> {
        Ok(self.repo.delete_all_children()?)
    }

    pub fn child_stats(&self) -> ServiceResult<RosterStats> {
        Ok(self.repo.child_stats()?)
    }

    /// Validates every row, stores the valid ones in one batch and reports
    /// the rest by their original position.
    pub fn import_children(&self, rows: &[ChildInput]) -> ServiceResult<ImportReport> {
        let mut report = ImportReport::default();
        let mut accepted: Vec<NewChild> = Vec::new();
        let mut positions: Vec<usize> = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            match row.validate() {
                Ok(child) => {
                    accepted.push(child);
                    positions.push(index);
                }
                Err(err) => report.rejected.push(RejectedRow {
                    index,
                    reason: err.to_string(),
                }),
            }
        }

        let summary = self.repo.import_children(&accepted)?;
        report.inserted = summary.inserted;
        for skipped in summary.skipped_unknown_team {
            let index = positions[skipped];
            report.rejected.push(RejectedRow {
                index,
                reason: format!("team not found: {}", accepted[skipped].team_id),
            });
        }
        report.rejected.sort_by_key(|row| row.index);

        Ok(report)
    }
}
