//! Roster aggregates computed client-side from birth dates.

use crate::model::child::{PaymentStatus, PhysicalState};
use serde::Serialize;

/// Count and age aggregates over a set of children.
///
/// All fields are zero for an empty roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RosterStats {
    pub total: u32,
    pub average_age: f64,
    pub min_age: u32,
    pub max_age: u32,
    pub injured: u32,
    pub in_debt: u32,
}

/// Incremental builder for [`RosterStats`].
#[derive(Debug, Default)]
pub struct RosterAccumulator {
    total: u32,
    age_sum: u64,
    min_age: Option<u32>,
    max_age: Option<u32>,
    injured: u32,
    in_debt: u32,
}

impl RosterAccumulator {
    pub fn push(&mut self, age: u32, state: PhysicalState, payment: PaymentStatus) {
        self.total += 1;
        self.age_sum += u64::from(age);
        self.min_age = Some(self.min_age.map_or(age, |current| current.min(age)));
        self.max_age = Some(self.max_age.map_or(age, |current| current.max(age)));
        if state == PhysicalState::Lesionado {
            self.injured += 1;
        }
        if payment == PaymentStatus::EnDeuda {
            self.in_debt += 1;
        }
    }

    pub fn finish(self) -> RosterStats {
        let average_age = if self.total == 0 {
            0.0
        } else {
            self.age_sum as f64 / f64::from(self.total)
        };
        RosterStats {
            total: self.total,
            average_age,
            min_age: self.min_age.unwrap_or(0),
            max_age: self.max_age.unwrap_or(0),
            injured: self.injured,
            in_debt: self.in_debt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RosterAccumulator, RosterStats};
    use crate::model::child::{PaymentStatus, PhysicalState};

    #[test]
    fn empty_roster_is_all_zero() {
        assert_eq!(
            RosterAccumulator::default().finish(),
            RosterStats::default()
        );
    }

    #[test]
    fn accumulates_ages_and_flags() {
        let mut acc = RosterAccumulator::default();
        acc.push(8, PhysicalState::EnForma, PaymentStatus::AlDia);
        acc.push(11, PhysicalState::Lesionado, PaymentStatus::EnDeuda);
        acc.push(10, PhysicalState::EnForma, PaymentStatus::EnDeuda);

        let stats = acc.finish();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.min_age, 8);
        assert_eq!(stats.max_age, 11);
        assert!((stats.average_age - 29.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(stats.injured, 1);
        assert_eq!(stats.in_debt, 2);
    }
}
