//! Checks plans against the per-day booking limit.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::WorkingHours;
use crate::constants::HOURS_EPSILON;
use crate::schedule::{Assignment, SchedulePlan, is_weekend};

/// An externally supplied assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAssignment {
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub task_id: Option<i64>,
}

impl From<&Assignment> for ProposedAssignment {
    fn from(a: &Assignment) -> Self {
        ProposedAssignment {
            date: a.date,
            hours: a.hours,
            task_id: Some(a.task_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub conflicts: Vec<String>,
    pub warnings: Vec<String>,
}

/// Over-booked dates are conflicts, weekend assignments are warnings.
///
/// Conflicts are reported once per date, in order of first appearance.
pub fn validate(assignments: &[ProposedAssignment], window: &WorkingHours) -> ValidationReport {
    let mut order: Vec<NaiveDate> = Vec::new();
    let mut totals: HashMap<NaiveDate, f64> = HashMap::new();
    let mut warnings = Vec::new();

    for assignment in assignments {
        let total = totals.entry(assignment.date).or_insert_with(|| {
            order.push(assignment.date);
            0.0
        });
        *total += assignment.hours;

        if is_weekend(assignment.date) {
            warnings.push(format!("Weekend work scheduled on {}", assignment.date));
        }
    }

    let conflicts: Vec<String> = order
        .into_iter()
        .filter_map(|date| {
            let total = totals.get(&date).copied().unwrap_or(0.0);
            (total > window.hours_per_day + HOURS_EPSILON)
                .then(|| format!("Overbooked day on {}: {} hours", date, total))
        })
        .collect();

    ValidationReport {
        is_valid: conflicts.is_empty(),
        conflicts,
        warnings,
    }
}

pub fn validate_plan(plan: &SchedulePlan, window: &WorkingHours) -> ValidationReport {
    let proposed: Vec<ProposedAssignment> =
        plan.assignments.iter().map(ProposedAssignment::from).collect();
    validate(&proposed, window)
}
