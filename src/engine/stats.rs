use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::request::{AssignmentStatus, TrackedAssignment};

/// Per-resource assignment report built from the host's tracked assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStats {
    pub resource_id: Uuid,
    pub total_assignments: usize,
    /// Assignments still `Pending` or `Assigned`.
    pub pending_assignments: usize,
    pub status_breakdown: BTreeMap<AssignmentStatus, usize>,
    /// Share of assignments no longer open, in percent with two decimals.
    /// Zero when the resource has no assignments.
    pub efficiency_percent: f64,
}

pub fn assignment_stats(resource_id: Uuid, tracked: &[TrackedAssignment]) -> AssignmentStats {
    let mut status_breakdown = BTreeMap::new();
    let mut total_assignments = 0;
    let mut pending_assignments = 0;

    for item in tracked.iter().filter(|item| item.resource_id == Some(resource_id)) {
        total_assignments += 1;
        if item.status.is_open() {
            pending_assignments += 1;
        }
        *status_breakdown.entry(item.status).or_insert(0) += 1;
    }

    AssignmentStats {
        resource_id,
        total_assignments,
        pending_assignments,
        status_breakdown,
        efficiency_percent: efficiency_percent(total_assignments, pending_assignments),
    }
}

fn efficiency_percent(total: usize, pending: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = (total - pending) as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
