use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::assignment::{AssignmentOutcome, AssignmentResult};
use crate::models::candidate::Coordinate;

pub const BATCH_ALGORITHM: &str = "dijkstra_batch";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub request_id: Uuid,
    pub origin: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub request_id: Uuid,
    pub outcome: AssignmentOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: Vec<BatchEntry>,
    pub assigned_count: usize,
    pub total: usize,
    /// Simulated workloads after the last request, keyed by resource.
    pub final_workloads: BTreeMap<Uuid, u32>,
    pub algorithm: String,
}

/// An item whose earlier assignment went stale or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaleItem {
    pub id: Uuid,
    pub origin: Coordinate,
    pub prior_resource_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEntry {
    pub item_id: Uuid,
    pub previous_resource_id: Option<Uuid>,
    pub result: AssignmentResult,
    pub reassigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub reassigned_count: usize,
    pub results: Vec<SweepEntry>,
    pub expired_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssignmentStatus {
    Pending,
    Assigned,
    Expired,
    Completed,
}

impl AssignmentStatus {
    /// Still waiting on the resource to act.
    pub fn is_open(self) -> bool {
        matches!(self, AssignmentStatus::Pending | AssignmentStatus::Assigned)
    }
}

/// Host-side view of an existing assignment, used to decide staleness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedAssignment {
    pub id: Uuid,
    pub origin: Coordinate,
    pub status: AssignmentStatus,
    pub resource_id: Option<Uuid>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl TrackedAssignment {
    pub fn to_stale_item(&self) -> StaleItem {
        StaleItem {
            id: self.id,
            origin: self.origin,
            prior_resource_id: self.resource_id,
        }
    }
}
