use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssignError;

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

/// Knobs for a single matching query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssignmentOptions {
    pub max_distance_km: f64,
    pub consider_workload: bool,
    pub consider_capacity: bool,
}

impl Default for AssignmentOptions {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            consider_workload: true,
            consider_capacity: true,
        }
    }
}

impl AssignmentOptions {
    /// Pure distance ranking: both penalties switched off.
    pub fn distance_only() -> Self {
        Self {
            consider_workload: false,
            consider_capacity: false,
            ..Self::default()
        }
    }

    pub fn with_max_distance_km(mut self, max_distance_km: f64) -> Self {
        self.max_distance_km = max_distance_km;
        self
    }

    pub fn validate(&self) -> Result<(), AssignError> {
        if !self.max_distance_km.is_finite() || self.max_distance_km <= 0.0 {
            return Err(AssignError::InvalidOptions(format!(
                "max_distance_km must be a positive number, got {}",
                self.max_distance_km
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub distance_km: f64,
    pub workload_penalty: f64,
    pub capacity_penalty: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.distance_km + self.workload_penalty + self.capacity_penalty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentReason {
    OnlyCandidate,
    Optimal,
}

impl AssignmentReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentReason::OnlyCandidate => "only_candidate",
            AssignmentReason::Optimal => "optimal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmTag {
    Haversine,
    Dijkstra,
}

impl AlgorithmTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmTag::Haversine => "haversine",
            AlgorithmTag::Dijkstra => "dijkstra",
        }
    }
}

impl fmt::Display for AlgorithmTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub resource_id: Uuid,
    pub resource_name: String,
    /// Straight-line distance from the origin.
    pub distance_km: f64,
    /// Shortest-path distance over the road-estimate graph. Normally equal to
    /// `road_distance_estimate(distance_km)`, but may sit a few ulp below it
    /// when another resource lies almost in line with the target.
    pub road_distance_km: f64,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub reason: AssignmentReason,
    pub algorithm: AlgorithmTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    NoCandidatesInRadius,
    Unreachable,
}

impl NotFoundReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotFoundReason::NoCandidatesInRadius => "no_candidates_in_radius",
            NotFoundReason::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either a chosen resource or the expected "nothing eligible" outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentOutcome {
    Assigned(AssignmentResult),
    NotFound(NotFoundReason),
}

impl AssignmentOutcome {
    pub fn assigned(&self) -> Option<&AssignmentResult> {
        match self {
            AssignmentOutcome::Assigned(result) => Some(result),
            AssignmentOutcome::NotFound(_) => None,
        }
    }

    pub fn into_assigned(self) -> Option<AssignmentResult> {
        match self {
            AssignmentOutcome::Assigned(result) => Some(result),
            AssignmentOutcome::NotFound(_) => None,
        }
    }

    pub fn resource_id(&self) -> Option<Uuid> {
        self.assigned().map(|result| result.resource_id)
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignmentOutcome::Assigned(_))
    }

    pub fn outcome_label(&self) -> &'static str {
        match self {
            AssignmentOutcome::Assigned(_) => "assigned",
            AssignmentOutcome::NotFound(_) => "not_found",
        }
    }
}
