use serde::{Deserialize, Serialize};
use tracing::Level;
use uuid::Uuid;

use crate::engine::assignment::Assigner;
use crate::engine::scoring::select_best;
use crate::error::AssignError;
use crate::geo::eligible_candidates;
use crate::models::assignment::{AssignmentOptions, AssignmentOutcome};
use crate::models::candidate::{Candidate, Coordinate};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveSelection {
    pub resource_id: Uuid,
    pub resource_name: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Closest,
    Dijkstra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub naive_closest: Option<NaiveSelection>,
    pub optimal: AssignmentOutcome,
    pub agree: bool,
    pub recommendation: Recommendation,
}

impl Assigner {
    /// Diagnostic: nearest eligible resource by straight line versus the
    /// scored selection. Not meant for production routing.
    pub fn compare(
        &self,
        origin: &Coordinate,
        candidates: &[Candidate],
        opts: &AssignmentOptions,
    ) -> Result<Comparison, AssignError> {
        let optimal = self.assign_one(origin, candidates, opts)?;
        let naive_closest = naive_closest(origin, candidates, opts.max_distance_km);

        let agree = match (&naive_closest, optimal.resource_id()) {
            (Some(naive), Some(optimal_id)) => naive.resource_id == optimal_id,
            (None, None) => true,
            _ => false,
        };
        let recommendation = if optimal.is_assigned() {
            Recommendation::Dijkstra
        } else {
            Recommendation::Closest
        };

        if !agree {
            self.logger.log(
                Level::INFO,
                "naive and scored selection disagree",
                &[
                    ("naive", &DisplayOption(naive_closest.as_ref().map(|n| n.resource_id))),
                    ("optimal", &DisplayOption(optimal.resource_id())),
                ],
            );
        }

        Ok(Comparison {
            naive_closest,
            optimal,
            agree,
            recommendation,
        })
    }
}

/// Plain minimum-haversine pick over the same eligible set the scorer sees.
fn naive_closest(
    origin: &Coordinate,
    candidates: &[Candidate],
    max_distance_km: f64,
) -> Option<NaiveSelection> {
    let eligible = eligible_candidates(*origin, candidates, max_distance_km)
        .map(|nearby| (nearby.candidate, nearby.distance_km));

    select_best(eligible).map(|(candidate, distance_km)| NaiveSelection {
        resource_id: candidate.id,
        resource_name: candidate.name.clone(),
        distance_km,
    })
}

struct DisplayOption(Option<Uuid>);

impl std::fmt::Display for DisplayOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("none"),
        }
    }
}
