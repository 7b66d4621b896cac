use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::Level;

use crate::engine::ledger::{CallerWorkloads, WorkloadSource};
use crate::engine::scoring::{compute_score, select_best};
use crate::error::AssignError;
use crate::geo::{eligible_candidates, road_distance_estimate};
use crate::graph::dijkstra::{shortest_paths, ShortestPaths};
use crate::graph::{CoordinateGraph, GraphNode, NodeAttributes, NodeId};
use crate::models::assignment::{
    AlgorithmTag, AssignmentOptions, AssignmentOutcome, AssignmentReason, AssignmentResult,
    NotFoundReason,
};
use crate::models::candidate::{Candidate, Coordinate};
use crate::observability::logging::{Logger, TracingLogger};
use crate::observability::metrics::Metrics;

/// Entry point for every matching operation.
///
/// Holds only injected collaborators; all per-call state (graphs, ledgers)
/// lives inside the call.
#[derive(Clone)]
pub struct Assigner {
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) metrics: Metrics,
}

impl Default for Assigner {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogger), Metrics::new())
    }
}

impl Assigner {
    pub fn new(logger: Arc<dyn Logger>, metrics: Metrics) -> Self {
        Self { logger, metrics }
    }

    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self::new(logger, Metrics::new())
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Picks the best resource for one origin.
    ///
    /// Returns `NotFound` as a value when nothing is eligible; only malformed
    /// input or a broken invariant is an `Err`.
    pub fn assign_one(
        &self,
        origin: &Coordinate,
        candidates: &[Candidate],
        opts: &AssignmentOptions,
    ) -> Result<AssignmentOutcome, AssignError> {
        opts.validate()?;
        origin.validate()?;
        validate_candidates(candidates)?;

        self.assign_validated(origin, candidates, opts, &CallerWorkloads)
    }

    /// Shared pipeline for single, batch and sweep calls. Inputs must already be validated.
    pub(crate) fn assign_validated(
        &self,
        origin: &Coordinate,
        candidates: &[Candidate],
        opts: &AssignmentOptions,
        workloads: &dyn WorkloadSource,
    ) -> Result<AssignmentOutcome, AssignError> {
        let start = Instant::now();
        let outcome = self.select(origin, candidates, opts, workloads);
        let elapsed = start.elapsed().as_secs_f64();

        match &outcome {
            Ok(found) => self.metrics.record_assignment(found.outcome_label(), elapsed),
            Err(err) => {
                self.metrics.record_assignment("error", elapsed);
                if err.is_internal() {
                    self.logger.log(
                        Level::ERROR,
                        "assignment invariant violated",
                        &[("error", err)],
                    );
                }
            }
        }

        outcome
    }

    fn select(
        &self,
        origin: &Coordinate,
        candidates: &[Candidate],
        opts: &AssignmentOptions,
        workloads: &dyn WorkloadSource,
    ) -> Result<AssignmentOutcome, AssignError> {
        let survivors: Vec<(&Candidate, f64)> =
            eligible_candidates(*origin, candidates, opts.max_distance_km)
                .map(|nearby| (nearby.candidate, nearby.distance_km))
                .collect();

        self.metrics.candidates_in_radius.observe(survivors.len() as f64);
        self.logger.log(
            Level::DEBUG,
            "radius prefilter applied",
            &[
                ("candidates", &candidates.len()),
                ("in_radius", &survivors.len()),
                ("max_distance_km", &opts.max_distance_km),
            ],
        );

        let outcome = match survivors.as_slice() {
            [] => AssignmentOutcome::NotFound(NotFoundReason::NoCandidatesInRadius),
            [(candidate, distance_km)] => {
                AssignmentOutcome::Assigned(only_candidate(candidate, *distance_km, opts, workloads))
            }
            _ => self.solve(origin, &survivors, opts, workloads)?,
        };

        match &outcome {
            AssignmentOutcome::Assigned(result) => self.logger.log(
                Level::INFO,
                "resource assigned",
                &[
                    ("resource_id", &result.resource_id),
                    ("resource_name", &result.resource_name),
                    ("distance_km", &result.distance_km),
                    ("score", &result.score),
                    ("algorithm", &result.algorithm),
                ],
            ),
            AssignmentOutcome::NotFound(reason) => self.logger.log(
                Level::WARN,
                "no resource assigned",
                &[("reason", reason), ("max_distance_km", &opts.max_distance_km)],
            ),
        }

        Ok(outcome)
    }

    fn solve(
        &self,
        origin: &Coordinate,
        survivors: &[(&Candidate, f64)],
        opts: &AssignmentOptions,
        workloads: &dyn WorkloadSource,
    ) -> Result<AssignmentOutcome, AssignError> {
        let nodes = std::iter::once(GraphNode::origin(*origin)).chain(survivors.iter().map(
            |(candidate, _)| {
                GraphNode::resource(
                    candidate.id,
                    candidate.location,
                    NodeAttributes {
                        workload: workloads.workload_of(candidate),
                        capacity: candidate.capacity,
                    },
                )
            },
        ));
        let graph = CoordinateGraph::build_fully_connected(nodes)?;
        let paths = shortest_paths(&graph, &NodeId::Origin)?;

        score_solved(&paths, survivors, opts, workloads)
    }
}

/// Scores every survivor the solver reached; survivors left at +inf are skipped.
fn score_solved(
    paths: &ShortestPaths,
    survivors: &[(&Candidate, f64)],
    opts: &AssignmentOptions,
    workloads: &dyn WorkloadSource,
) -> Result<AssignmentOutcome, AssignError> {
    let mut scored = Vec::with_capacity(survivors.len());
    for (candidate, distance_km) in survivors {
        let node = NodeId::Resource(candidate.id);
        let road_distance_km = paths
            .distance_to(&node)
            .ok_or(AssignError::UnknownNode(node))?;
        if !road_distance_km.is_finite() {
            continue;
        }

        let (score, breakdown) = compute_score(
            road_distance_km,
            workloads.workload_of(candidate),
            candidate.capacity,
            opts,
        );
        let result = AssignmentResult {
            resource_id: candidate.id,
            resource_name: candidate.name.clone(),
            distance_km: *distance_km,
            road_distance_km,
            score,
            breakdown,
            reason: AssignmentReason::Optimal,
            algorithm: AlgorithmTag::Dijkstra,
        };
        scored.push((result, score));
    }

    Ok(match select_best(scored) {
        Some((result, _)) => AssignmentOutcome::Assigned(result),
        None => AssignmentOutcome::NotFound(NotFoundReason::Unreachable),
    })
}

/// A lone survivor skips the graph. A two-node graph has no detour to take,
/// so the edge weight computed here is what the solver would report.
fn only_candidate(
    candidate: &Candidate,
    distance_km: f64,
    opts: &AssignmentOptions,
    workloads: &dyn WorkloadSource,
) -> AssignmentResult {
    let road_distance_km = road_distance_estimate(distance_km);
    let (score, breakdown) = compute_score(
        road_distance_km,
        workloads.workload_of(candidate),
        candidate.capacity,
        opts,
    );

    AssignmentResult {
        resource_id: candidate.id,
        resource_name: candidate.name.clone(),
        distance_km,
        road_distance_km,
        score,
        breakdown,
        reason: AssignmentReason::OnlyCandidate,
        algorithm: AlgorithmTag::Haversine,
    }
}

pub(crate) fn validate_candidates(candidates: &[Candidate]) -> Result<(), AssignError> {
    if candidates.is_empty() {
        return Err(AssignError::NoCandidates);
    }

    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        candidate.validate()?;
        if !seen.insert(candidate.id) {
            return Err(AssignError::DuplicateCandidate(candidate.id));
        }
    }

    Ok(())
}
