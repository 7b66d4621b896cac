use chrono::{DateTime, Duration, Utc};
use tracing::Level;

use crate::engine::assignment::{validate_candidates, Assigner};
use crate::engine::ledger::WorkloadLedger;
use crate::error::AssignError;
use crate::models::assignment::{AssignmentOptions, AssignmentOutcome};
use crate::models::candidate::Candidate;
use crate::models::request::{
    AssignmentStatus, StaleItem, SweepEntry, SweepOutcome, TrackedAssignment,
};

/// Decides which tracked assignments a sweep should pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    pub max_assignment_age: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(Duration::hours(2))
    }
}

impl StalenessPolicy {
    pub const fn new(max_assignment_age: Duration) -> Self {
        Self { max_assignment_age }
    }

    /// Expired items, and items assigned longer ago than the max age.
    pub fn is_stale(&self, tracked: &TrackedAssignment, now: DateTime<Utc>) -> bool {
        match tracked.status {
            AssignmentStatus::Expired => true,
            AssignmentStatus::Assigned => tracked
                .assigned_at
                .is_some_and(|assigned_at| now - assigned_at > self.max_assignment_age),
            AssignmentStatus::Pending | AssignmentStatus::Completed => false,
        }
    }

    pub fn select_stale(&self, tracked: &[TrackedAssignment], now: DateTime<Utc>) -> Vec<StaleItem> {
        tracked
            .iter()
            .filter(|item| self.is_stale(item, now))
            .map(TrackedAssignment::to_stale_item)
            .collect()
    }
}

impl Assigner {
    /// Re-runs assignment for items the caller already judged stale.
    ///
    /// An item that finds no resource is reported in `expired_ids` and not
    /// retried in this call. Malformed input aborts before any item runs.
    pub fn sweep(
        &self,
        items: &[StaleItem],
        candidates: &[Candidate],
        opts: &AssignmentOptions,
        now: DateTime<Utc>,
    ) -> Result<SweepOutcome, AssignError> {
        opts.validate()?;
        validate_candidates(candidates)?;
        for item in items {
            item.origin.validate()?;
        }

        let mut ledger = WorkloadLedger::seed(candidates);
        let mut results = Vec::new();
        let mut expired_ids = Vec::new();

        for item in items {
            if let Some(prior) = item.prior_resource_id {
                ledger.release(&prior);
            }

            match self.assign_validated(&item.origin, candidates, opts, &ledger)? {
                AssignmentOutcome::Assigned(result) => {
                    ledger.record_assignment(result.resource_id);
                    self.metrics
                        .reassignments_total
                        .with_label_values(&["reassigned"])
                        .inc();
                    results.push(SweepEntry {
                        item_id: item.id,
                        previous_resource_id: item.prior_resource_id,
                        result,
                        reassigned_at: now,
                    });
                }
                AssignmentOutcome::NotFound(reason) => {
                    self.metrics
                        .reassignments_total
                        .with_label_values(&["expired"])
                        .inc();
                    self.logger.log(
                        Level::WARN,
                        "sweep item expired",
                        &[("item_id", &item.id), ("reason", &reason)],
                    );
                    expired_ids.push(item.id);
                }
            }
        }

        self.logger.log(
            Level::INFO,
            "reassignment sweep finished",
            &[
                ("reassigned", &results.len()),
                ("expired", &expired_ids.len()),
                ("total", &items.len()),
            ],
        );

        Ok(SweepOutcome {
            reassigned_count: results.len(),
            results,
            expired_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::StalenessPolicy;
    use crate::engine::assignment::Assigner;
    use crate::error::AssignError;
    use crate::models::assignment::AssignmentOptions;
    use crate::models::candidate::{Candidate, Coordinate};
    use crate::models::request::{AssignmentStatus, StaleItem, TrackedAssignment};
    use crate::observability::logging::RecordingLogger;

    fn item(seed: u128, lat: f64, lng: f64, prior: Option<u128>) -> StaleItem {
        StaleItem {
            id: Uuid::from_u128(seed),
            origin: Coordinate::new(lat, lng),
            prior_resource_id: prior.map(Uuid::from_u128),
        }
    }

    fn tracked(seed: u128, status: AssignmentStatus, minutes_ago: Option<i64>) -> TrackedAssignment {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        TrackedAssignment {
            id: Uuid::from_u128(seed),
            origin: Coordinate::new(0.0, 0.0),
            status,
            resource_id: Some(Uuid::from_u128(900)),
            assigned_at: minutes_ago.map(|m| now - Duration::minutes(m)),
        }
    }

    #[test]
    fn all_inactive_candidates_expire_every_item() {
        let logger = Arc::new(RecordingLogger::new());
        let assigner = Assigner::with_logger(logger.clone());
        let candidates = vec![
            Candidate::new(Uuid::from_u128(100), "a", Coordinate::new(0.0, 0.01), 100).inactive(),
            Candidate::new(Uuid::from_u128(200), "b", Coordinate::new(0.0, 0.02), 100).inactive(),
        ];
        let items = vec![item(1, 0.0, 0.0, Some(100)), item(2, 0.0, 0.0, None)];

        let outcome = assigner
            .sweep(&items, &candidates, &AssignmentOptions::default(), Utc::now())
            .unwrap();

        assert_eq!(outcome.reassigned_count, 0);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.expired_ids, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
        assert!(logger.contains("sweep item expired"));
    }

    #[test]
    fn per_item_failure_does_not_abort_sweep() {
        let assigner = Assigner::default();
        let candidates = vec![Candidate::new(Uuid::from_u128(100), "a", Coordinate::new(0.0, 0.01), 100)];
        let items = vec![item(1, 60.0, 60.0, None), item(2, 0.0, 0.0, Some(555))];
        let now = Utc::now();

        let outcome = assigner
            .sweep(&items, &candidates, &AssignmentOptions::default(), now)
            .unwrap();

        assert_eq!(outcome.reassigned_count, 1);
        assert_eq!(outcome.expired_ids, vec![Uuid::from_u128(1)]);
        let entry = &outcome.results[0];
        assert_eq!(entry.item_id, Uuid::from_u128(2));
        assert_eq!(entry.previous_resource_id, Some(Uuid::from_u128(555)));
        assert_eq!(entry.result.resource_id, Uuid::from_u128(100));
        assert_eq!(entry.reassigned_at, now);
    }

    #[test]
    fn releasing_prior_assignment_frees_its_workload() {
        let assigner = Assigner::default();
        // Capacity 2 makes each unit of workload worth 5 km of penalty.
        let candidates = vec![
            Candidate::new(Uuid::from_u128(100), "near", Coordinate::new(0.0, 0.009), 2)
                .with_workload(1),
            Candidate::new(Uuid::from_u128(200), "far", Coordinate::new(0.0, 0.027), 2),
        ];

        let released = assigner
            .sweep(
                &[item(1, 0.0, 0.0, Some(100))],
                &candidates,
                &AssignmentOptions::default(),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(released.results[0].result.resource_id, Uuid::from_u128(100));

        let kept = assigner
            .sweep(&[item(1, 0.0, 0.0, None)], &candidates, &AssignmentOptions::default(), Utc::now())
            .unwrap();
        assert_eq!(kept.results[0].result.resource_id, Uuid::from_u128(200));
    }

    #[test]
    fn malformed_item_aborts_before_any_work() {
        let assigner = Assigner::default();
        let candidates = vec![Candidate::new(Uuid::from_u128(100), "a", Coordinate::new(0.0, 0.01), 100)];
        let items = vec![item(1, 0.0, 0.0, None), item(2, 0.0, 200.0, None)];

        let err = assigner
            .sweep(&items, &candidates, &AssignmentOptions::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AssignError::InvalidCoordinate { .. }));
        assert_eq!(
            assigner
                .metrics()
                .reassignments_total
                .with_label_values(&["reassigned"])
                .get(),
            0
        );
    }

    #[test]
    fn staleness_policy_matches_expired_and_old_assignments() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let policy = StalenessPolicy::default();
        let items = vec![
            tracked(1, AssignmentStatus::Expired, None),
            tracked(2, AssignmentStatus::Assigned, Some(121)),
            tracked(3, AssignmentStatus::Assigned, Some(30)),
            tracked(4, AssignmentStatus::Pending, None),
            tracked(5, AssignmentStatus::Completed, Some(600)),
            tracked(6, AssignmentStatus::Assigned, None),
        ];

        let stale: Vec<Uuid> = policy.select_stale(&items, now).into_iter().map(|s| s.id).collect();

        assert_eq!(stale, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
        assert_eq!(
            policy.select_stale(&items, now)[1].prior_resource_id,
            Some(Uuid::from_u128(900))
        );
    }
}
