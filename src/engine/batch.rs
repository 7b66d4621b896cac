use std::collections::HashSet;

use tracing::Level;

use crate::engine::assignment::{validate_candidates, Assigner};
use crate::engine::ledger::WorkloadLedger;
use crate::error::AssignError;
use crate::models::assignment::AssignmentOptions;
use crate::models::candidate::Candidate;
use crate::models::request::{BatchEntry, BatchOutcome, BatchRequest, BATCH_ALGORITHM};

impl Assigner {
    /// Assigns requests strictly in input order.
    ///
    /// Each success bumps the chosen resource's simulated workload by one, so
    /// later requests in the same batch see the extra load. Reordering the
    /// requests can therefore change the outcome.
    pub fn assign_batch(
        &self,
        requests: &[BatchRequest],
        candidates: &[Candidate],
        opts: &AssignmentOptions,
    ) -> Result<BatchOutcome, AssignError> {
        opts.validate()?;
        validate_candidates(candidates)?;
        validate_requests(requests)?;

        let mut ledger = WorkloadLedger::seed(candidates);
        let mut results = Vec::with_capacity(requests.len());
        let mut assigned_count = 0;

        for request in requests {
            let outcome = self.assign_validated(&request.origin, candidates, opts, &ledger)?;

            if let Some(resource_id) = outcome.resource_id() {
                let workload = ledger.record_assignment(resource_id);
                assigned_count += 1;
                self.logger.log(
                    Level::DEBUG,
                    "ledger workload incremented",
                    &[("resource_id", &resource_id), ("workload", &workload)],
                );
            }

            results.push(BatchEntry {
                request_id: request.request_id,
                outcome,
            });
        }

        let final_workloads = ledger.snapshot();
        for (resource_id, workload) in &final_workloads {
            self.metrics
                .ledger_workload
                .with_label_values(&[&resource_id.to_string()])
                .set(f64::from(*workload));
        }

        self.logger.log(
            Level::INFO,
            "batch assignment finished",
            &[("assigned", &assigned_count), ("total", &requests.len())],
        );

        Ok(BatchOutcome {
            results,
            assigned_count,
            total: requests.len(),
            final_workloads,
            algorithm: BATCH_ALGORITHM.to_string(),
        })
    }
}

fn validate_requests(requests: &[BatchRequest]) -> Result<(), AssignError> {
    let mut seen = HashSet::with_capacity(requests.len());
    for request in requests {
        request.origin.validate()?;
        if !seen.insert(request.request_id) {
            return Err(AssignError::DuplicateRequest(request.request_id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use crate::engine::assignment::Assigner;
    use crate::error::AssignError;
    use crate::models::assignment::{AssignmentOptions, AssignmentOutcome, NotFoundReason};
    use crate::models::candidate::{Candidate, Coordinate};
    use crate::models::request::BatchRequest;
    use crate::observability::logging::NoopLogger;

    fn assigner() -> Assigner {
        Assigner::with_logger(Arc::new(NoopLogger))
    }

    fn request(seed: u128, lat: f64, lng: f64) -> BatchRequest {
        BatchRequest {
            request_id: Uuid::from_u128(seed),
            origin: Coordinate::new(lat, lng),
        }
    }

    // Along the equator one degree of longitude is ~111.19 km.
    fn x_and_y() -> Vec<Candidate> {
        vec![
            Candidate::new(Uuid::from_u128(100), "X", Coordinate::new(0.0, 0.009), 100),
            Candidate::new(Uuid::from_u128(200), "Y", Coordinate::new(0.0, 0.045), 100),
        ]
    }

    #[test]
    fn ledger_increment_does_not_disqualify_closer_resource() {
        let candidates = x_and_y();
        let requests = vec![request(1, 0.0, 0.0), request(2, 0.0, 0.0)];

        let outcome = assigner()
            .assign_batch(&requests, &candidates, &AssignmentOptions::default())
            .unwrap();

        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.assigned_count, 2);
        let first = outcome.results[0].outcome.assigned().unwrap();
        let second = outcome.results[1].outcome.assigned().unwrap();
        assert_eq!(first.resource_id, Uuid::from_u128(100));
        assert_eq!(second.resource_id, Uuid::from_u128(100));
        assert!((second.score - first.score - 0.1).abs() < 1e-9);
        assert_eq!(outcome.final_workloads[&Uuid::from_u128(100)], 2);
        assert_eq!(outcome.final_workloads[&Uuid::from_u128(200)], 0);
        assert_eq!(candidates[0].workload, 0);
    }

    #[test]
    fn ledger_pressure_eventually_moves_requests() {
        // Tight capacity makes each assignment to X cost 10/2 = 5 km of penalty.
        let candidates = vec![
            Candidate::new(Uuid::from_u128(100), "X", Coordinate::new(0.0, 0.009), 2),
            Candidate::new(Uuid::from_u128(200), "Y", Coordinate::new(0.0, 0.018), 2),
        ];
        let requests = vec![request(1, 0.0, 0.0), request(2, 0.0, 0.0)];

        let outcome = assigner()
            .assign_batch(&requests, &candidates, &AssignmentOptions::default())
            .unwrap();

        let picks: Vec<_> = outcome.results.iter().map(|e| e.outcome.resource_id()).collect();
        assert_eq!(picks, vec![Some(Uuid::from_u128(100)), Some(Uuid::from_u128(200))]);
    }

    #[test]
    fn failed_requests_are_aggregated_and_leave_ledger_alone() {
        let candidates = x_and_y();
        let requests = vec![request(1, 45.0, 45.0), request(2, 0.0, 0.0)];

        let outcome = assigner()
            .assign_batch(&requests, &candidates, &AssignmentOptions::default())
            .unwrap();

        assert_eq!(outcome.assigned_count, 1);
        assert!(matches!(
            outcome.results[0].outcome,
            AssignmentOutcome::NotFound(NotFoundReason::NoCandidatesInRadius)
        ));
        assert_eq!(outcome.results[0].request_id, Uuid::from_u128(1));
        assert_eq!(outcome.final_workloads[&Uuid::from_u128(100)], 1);
        assert_eq!(outcome.algorithm, "dijkstra_batch");
    }

    #[test]
    fn invalid_origin_rejects_whole_batch() {
        let requests = vec![request(1, 0.0, 0.0), request(2, f64::NAN, 0.0)];
        let err = assigner()
            .assign_batch(&requests, &x_and_y(), &AssignmentOptions::default())
            .unwrap_err();
        assert!(matches!(err, AssignError::InvalidCoordinate { .. }));
    }

    #[test]
    fn duplicate_request_ids_are_rejected() {
        let requests = vec![request(1, 0.0, 0.0), request(1, 0.0, 0.0)];
        let err = assigner()
            .assign_batch(&requests, &x_and_y(), &AssignmentOptions::default())
            .unwrap_err();
        assert!(matches!(err, AssignError::DuplicateRequest(_)));
    }

    #[test]
    fn empty_batch_reports_zero_totals() {
        let outcome = assigner()
            .assign_batch(&[], &x_and_y(), &AssignmentOptions::default())
            .unwrap();
        assert_eq!(outcome.total, 0);
        assert_eq!(outcome.assigned_count, 0);
        assert!(outcome.results.is_empty());
    }
}
