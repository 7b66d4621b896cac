use crate::models::assignment::{AssignmentOptions, ScoreBreakdown};

/// Penalty in km added for a fully loaded resource.
const WORKLOAD_PENALTY_KM: f64 = 10.0;
/// Penalty in km added for a resource with zero capacity.
const CAPACITY_PENALTY_KM: f64 = 5.0;
const REFERENCE_CAPACITY: f64 = 100.0;

/// Lower is better.
pub fn compute_score(
    distance_km: f64,
    workload: u32,
    capacity: u32,
    opts: &AssignmentOptions,
) -> (f64, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        distance_km,
        workload_penalty: if opts.consider_workload {
            workload_penalty(workload, capacity)
        } else {
            0.0
        },
        capacity_penalty: if opts.consider_capacity {
            capacity_penalty(capacity)
        } else {
            0.0
        },
    };

    (breakdown.total(), breakdown)
}

fn workload_penalty(workload: u32, capacity: u32) -> f64 {
    f64::from(workload) / f64::from(capacity.max(1)) * WORKLOAD_PENALTY_KM
}

fn capacity_penalty(capacity: u32) -> f64 {
    (1.0 - f64::from(capacity) / REFERENCE_CAPACITY) * CAPACITY_PENALTY_KM
}

/// Minimum score wins. Ties keep the earliest item, so results follow
/// input order and stay reproducible.
pub fn select_best<T>(scored: impl IntoIterator<Item = (T, f64)>) -> Option<(T, f64)> {
    let mut best: Option<(T, f64)> = None;

    for (item, score) in scored {
        let improves = match &best {
            Some((_, best_score)) => score < *best_score,
            None => true,
        };
        if improves {
            best = Some((item, score));
        }
    }

    best
}
