use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::models::candidate::Candidate;

/// Where the scorer reads a candidate's current workload from.
pub trait WorkloadSource {
    fn workload_of(&self, candidate: &Candidate) -> u32;
}

/// Reads the workload the caller put on the candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerWorkloads;

impl WorkloadSource for CallerWorkloads {
    fn workload_of(&self, candidate: &Candidate) -> u32 {
        candidate.workload
    }
}

/// Call-scoped simulated workloads for a batch or sweep.
///
/// Seeded from the candidates, then mutated as assignments are made. The
/// caller's candidates are copied, never referenced.
#[derive(Debug, Clone, Default)]
pub struct WorkloadLedger {
    workloads: HashMap<Uuid, u32>,
}

impl WorkloadLedger {
    pub fn seed(candidates: &[Candidate]) -> Self {
        Self {
            workloads: candidates
                .iter()
                .map(|candidate| (candidate.id, candidate.workload))
                .collect(),
        }
    }

    pub fn get(&self, resource_id: &Uuid) -> Option<u32> {
        self.workloads.get(resource_id).copied()
    }

    /// Returns the new simulated workload.
    pub fn record_assignment(&mut self, resource_id: Uuid) -> u32 {
        let entry = self.workloads.entry(resource_id).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }

    /// Gives back one unit of workload; never drops below zero.
    pub fn release(&mut self, resource_id: &Uuid) -> Option<u32> {
        self.workloads.get_mut(resource_id).map(|entry| {
            *entry = entry.saturating_sub(1);
            *entry
        })
    }

    pub fn snapshot(&self) -> BTreeMap<Uuid, u32> {
        self.workloads.iter().map(|(id, load)| (*id, *load)).collect()
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }
}

impl WorkloadSource for WorkloadLedger {
    fn workload_of(&self, candidate: &Candidate) -> u32 {
        self.get(&candidate.id).unwrap_or(candidate.workload)
    }
}
