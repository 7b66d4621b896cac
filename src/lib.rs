//! Matches requests to nearby resources (for example donation pickups to
//! NGOs) using haversine prefiltering, a shortest-path solve over estimated
//! road distances, and a workload/capacity-aware score.
//!
//! Everything is synchronous and side-effect free with respect to caller
//! data; hosts own persistence and transport.

pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod graph;
pub mod models;
pub mod observability;

pub use engine::assignment::Assigner;
pub use error::{AssignError, ErrorClass};
pub use models::assignment::{AssignmentOptions, AssignmentOutcome, AssignmentResult};
pub use models::candidate::{Candidate, Coordinate};
