pub mod assignment;
pub mod batch;
pub mod compare;
pub mod ledger;
pub mod scoring;
pub mod stats;
pub mod sweep;
