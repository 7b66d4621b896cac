pub mod assignment;
pub mod candidate;
pub mod request;
