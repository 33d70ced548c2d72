//! Orchestration for dmfinder: the per-company pipeline, contact
//! normalization, and the chunked batch scheduler.

pub mod normalize;
pub mod pipeline;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use normalize::{normalize, validate_linkedin_url};
pub use pipeline::CompanyPipeline;
pub use scheduler::{BatchScheduler, RunProgress, RunSummary, SilentProgress};
