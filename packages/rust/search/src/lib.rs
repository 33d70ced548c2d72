//! Web-search side of the pipeline: role-targeted query generation, the
//! fail-soft search client, and the summary formatter whose layout the
//! extraction prompt relies on.

mod client;
mod format;
mod queries;

pub use client::SearchClient;
pub use format::{HIT_SEPARATOR, QUERY_HEADER, SECTION_SEPARATOR, format_results};
pub use queries::{QUERY_ROLES, build_queries};
