//! Conversion jobs and the registry that tracks them

mod registry;
mod types;

pub use registry::JobRegistry;
pub use types::{CrawlJob, JobId, JobStatus, JobStatusView, PageResult, ProgressSnapshot};
