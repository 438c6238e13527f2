//! site2pdf: bind a website into a single PDF
//!
//! This crate discovers same-origin pages breadth-first from a seed URL,
//! renders each page to its own PDF, and concatenates the set into one
//! document while publishing live progress for every job.

pub mod config;
pub mod crawler;
pub mod job;
pub mod merge;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod service;
pub mod url;

use thiserror::Error;

/// Main error type for a conversion job
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Crawl failed: {0}")]
    Crawl(#[from] crawler::CrawlError),

    #[error("PDF failed for {url}: {source}")]
    Render {
        url: String,
        source: render::RenderError,
    },

    #[error("Merge failed: {0}")]
    Merge(#[from] merge::MergeError),

    #[error("Job not found: {0}")]
    NotFound(job::JobId),

    #[error("Job {id} is already {status}")]
    AlreadyClaimed {
        id: job::JobId,
        status: job::JobStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// HTTP-equivalent status class for this error
    ///
    /// Request-shape problems map to 400, unknown jobs to 404, a second run
    /// of the same job to 409, and every failure inside a running pipeline
    /// to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidUrl(_) => 400,
            Self::NotFound(_) => 404,
            Self::AlreadyClaimed { .. } => 409,
            _ => 500,
        }
    }

    /// Returns true if the error was raised before any job was created
    pub fn is_validation(&self) -> bool {
        self.status_code() == 400
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use job::{CrawlJob, JobId, JobRegistry, JobStatus, PageResult};
pub use pipeline::{ConversionRequest, JobPipeline};
pub use progress::{Phase, ProgressEvent, ProgressHub};
pub use crate::url::{parse_seed_url, sanitize_filename, Origin};
