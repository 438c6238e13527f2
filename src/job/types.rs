/// Job definitions for tracking a conversion from request to merged output
use crate::progress::ProgressEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier for a conversion job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a conversion job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    // ===== Active States =====
    /// Accepted and registered, pipeline not yet running
    Started,

    /// Discovering same-origin pages
    Crawling,

    /// Printing discovered pages one at a time
    RenderingPages,

    /// Concatenating page PDFs
    Merging,

    // ===== Terminal States =====
    /// `merged.pdf` written
    Completed,

    /// Stopped on a render, merge or I/O error
    Failed,
}

impl JobStatus {
    /// Returns true once the job can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns the string representation used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Crawling => "crawling",
            Self::RenderingPages => "rendering_pages",
            Self::Merging => "merging",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of rendering one discovered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub page_url: String,

    /// Path relative to the output root, e.g. `<job id>/page_1.pdf`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,

    pub video_detected: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    pub fn rendered(page_url: impl Into<String>, pdf: impl Into<String>, video: bool) -> Self {
        Self {
            page_url: page_url.into(),
            pdf: Some(pdf.into()),
            video_detected: video,
            error: None,
        }
    }

    pub fn failed(page_url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            pdf: None,
            video_detected: false,
            error: Some(error.into()),
        }
    }
}

/// Last progress reported for a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub current_url: String,
    pub message: String,
}

/// A conversion job as held by the registry
#[derive(Debug, Clone)]
pub struct CrawlJob {
    pub id: JobId,
    pub seed_url: String,

    /// ASCII serialization of the seed's scheme, host and port
    pub origin: String,

    pub page_budget: usize,
    pub status: JobStatus,
    pub pages: Vec<PageResult>,
    pub progress: ProgressSnapshot,
    pub merged_pdf: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CrawlJob {
    pub fn new(
        id: JobId,
        seed_url: impl Into<String>,
        origin: impl Into<String>,
        page_budget: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            seed_url: seed_url.into(),
            origin: origin.into(),
            page_budget,
            status: JobStatus::Started,
            pages: Vec::new(),
            progress: ProgressSnapshot::default(),
            merged_pdf: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copies the counts, URL and message of `event` into the snapshot
    pub fn apply_progress(&mut self, event: &ProgressEvent) {
        self.progress = ProgressSnapshot {
            processed: event.current,
            total: event.total,
            current_url: event.current_url.clone(),
            message: event.message.clone(),
        };
    }
}

/// Poll response for a job's current state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub total: usize,
    pub processed: usize,
    pub current_url: String,
    pub message: String,
    pub pages: Vec<PageResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_pdf: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&CrawlJob> for JobStatusView {
    fn from(job: &CrawlJob) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            total: job.progress.total,
            processed: job.progress.processed,
            current_url: job.progress.current_url.clone(),
            message: job.progress.message.clone(),
            pages: job.pages.clone(),
            merged_pdf: job.merged_pdf.clone(),
            error: job.error.clone(),
        }
    }
}
