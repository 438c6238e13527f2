//! Transport-facing facade
//!
//! Maps conversion requests, status polls, progress subscriptions and
//! artifact lookups onto the pipeline, using serde types any HTTP or
//! WebSocket layer can carry as-is.

use crate::job::{CrawlJob, JobId, JobStatusView, PageResult};
use crate::pipeline::{ConversionRequest, JobPipeline};
use crate::progress::ProgressEvent;
use crate::url::sanitize_filename;
use crate::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Successful conversion result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub job_id: JobId,
    pub pages: Vec<PageResult>,
    pub merged_pdf: Option<String>,
}

impl From<&CrawlJob> for ConversionResponse {
    fn from(job: &CrawlJob) -> Self {
        Self {
            job_id: job.id,
            pages: job.pages.clone(),
            merged_pdf: job.merged_pdf.clone(),
        }
    }
}

/// Error payload with its HTTP-equivalent status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

impl From<&PipelineError> for ErrorBody {
    fn from(e: &PipelineError) -> Self {
        Self {
            error: e.to_string(),
            status: e.status_code(),
        }
    }
}

impl From<PipelineError> for ErrorBody {
    fn from(e: PipelineError) -> Self {
        Self::from(&e)
    }
}

/// A job running in the background
pub struct StartedJob {
    pub id: JobId,
    pub events: broadcast::Receiver<ProgressEvent>,
    pub handle: JoinHandle<Result<CrawlJob, PipelineError>>,
}

#[derive(Clone)]
pub struct Service {
    pipeline: JobPipeline,
}

impl Service {
    pub fn new(pipeline: JobPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &JobPipeline {
        &self.pipeline
    }

    /// Runs a conversion and waits for it to finish
    pub async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResponse, ErrorBody> {
        let job = self.pipeline.run_conversion(request).await?;
        Ok(ConversionResponse::from(&job))
    }

    /// Accepts a conversion and runs it in the background
    ///
    /// The returned receiver is subscribed before the job starts, so it sees
    /// every event from `Started` to the terminal one and then closes.
    /// Validation errors are returned here and no job is created.
    pub async fn start(&self, request: &ConversionRequest) -> Result<StartedJob, ErrorBody> {
        let id = self.pipeline.prepare(request).await?;
        let events = self.pipeline.registry().subscribe(id)?;

        let pipeline = self.pipeline.clone();
        let handle = tokio::spawn(async move { pipeline.execute(id).await });

        Ok(StartedJob { id, events, handle })
    }

    /// Current state of a job; an unparseable id is reported as not found
    pub fn status(&self, job_id: &str) -> Result<JobStatusView, ErrorBody> {
        let id = parse_job_id(job_id)?;
        Ok(self.pipeline.registry().status(id)?)
    }

    pub fn subscribe(&self, job_id: &str) -> Result<broadcast::Receiver<ProgressEvent>, ErrorBody> {
        let id = parse_job_id(job_id)?;
        Ok(self.pipeline.registry().subscribe(id)?)
    }

    /// Resolves a job artifact such as `page_1.pdf` or `merged.pdf` to its path
    ///
    /// The file name is sanitized before use; `.` and `..` are refused, the
    /// job must exist and the file must be present on disk.
    pub async fn resolve_output(&self, job_id: &str, filename: &str) -> Result<PathBuf, ErrorBody> {
        let id = parse_job_id(job_id)?;
        self.pipeline.registry().get(id)?;

        let name = sanitize_filename(filename);
        if name.is_empty() || name == "." || name == ".." {
            return Err(ErrorBody {
                error: "Invalid file name".to_string(),
                status: 400,
            });
        }

        let path = self.pipeline.job_dir(id).join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(ErrorBody {
                error: "PDF not found".to_string(),
                status: 404,
            }),
        }
    }
}

fn parse_job_id(job_id: &str) -> Result<JobId, ErrorBody> {
    job_id.trim().parse().map_err(|_| ErrorBody {
        error: format!("Job not found: {}", job_id),
        status: 404,
    })
}
