use crate::job::{CrawlJob, JobId, JobStatus, JobStatusView};
use crate::progress::{ProgressEvent, ProgressHub};
use crate::PipelineError;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Process-wide table of conversion jobs
///
/// Cloneable handle; clones share the same table and progress hub. Readers
/// get owned snapshots taken under the read lock, so a status poll never
/// sees half of an update. Jobs are kept until the process exits.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, CrawlJob>>>,
    hub: ProgressHub,
}

impl JobRegistry {
    pub fn new(hub: ProgressHub) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            hub,
        }
    }

    /// Registers a job, replacing any previous job with the same id
    pub fn insert(&self, job: CrawlJob) {
        self.jobs.write().insert(job.id, job);
    }

    /// Returns a snapshot of the job
    pub fn get(&self, id: JobId) -> Result<CrawlJob, PipelineError> {
        self.jobs
            .read()
            .get(&id)
            .cloned()
            .ok_or(PipelineError::NotFound(id))
    }

    /// Applies `f` to the stored job under the write lock and bumps `updated_at`
    pub fn update<F>(&self, id: JobId, f: F) -> Result<(), PipelineError>
    where
        F: FnOnce(&mut CrawlJob),
    {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id).ok_or(PipelineError::NotFound(id))?;
        f(job);
        job.updated_at = Utc::now();
        Ok(())
    }

    /// Moves a `Started` job to `Crawling` and returns the claimed snapshot
    ///
    /// Only one caller can win the claim for a job. Any other status leaves
    /// the record untouched and yields `AlreadyClaimed`.
    pub fn claim(&self, id: JobId) -> Result<CrawlJob, PipelineError> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id).ok_or(PipelineError::NotFound(id))?;
        if job.status != JobStatus::Started {
            return Err(PipelineError::AlreadyClaimed {
                id,
                status: job.status,
            });
        }
        job.status = JobStatus::Crawling;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    pub fn status(&self, id: JobId) -> Result<JobStatusView, PipelineError> {
        self.jobs
            .read()
            .get(&id)
            .map(JobStatusView::from)
            .ok_or(PipelineError::NotFound(id))
    }

    /// Subscribes to progress for an existing job
    ///
    /// A job that has already finished yields a receiver that is closed
    /// from the start; poll [`status`](Self::status) for its outcome.
    pub fn subscribe(
        &self,
        id: JobId,
    ) -> Result<broadcast::Receiver<ProgressEvent>, PipelineError> {
        let jobs = self.jobs.read();
        let job = jobs.get(&id).ok_or(PipelineError::NotFound(id))?;
        if job.status.is_terminal() {
            let (_, rx) = broadcast::channel(1);
            return Ok(rx);
        }
        Ok(self.hub.subscribe(id))
    }

    /// Forwards `event` to subscribers without touching the stored snapshot
    pub fn publish(&self, id: JobId, event: ProgressEvent) -> usize {
        self.hub.publish(id, event)
    }

    /// Records `event` as the job's latest progress, then publishes it
    pub fn report(&self, id: JobId, event: ProgressEvent) -> Result<(), PipelineError> {
        self.update(id, |job| job.apply_progress(&event))?;
        self.hub.publish(id, event);
        Ok(())
    }

    pub fn hub(&self) -> &ProgressHub {
        &self.hub
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new(ProgressHub::new())
    }
}
