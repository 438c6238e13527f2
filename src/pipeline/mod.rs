//! Conversion pipeline
//!
//! Runs one job end to end: crawl the site, render every discovered page in
//! discovery order, then merge the page PDFs. Everything within a job is
//! sequential. Crawl-page failures are absorbed by the crawler; a render,
//! merge or I/O failure fails the whole job and nothing is retried.
//!
//! Output for job `<id>` lives under `<output-dir>/<id>/`:
//! `page_1.pdf` .. `page_n.pdf` plus `merged.pdf` on success.

use crate::config::Config;
use crate::crawler::{Crawler, PageLoader};
use crate::job::{CrawlJob, JobId, JobRegistry, JobStatus, PageResult};
use crate::merge::DocumentMerger;
use crate::progress::{Phase, ProgressEvent};
use crate::render::PageRenderer;
use crate::url::{page_file_name, parse_seed_url, Origin, MERGED_FILE_NAME};
use crate::PipelineError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// A request to convert a site into one PDF
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub url: Option<String>,
    pub max_pages: Option<usize>,
}

impl ConversionRequest {
    pub fn new(url: impl Into<String>, max_pages: Option<usize>) -> Self {
        Self {
            url: Some(url.into()),
            max_pages,
        }
    }
}

/// Orchestrates crawler, renderer and merger for conversion jobs
///
/// Cloneable; clones share the registry, collaborators and configuration,
/// so a clone can be moved into a spawned task per job.
#[derive(Clone)]
pub struct JobPipeline {
    registry: JobRegistry,
    loader: Arc<dyn PageLoader>,
    renderer: Arc<dyn PageRenderer>,
    merger: Arc<dyn DocumentMerger>,
    config: Arc<Config>,
}

impl JobPipeline {
    pub fn new(
        config: Config,
        registry: JobRegistry,
        loader: Arc<dyn PageLoader>,
        renderer: Arc<dyn PageRenderer>,
        merger: Arc<dyn DocumentMerger>,
    ) -> Self {
        Self {
            registry,
            loader,
            renderer,
            merger,
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output.output_dir
    }

    /// Directory holding every artifact of `id`
    pub fn job_dir(&self, id: JobId) -> PathBuf {
        self.output_dir().join(id.to_string())
    }

    /// Checks a request and resolves its seed URL and page budget
    ///
    /// # Returns
    ///
    /// * `Ok((Url, usize))` - Seed URL and page budget
    /// * `Err(PipelineError)` - `Validation` or `InvalidUrl`; no job is created
    pub fn validate(&self, request: &ConversionRequest) -> Result<(Url, usize), PipelineError> {
        let url = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| PipelineError::Validation("URL required".to_string()))?;

        let seed = parse_seed_url(url)?;

        let limit = self.config.crawler.max_pages_limit;
        let budget = request
            .max_pages
            .unwrap_or(self.config.crawler.default_max_pages);
        if budget < 1 || budget > limit {
            return Err(PipelineError::Validation(format!(
                "maxPages must be between 1 and {}",
                limit
            )));
        }

        Ok((seed, budget))
    }

    /// Validates `request`, creates the job directory and registers the job
    ///
    /// The job is left in `Started`; call [`execute`](Self::execute) to run
    /// it. Subscribing between the two calls observes every event.
    pub async fn prepare(&self, request: &ConversionRequest) -> Result<JobId, PipelineError> {
        let (seed, budget) = self.validate(request)?;
        let id = JobId::new();

        tokio::fs::create_dir_all(self.job_dir(id)).await?;

        let origin = Origin::of(&seed).to_string();
        self.registry
            .insert(CrawlJob::new(id, seed.as_str(), origin, budget));

        tracing::info!("Job {} accepted for {} (max {} pages)", id, seed, budget);
        Ok(id)
    }

    /// Runs a prepared job to completion and returns its final snapshot
    ///
    /// The job must still be `Started`; claiming it moves it to `Crawling`,
    /// so a job runs at most once. A job that is already claimed yields
    /// `AlreadyClaimed` and is left as it was.
    ///
    /// On failure the job is marked `Failed`, a `Failed` event is published
    /// and the error is returned. Either way the job's progress channel is
    /// closed once the terminal event is out.
    pub async fn execute(&self, id: JobId) -> Result<CrawlJob, PipelineError> {
        let job = self.registry.claim(id)?;
        tracing::info!("Job {} -> {}", id, job.status);

        let outcome = self.run_stages(&job).await;
        if let Err(e) = &outcome {
            self.fail(id, e).await;
        }
        self.registry.hub().close(id);

        outcome?;
        self.registry.get(id)
    }

    /// `prepare` followed by `execute`
    pub async fn run_conversion(
        &self,
        request: &ConversionRequest,
    ) -> Result<CrawlJob, PipelineError> {
        let id = self.prepare(request).await?;
        self.execute(id).await
    }

    async fn run_stages(&self, job: &CrawlJob) -> Result<(), PipelineError> {
        let id = job.id;
        let job_dir = self.job_dir(id);

        self.registry.report(
            id,
            ProgressEvent::status(
                Phase::Started,
                format!("Starting conversion of {}", job.seed_url),
            ),
        )?;

        // Crawl
        let crawler = Crawler::new(Arc::clone(&self.loader), &self.config.crawler);
        let registry = self.registry.clone();
        let urls = crawler
            .crawl(&job.seed_url, job.page_budget, move |event| {
                if let Err(e) = registry.report(id, event) {
                    tracing::debug!("Dropped crawl progress for {}: {}", id, e);
                }
            })
            .await?;

        // Render
        self.set_status(id, JobStatus::RenderingPages)?;
        let total = urls.len();
        let mut blobs = Vec::with_capacity(total);

        for (i, url) in urls.iter().enumerate() {
            let n = i + 1;
            self.registry.report(
                id,
                ProgressEvent::new(
                    Phase::Rendering,
                    n,
                    total,
                    url.as_str(),
                    format!("Generating PDF for page {} of {}", n, total),
                ),
            )?;

            let page = match self.renderer.render(url).await {
                Ok(page) => page,
                Err(source) => {
                    let message = source.to_string();
                    self.registry.update(id, |job| {
                        job.pages.push(PageResult::failed(url.as_str(), message))
                    })?;
                    return Err(PipelineError::Render {
                        url: url.to_string(),
                        source,
                    });
                }
            };

            let file_name = page_file_name(n);
            tokio::fs::write(job_dir.join(&file_name), &page.pdf).await?;

            let result = PageResult::rendered(
                url.as_str(),
                format!("{}/{}", id, file_name),
                page.media_detected,
            );
            self.registry.update(id, |job| job.pages.push(result))?;
            blobs.push(page.pdf);
        }

        // Merge
        self.set_status(id, JobStatus::Merging)?;
        self.registry.report(
            id,
            ProgressEvent::new(Phase::Merging, total, total, "", "Merging PDFs..."),
        )?;

        let merger = Arc::clone(&self.merger);
        let merged = tokio::task::spawn_blocking(move || merger.merge(&blobs)).await??;
        tokio::fs::write(job_dir.join(MERGED_FILE_NAME), &merged).await?;

        self.registry.update(id, |job| {
            job.merged_pdf = Some(format!("{}/{}", id, MERGED_FILE_NAME));
            job.status = JobStatus::Completed;
        })?;
        self.registry.report(
            id,
            ProgressEvent::new(
                Phase::Completed,
                total,
                total,
                "",
                format!("Conversion completed. {} pages merged.", total),
            ),
        )?;

        tracing::info!("Job {} completed with {} pages", id, total);
        Ok(())
    }

    fn set_status(&self, id: JobId, status: JobStatus) -> Result<(), PipelineError> {
        tracing::info!("Job {} -> {}", id, status);
        self.registry.update(id, |job| job.status = status)
    }

    async fn fail(&self, id: JobId, error: &PipelineError) {
        tracing::error!("Job {} failed: {}", id, error);
        let message = error.to_string();

        let mut last = None;
        let updated = self.registry.update(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(message.clone());
            job.merged_pdf = None;
            last = Some(job.progress.clone());
        });
        if updated.is_err() {
            return;
        }

        let last = last.unwrap_or_default();
        let event = ProgressEvent::new(
            Phase::Failed,
            last.processed,
            last.total,
            last.current_url,
            message,
        );
        if let Err(e) = self.registry.report(id, event) {
            tracing::debug!("Failed to report failure of {}: {}", id, e);
        }

        match tokio::fs::remove_file(self.job_dir(id).join(MERGED_FILE_NAME)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove partial merged.pdf for {}: {}", id, e),
        }
    }
}
