//! Integration tests for the conversion pipeline
//!
//! Crawling runs against in-memory sites and rendering is faked with
//! lopdf-built pages; merging and the output layout are real.

mod common;

use common::{pipeline, FakeRenderer, StaticLoader};
use site2pdf::merge::page_count;
use site2pdf::service::Service;
use site2pdf::url::MERGED_FILE_NAME;
use site2pdf::{ConversionRequest, JobStatus, Phase, PipelineError, ProgressEvent};
use std::collections::HashSet;
use tokio::sync::broadcast::{error::RecvError, Receiver};

const SEED: &str = "https://example.test/";

fn three_page_site() -> StaticLoader {
    StaticLoader::new()
        .page(SEED, r#"<a href="/video">Video</a><a href="/about">About</a>"#)
        .page("https://example.test/video", "<video></video>")
        .page("https://example.test/about", "")
}

async fn drain(mut rx: Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    loop {
        match rx.recv().await {
            Ok(event) => events.push(event),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return events,
        }
    }
}

#[tokio::test]
async fn test_successful_conversion_writes_layout() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), three_page_site(), FakeRenderer::new());

    let job = pipeline
        .run_conversion(&ConversionRequest::new(SEED, None))
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.origin, "https://example.test");
    assert_eq!(job.pages.len(), 3);

    let urls: Vec<&str> = job.pages.iter().map(|p| p.page_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![SEED, "https://example.test/video", "https://example.test/about"]
    );

    for (i, page) in job.pages.iter().enumerate() {
        let expected = format!("{}/page_{}.pdf", job.id, i + 1);
        assert_eq!(page.pdf.as_deref(), Some(expected.as_str()));
        assert!(dir.path().join(&expected).is_file());
        assert!(page.error.is_none());
    }
    assert!(!job.pages[0].video_detected);
    assert!(job.pages[1].video_detected);

    let merged_rel = format!("{}/{}", job.id, MERGED_FILE_NAME);
    assert_eq!(job.merged_pdf.as_deref(), Some(merged_rel.as_str()));
    let merged = std::fs::read(dir.path().join(&merged_rel)).unwrap();
    assert_eq!(page_count(&merged).unwrap(), 3);
}

#[tokio::test]
async fn test_render_failure_fails_job_without_merge() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::new().failing_on("https://example.test/video");
    let pipeline = pipeline(dir.path(), three_page_site(), renderer);

    let id = pipeline
        .prepare(&ConversionRequest::new(SEED, Some(3)))
        .await
        .unwrap();
    let rx = pipeline.registry().subscribe(id).unwrap();

    let err = pipeline.execute(id).await.unwrap_err();
    assert!(matches!(err, PipelineError::Render { .. }));
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().contains("https://example.test/video"));

    let job = pipeline.registry().get(id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.is_some());
    assert!(job.merged_pdf.is_none());
    assert_eq!(job.pages.len(), 2);
    assert!(job.pages[0].pdf.is_some());
    assert!(job.pages[1].pdf.is_none());
    assert!(job.pages[1].error.is_some());

    let job_dir = pipeline.job_dir(id);
    assert!(job_dir.join("page_1.pdf").is_file());
    assert!(!job_dir.join("page_2.pdf").exists());
    assert!(!job_dir.join("page_3.pdf").exists());
    assert!(!job_dir.join(MERGED_FILE_NAME).exists());

    let events = drain(rx).await;
    let last = events.last().unwrap();
    assert_eq!(last.phase, Phase::Failed);
    assert!(!events.iter().any(|e| e.phase == Phase::Merging));
}

#[tokio::test]
async fn test_skipped_crawl_pages_are_not_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let loader = StaticLoader::new()
        .page(SEED, r#"<a href="/gone">Gone</a><a href="/ok">Ok</a>"#)
        .page("https://example.test/ok", "");
    let pipeline = pipeline(dir.path(), loader, FakeRenderer::new());

    let job = pipeline
        .run_conversion(&ConversionRequest::new(SEED, Some(5)))
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages.len(), 2);
    assert!(job.pages.iter().all(|p| !p.page_url.ends_with("/gone")));
}

#[tokio::test]
async fn test_subscribers_see_ordered_events() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), three_page_site(), FakeRenderer::new());

    let id = pipeline
        .prepare(&ConversionRequest::new(SEED, None))
        .await
        .unwrap();
    let first = pipeline.registry().subscribe(id).unwrap();
    let second = pipeline.registry().subscribe(id).unwrap();

    let runner = pipeline.clone();
    let handle = tokio::spawn(async move { runner.execute(id).await });

    let (a, b) = tokio::join!(drain(first), drain(second));
    handle.await.unwrap().unwrap();

    assert_eq!(a, b);

    let phases: Vec<Phase> = a.iter().map(|e| e.phase).collect();
    assert_eq!(
        phases,
        vec![
            Phase::Started,
            Phase::Crawling,
            Phase::Crawling,
            Phase::Crawling,
            Phase::Completed,
            Phase::Rendering,
            Phase::Rendering,
            Phase::Rendering,
            Phase::Merging,
            Phase::Completed,
        ]
    );

    let rendering: Vec<&ProgressEvent> = a
        .iter()
        .filter(|e| e.phase == Phase::Rendering)
        .collect();
    assert_eq!(rendering[1].message, "Generating PDF for page 2 of 3");
    assert_eq!((rendering[2].current, rendering[2].total), (3, 3));

    let view = pipeline.registry().status(id).unwrap();
    assert_eq!(view.status, JobStatus::Completed);
    assert_eq!(view.processed, 3);
    assert_eq!(view.total, 3);
}

#[tokio::test]
async fn test_validation_errors_create_no_job() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), three_page_site(), FakeRenderer::new());
    let service = Service::new(pipeline.clone());

    for request in [
        ConversionRequest::default(),
        ConversionRequest::new("not a url", None),
        ConversionRequest::new("ftp://example.test/", None),
        ConversionRequest::new(SEED, Some(0)),
        ConversionRequest::new(SEED, Some(1000)),
    ] {
        let body = service.convert(&request).await.unwrap_err();
        assert_eq!(body.status, 400, "{:?}", request);
    }

    assert!(pipeline.registry().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), three_page_site(), FakeRenderer::new());
    let service = Service::new(pipeline);

    let unknown = service.status("3f2b8c1e-0000-4000-8000-000000000000");
    assert_eq!(unknown.unwrap_err().status, 404);
    assert_eq!(service.status("nope").unwrap_err().status, 404);
    assert_eq!(service.subscribe("nope").unwrap_err().status, 404);
}

#[tokio::test]
async fn test_started_job_and_artifact_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), three_page_site(), FakeRenderer::new());
    let service = Service::new(pipeline);

    let started = service
        .start(&ConversionRequest::new(SEED, Some(2)))
        .await
        .unwrap();
    let id = started.id.to_string();

    let events = drain(started.events).await;
    assert_eq!(events.first().unwrap().phase, Phase::Started);
    assert_eq!(events.last().unwrap().phase, Phase::Completed);

    let job = started.handle.await.unwrap().unwrap();
    assert_eq!(job.pages.len(), 2);

    let status = service.status(&id).unwrap();
    assert_eq!(status.status, JobStatus::Completed);

    let merged = service.resolve_output(&id, MERGED_FILE_NAME).await.unwrap();
    assert!(merged.is_file());
    assert!(service.resolve_output(&id, "page_2.pdf").await.is_ok());

    for (name, status) in [("page_3.pdf", 404), ("../merged.pdf", 404), ("..", 400)] {
        let err = service.resolve_output(&id, name).await.unwrap_err();
        assert_eq!(err.status, status, "{}", name);
    }

    // a finished job has no live channel; subscribing ends immediately
    let late = service.subscribe(&id).unwrap();
    assert!(drain(late).await.is_empty());
}

#[tokio::test]
async fn test_finished_job_cannot_run_again() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), three_page_site(), FakeRenderer::new());

    let job = pipeline
        .run_conversion(&ConversionRequest::new(SEED, None))
        .await
        .unwrap();

    let err = pipeline.execute(job.id).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::AlreadyClaimed { status: JobStatus::Completed, .. }
    ));
    assert_eq!(err.status_code(), 409);

    let after = pipeline.registry().get(job.id).unwrap();
    assert_eq!(after.status, JobStatus::Completed);
    assert_eq!(after.pages, job.pages);
    assert_eq!(after.updated_at, job.updated_at);
    assert!(!pipeline.job_dir(job.id).join("page_4.pdf").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_executes_run_job_once() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), three_page_site(), FakeRenderer::new());

    let id = pipeline
        .prepare(&ConversionRequest::new(SEED, None))
        .await
        .unwrap();

    let first = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.execute(id).await }
    });
    let second = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.execute(id).await }
    });
    let results = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(PipelineError::AlreadyClaimed { .. }))));

    let job = pipeline.registry().get(id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_status_polls_see_published_progress() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), three_page_site(), FakeRenderer::new());

    let id = pipeline
        .prepare(&ConversionRequest::new(SEED, None))
        .await
        .unwrap();
    let rx = pipeline.registry().subscribe(id).unwrap();

    let reader = tokio::spawn({
        let registry = pipeline.registry().clone();
        async move {
            let mut seen = Vec::new();
            loop {
                let view = registry.status(id).unwrap();
                seen.push((view.processed, view.total, view.current_url));
                if view.status.is_terminal() {
                    return seen;
                }
                tokio::task::yield_now().await;
            }
        }
    });

    let runner = pipeline.clone();
    let writer = tokio::spawn(async move { runner.execute(id).await });

    let events = drain(rx).await;
    writer.await.unwrap().unwrap();
    let seen = reader.await.unwrap();

    let published: HashSet<(usize, usize, String)> = events
        .into_iter()
        .map(|e| (e.current, e.total, e.current_url))
        .collect();
    // before the first event the snapshot is empty, which matches `Started`
    assert!(published.contains(&(0, 0, String::new())));
    assert!(!seen.is_empty());
    for tuple in &seen {
        assert!(published.contains(tuple), "unpublished snapshot {:?}", tuple);
    }
}
