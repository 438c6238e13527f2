//! Crawler coordinator - breadth-first discovery loop
//!
//! Pages are loaded one at a time: page N finishes (or fails) before page
//! N+1 is dequeued. Only links sharing the seed's exact origin are followed,
//! and discovery stops once the page budget has been reached.

use crate::config::CrawlerConfig;
use crate::crawler::frontier::Frontier;
use crate::crawler::loader::{LoadError, LoadedPage, PageLoader};
use crate::crawler::parser::extract_same_origin_links;
use crate::progress::{Phase, ProgressEvent};
use crate::url::{parse_seed_url, Origin};
use crate::UrlError;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that abort a crawl
///
/// Per-page load failures are not errors here; they are reported as progress
/// and the page is skipped.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid seed URL: {0}")]
    InvalidSeedUrl(#[from] UrlError),
}

/// Bounded same-origin crawler
pub struct Crawler<L> {
    loader: L,
    page_timeout: Duration,
    max_links_per_page: usize,
}

impl<L: PageLoader> Crawler<L> {
    pub fn new(loader: L, config: &CrawlerConfig) -> Self {
        Self {
            loader,
            page_timeout: config.page_load_timeout(),
            max_links_per_page: config.max_links_per_page,
        }
    }

    /// Discovers up to `budget` same-origin pages starting at `seed`
    ///
    /// Emits a `Crawling` event before each load, a `Crawling` event with a
    /// "Skipped" message for each failed load, and a final `Completed` event
    /// once discovery ends.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Url>)` - Successfully loaded URLs in visit order, at most `budget`
    /// * `Err(CrawlError)` - The seed is not an absolute http(s) URL
    pub async fn crawl<F>(
        &self,
        seed: &str,
        budget: usize,
        mut on_progress: F,
    ) -> Result<Vec<Url>, CrawlError>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        let seed = parse_seed_url(seed)?;
        let origin = Origin::of(&seed);
        let mut frontier = Frontier::new(seed);

        tracing::info!("Starting crawl of {} with budget {}", origin, budget);

        while frontier.visited_count() < budget {
            let Some(url) = frontier.pop() else {
                break;
            };

            if frontier.is_visited(&url) {
                continue;
            }

            on_progress(ProgressEvent::new(
                Phase::Crawling,
                frontier.visited_count() + 1,
                budget,
                url.as_str(),
                format!("Crawling: {}", url),
            ));

            match self.load(&url).await {
                Ok(page) => {
                    frontier.mark_visited(url.clone());

                    let links = extract_same_origin_links(
                        &page.html,
                        &page.final_url,
                        &origin,
                        self.max_links_per_page,
                    );

                    let mut added = 0;
                    for link in links {
                        if frontier.push(link) {
                            added += 1;
                        }
                    }
                    tracing::debug!(
                        "Loaded {} ({} new links, {} queued)",
                        url,
                        added,
                        frontier.queued_len()
                    );
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    on_progress(ProgressEvent::new(
                        Phase::Crawling,
                        frontier.visited_count(),
                        budget,
                        url.as_str(),
                        format!("Skipped: {} - {}", url, e),
                    ));
                }
            }
        }

        let found = frontier.visited_count();
        tracing::info!("Crawl of {} finished with {} pages", origin, found);
        on_progress(ProgressEvent::new(
            Phase::Completed,
            found,
            found,
            "",
            format!("Crawling completed. Found {} pages.", found),
        ));

        Ok(frontier.into_visited())
    }

    async fn load(&self, url: &Url) -> Result<LoadedPage, LoadError> {
        match tokio::time::timeout(self.page_timeout, self.loader.load(url)).await {
            Ok(result) => result,
            Err(_) => Err(LoadError::Timeout(self.page_timeout)),
        }
    }
}
