use crate::config::RendererConfig;
use crate::render::{detect_media, PageRenderer, RenderError, RenderedPage};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;

/// A4 in inches
const PAPER_WIDTH_IN: f64 = 8.27;
const PAPER_HEIGHT_IN: f64 = 11.69;

/// CSS pixels per inch
const CSS_PX_PER_IN: f64 = 96.0;

/// Headless Chromium renderer
///
/// Each render launches its own browser with a throwaway profile directory,
/// so cookies and storage never leak from one page into the next. The
/// browser is closed whether or not printing succeeds.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    config: RendererConfig,
}

impl ChromeRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    fn pdf_params(&self) -> PrintToPdfParams {
        let margin = f64::from(self.config.margin_px) / CSS_PX_PER_IN;
        PrintToPdfParams {
            print_background: Some(self.config.print_background),
            paper_width: Some(PAPER_WIDTH_IN),
            paper_height: Some(PAPER_HEIGHT_IN),
            margin_top: Some(margin),
            margin_bottom: Some(margin),
            margin_left: Some(margin),
            margin_right: Some(margin),
            prefer_css_page_size: Some(false),
            ..Default::default()
        }
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>, TempDir), RenderError> {
        let profile = tempfile::Builder::new()
            .prefix("site2pdf-chrome-")
            .tempdir()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.config.navigation_timeout())
            .user_data_dir(profile.path())
            .arg(format!("--user-agent={}", self.config.user_agent))
            .arg("--disable-setuid-sandbox")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--hide-scrollbars")
            .arg("--mute-audio");

        if let Some(path) = &self.config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {:?}", e);
                }
            }
        });

        Ok((browser, handler_task, profile))
    }

    async fn print(&self, browser: &Browser, url: &Url) -> Result<RenderedPage, RenderError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Browser(e.to_string()))?;

        let timeout = self.config.navigation_timeout();
        match tokio::time::timeout(timeout, navigate(&page, url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(RenderError::Navigation(e.to_string())),
            Err(_) => return Err(RenderError::Timeout(timeout)),
        }

        tokio::time::sleep(self.config.settle_delay()).await;

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::Browser(e.to_string()))?;
        let media_detected = detect_media(&html);

        let pdf = page
            .pdf(self.pdf_params())
            .await
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page for {}: {}", url, e);
        }

        Ok(RenderedPage {
            pdf,
            media_detected,
        })
    }
}

async fn navigate(page: &Page, url: &Url) -> Result<(), CdpError> {
    page.goto(url.as_str()).await?;
    page.wait_for_navigation().await?;
    Ok(())
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError> {
        tracing::info!("Generating PDF: {}", url);

        let (mut browser, handler, _profile) = self.launch().await?;
        let result = self.print(&browser, url).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Failed to close browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Failed to reap browser process: {}", e);
        }
        handler.abort();

        match &result {
            Ok(page) => tracing::info!("PDF ready for {} ({} bytes)", url, page.pdf.len()),
            Err(e) => tracing::warn!("PDF failed for {}: {}", url, e),
        }
        result
    }
}
