//! Page rendering
//!
//! Turns one URL into a PDF and reports whether the rendered page embeds
//! audio or video. The pipeline only sees the `PageRenderer` trait;
//! `ChromeRenderer` drives a headless Chromium through the DevTools protocol.

mod chrome;
mod media;

pub use chrome::ChromeRenderer;
pub use media::detect_media;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Output of rendering one page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub pdf: Vec<u8>,

    /// The rendered DOM contains video, audio or an embedded video player,
    /// none of which survive printing
    pub media_detected: bool,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("navigation timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to print PDF: {0}")]
    Pdf(String),

    #[error("browser error: {0}")]
    Browser(String),
}

/// Renders a URL to PDF bytes
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError>;
}

#[async_trait]
impl<T: PageRenderer + ?Sized> PageRenderer for Arc<T> {
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError> {
        (**self).render(url).await
    }
}
