use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Browser identity presented to target sites by both the crawler and the renderer
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120 Safari/537.36";

/// Main configuration structure for site2pdf
///
/// Every section and key is optional; an empty file yields `Config::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub renderer: RendererConfig,
    pub output: OutputConfig,
    pub progress: ProgressConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Page budget used when a request does not name one
    pub default_max_pages: usize,

    /// Largest page budget a request may ask for
    pub max_pages_limit: usize,

    /// Same-origin links kept from a single page, in document order
    pub max_links_per_page: usize,

    /// Upper bound on loading one page during discovery (seconds)
    pub page_load_timeout_secs: u64,

    /// User agent sent with every crawl request
    pub user_agent: String,
}

impl CrawlerConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_max_pages: 10,
            max_pages_limit: 100,
            max_links_per_page: 20,
            page_load_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Headless renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RendererConfig {
    /// Upper bound on navigating to a page before printing it (seconds)
    pub navigation_timeout_secs: u64,

    /// Fixed wait after navigation so late content can settle (milliseconds)
    pub settle_delay_ms: u64,

    /// Print CSS backgrounds
    pub print_background: bool,

    /// Page margin on every side, in CSS pixels
    pub margin_px: u32,

    /// Explicit Chromium binary; auto-detected when absent
    pub chrome_executable: Option<PathBuf>,

    /// User agent presented by the headless browser
    pub user_agent: String,
}

impl RendererConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 45,
            settle_delay_ms: 3000,
            print_background: true,
            margin_px: 20,
            chrome_executable: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory; each job writes into `<output-dir>/<job id>/`
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
        }
    }
}

/// Progress fan-out configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProgressConfig {
    /// Events buffered per subscriber before the oldest are dropped
    pub channel_capacity: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}
