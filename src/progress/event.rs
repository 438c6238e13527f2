use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a conversion job that a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Started,
    Crawling,
    Rendering,
    Merging,
    Completed,
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Started => "started",
            Phase::Crawling => "crawling",
            Phase::Rendering => "rendering",
            Phase::Merging => "merging",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress notification for a job
///
/// `current` and `total` are counts within the phase: pages visited out of the
/// page budget while crawling, pages printed out of pages discovered while
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub phase: Phase,
    pub current: usize,
    pub total: usize,
    pub current_url: String,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(
        phase: Phase,
        current: usize,
        total: usize,
        current_url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_url: current_url.into(),
            message: message.into(),
        }
    }

    /// An event that carries no page position, such as a status transition
    pub fn status(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(phase, 0, 0, String::new(), message)
    }
}
