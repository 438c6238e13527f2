use crate::job::JobId;
use crate::progress::ProgressEvent;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default number of events buffered per job channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// In-process pub/sub for job progress
///
/// Cloneable; every clone shares the same channel table. Each job gets its
/// own bounded broadcast channel, created on first subscribe. Publishing is
/// synchronous so it can run inside crawl callbacks without an executor.
#[derive(Clone)]
pub struct ProgressHub {
    channels: Arc<RwLock<HashMap<JobId, broadcast::Sender<ProgressEvent>>>>,
    capacity: usize,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Delivers `event` to every current subscriber of `job_id`
    ///
    /// Returns the number of subscribers reached. No-op when nobody listens.
    pub fn publish(&self, job_id: JobId, event: ProgressEvent) -> usize {
        let channels = self.channels.read();
        match channels.get(&job_id) {
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Subscribes to events for `job_id`, creating the channel if needed
    ///
    /// A subscriber that falls more than the channel capacity behind gets
    /// `RecvError::Lagged` and resumes from the oldest retained event.
    pub fn subscribe(&self, job_id: JobId) -> broadcast::Receiver<ProgressEvent> {
        let mut channels = self.channels.write();
        channels
            .entry(job_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drops the channel for `job_id`
    ///
    /// Receivers drain what is buffered and then see `RecvError::Closed`.
    pub fn close(&self, job_id: JobId) {
        self.channels.write().remove(&job_id);
    }

    /// Removes channels with zero subscribers
    pub fn prune(&self) {
        self.channels.write().retain(|_, tx| tx.receiver_count() > 0);
    }

    pub fn subscriber_count(&self, job_id: JobId) -> usize {
        self.channels
            .read()
            .get(&job_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new()
    }
}
