//! Progress events and their per-job fan-out

mod event;
mod hub;

pub use event::{Phase, ProgressEvent};
pub use hub::{ProgressHub, DEFAULT_CHANNEL_CAPACITY};
