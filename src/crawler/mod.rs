//! Crawler module for same-origin page discovery
//!
//! This module contains the discovery half of a conversion:
//! - Page loading behind the `PageLoader` trait
//! - HTML parsing and link extraction
//! - The breadth-first frontier
//! - The bounded crawl loop

mod coordinator;
mod frontier;
mod loader;
mod parser;

pub use coordinator::{CrawlError, Crawler};
pub use frontier::Frontier;
pub use loader::{build_http_client, HttpLoader, LoadError, LoadedPage, PageLoader};
pub use parser::{extract_links, extract_same_origin_links};
