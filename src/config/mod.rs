//! Configuration module for site2pdf
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site2pdf::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site2pdf.toml")).unwrap();
//! println!("Pages land in: {}", config.output.output_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, ProgressConfig, RendererConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
