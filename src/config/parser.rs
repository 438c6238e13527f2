use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates a TOML configuration file
///
/// ```no_run
/// use std::path::Path;
/// use site2pdf::config::load_config;
///
/// let config = load_config(Path::new("site2pdf.toml")).unwrap();
/// println!("Default page budget: {}", config.crawler.default_max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Parses and validates configuration from a TOML string
///
/// Missing sections and keys fall back to their defaults, so `""` yields
/// `Config::default()`.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of the configuration file as stored on disk
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let bytes = std::fs::read(path)?;
    Ok(digest(&bytes))
}

/// Loads a configuration along with the hash of the exact bytes it was parsed from
///
/// The hash is logged at startup so two runs can be compared for identical
/// settings.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes).map_err(|e| {
        ConfigError::Validation(format!("{} is not valid UTF-8: {}", path.display(), e))
    })?;
    let config = parse_config(&content)?;
    Ok((config, digest(content.as_bytes())))
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
