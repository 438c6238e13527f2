use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProgressConfig, RendererConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_output_config(&config.output)?;
    validate_progress_config(&config.progress)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages_limit must be >= 1, got {}",
            config.max_pages_limit
        )));
    }

    if config.default_max_pages < 1 || config.default_max_pages > config.max_pages_limit {
        return Err(ConfigError::Validation(format!(
            "default_max_pages must be between 1 and {}, got {}",
            config.max_pages_limit, config.default_max_pages
        )));
    }

    if config.max_links_per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "max_links_per_page must be >= 1, got {}",
            config.max_links_per_page
        )));
    }

    if config.page_load_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "page_load_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "navigation_timeout_secs must be >= 1".to_string(),
        ));
    }

    // Anything near a quarter of an A4 width leaves no printable area.
    if config.margin_px > 200 {
        return Err(ConfigError::Validation(format!(
            "margin_px must be <= 200, got {}",
            config.margin_px
        )));
    }

    if let Some(path) = &config.chrome_executable {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "chrome_executable cannot be empty when set".to_string(),
            ));
        }
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "renderer user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates progress configuration
fn validate_progress_config(config: &ProgressConfig) -> Result<(), ConfigError> {
    if config.channel_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "channel_capacity must be >= 1, got {}",
            config.channel_capacity
        )));
    }

    Ok(())
}
