use crate::config::types::{ApiConfig, PdfConfig, Settings, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_site_config(&settings.site)?;
    validate_api_config(&settings.api)?;
    validate_pdf_config(&settings.pdf)?;
    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_base_url("site.base-url", &config.base_url)?;

    if config.login_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site.login-path cannot be empty".to_string(),
        ));
    }

    if config.listing_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site.listing-path cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site.user-agent cannot be empty".to_string(),
        ));
    }

    if config.bad_login_marker.is_empty() {
        return Err(ConfigError::Validation(
            "site.bad-login-marker cannot be empty".to_string(),
        ));
    }

    if config.max_discovery_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "site.max-discovery-pages must be >= 1, got {}",
            config.max_discovery_pages
        )));
    }

    validate_timeout("site.timeout-secs", config.timeout_secs)?;

    Ok(())
}

/// Validates item API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    validate_base_url("api.base-url", &config.base_url)?;
    validate_timeout("api.timeout-secs", config.timeout_secs)?;

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "api.max-retries must be between 0 and 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates PDF configuration
fn validate_pdf_config(config: &PdfConfig) -> Result<(), ConfigError> {
    if config.renderer.trim().is_empty() {
        return Err(ConfigError::Validation(
            "pdf.renderer cannot be empty".to_string(),
        ));
    }

    if config.max_name_length < 8 || config.max_name_length > 200 {
        return Err(ConfigError::Validation(format!(
            "pdf.max-name-length must be between 8 and 200, got {}",
            config.max_name_length
        )));
    }

    Ok(())
}

/// Base URLs must be absolute http(s) and end in '/' so relative joins keep
/// their last path segment
fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    if !url.path().ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "{} must end with '/', got '{}'",
            field, value
        )));
    }

    Ok(())
}

fn validate_timeout(field: &str, secs: u64) -> Result<(), ConfigError> {
    if secs < 1 || secs > 600 {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and 600 seconds, got {}",
            field, secs
        )));
    }
    Ok(())
}
