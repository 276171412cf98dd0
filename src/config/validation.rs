use super::Config;
use crate::error::AppError;
use std::path::Path;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API domain cannot be empty and must carry an http(s) scheme
/// - HTTP timeout and attempt count must be positive
/// - Organization file path and output directory cannot be empty
/// - If log file path is provided, it cannot be empty and its parent
///   directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    let api_domain = config.api_domain.trim();
    if api_domain.is_empty() {
        return Err(AppError::config_error("API domain cannot be empty"));
    }
    if !api_domain.starts_with("http://") && !api_domain.starts_with("https://") {
        return Err(AppError::config_error(format!(
            "API domain must start with http:// or https://, got '{api_domain}'"
        )));
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error("HTTP timeout must be at least 1 second"));
    }
    if config.max_attempts == 0 {
        return Err(AppError::config_error("max_attempts must be at least 1"));
    }

    if config.organizations_path.trim().is_empty() {
        return Err(AppError::config_error("Organization file path cannot be empty"));
    }
    if config.output_dir.trim().is_empty() {
        return Err(AppError::config_error("Output directory cannot be empty"));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
