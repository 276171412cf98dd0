use crate::constants::{self, env_vars};
use crate::data_fetcher::api::RetryPolicy;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

pub mod organizations;
pub mod paths;
pub mod validation;

pub use organizations::{Organizations, load_organizations};

use validation::validate_config;

/// Runtime settings for one extraction run.
///
/// Every field has a default, so a missing settings file is not an error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the BSM API, including the scheme.
    pub api_domain: String,
    /// JSON file mapping organization short names to IDs.
    pub organizations_path: String,
    /// Directory the yearly snapshot is written into.
    pub output_dir: String,
    /// Path to the log file. If not specified, logs go to the platform cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for a single API request.
    pub http_timeout_seconds: u64,
    /// Total attempts per organization, including the first one.
    pub max_attempts: u32,
    /// Fixed wait after a timeout, connection error or server error.
    pub retry_delay_seconds: u64,
    /// Base of the exponential backoff after a 429 response.
    pub rate_limit_base_seconds: u64,
    /// Cap for a single backoff wait.
    pub max_backoff_seconds: u64,
    /// Pause between two organizations' requests.
    pub request_delay_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_domain: constants::DEFAULT_API_DOMAIN.to_string(),
            organizations_path: constants::paths::ORGANIZATIONS_FILE.to_string(),
            output_dir: constants::paths::OUTPUT_DIR.to_string(),
            log_file_path: None,
            http_timeout_seconds: constants::DEFAULT_HTTP_TIMEOUT_SECONDS,
            max_attempts: constants::retry::MAX_ATTEMPTS,
            retry_delay_seconds: constants::retry::RETRY_DELAY_SECONDS,
            rate_limit_base_seconds: constants::retry::RATE_LIMIT_BASE_SECONDS,
            max_backoff_seconds: constants::retry::MAX_BACKOFF_SECONDS,
            request_delay_seconds: constants::retry::REQUEST_DELAY_SECONDS,
        }
    }
}

impl Config {
    /// Loads the settings file (if any), applies environment overrides and validates.
    ///
    /// # Environment Variables
    /// - `BSM_SETTINGS_FILE` - Location of the TOML settings file
    /// - `BSM_API_DOMAIN` - Override API domain
    /// - `BSM_ORGANIZATIONS_FILE` - Override organization mapping path
    /// - `BSM_OUTPUT_DIR` - Override output directory
    /// - `BSM_LOG_FILE` - Override log file path
    /// - `BSM_HTTP_TIMEOUT` - Override HTTP timeout in seconds (default: 30)
    /// - `BSM_MAX_ATTEMPTS` - Override attempts per organization (default: 3)
    /// - `BSM_RETRY_DELAY` - Override retry delay in seconds (default: 10)
    /// - `BSM_REQUEST_DELAY` - Override inter-organization delay in seconds (default: 2)
    ///
    /// # Returns
    /// * `Ok(Config)` - Loaded and validated configuration
    /// * `Err(AppError)` - Settings file unreadable, invalid TOML or failed validation
    pub async fn load() -> Result<Self, AppError> {
        let settings_path = paths::get_settings_path();

        let mut config = if Path::new(&settings_path).exists() {
            Self::load_from_path(&settings_path).await?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads settings from a specific TOML file without consulting the environment.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            AppError::config_error(format!("Cannot read settings file '{path}': {e}"))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Overrides fields with any `BSM_*` environment variables that are set.
    /// Numeric variables that do not parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_domain) = std::env::var(env_vars::API_DOMAIN) {
            self.api_domain = api_domain;
        }
        if let Ok(path) = std::env::var(env_vars::ORGANIZATIONS_FILE) {
            self.organizations_path = path;
        }
        if let Ok(dir) = std::env::var(env_vars::OUTPUT_DIR) {
            self.output_dir = dir;
        }
        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }
        if let Some(timeout) = env_number(env_vars::HTTP_TIMEOUT) {
            self.http_timeout_seconds = timeout;
        }
        if let Some(attempts) = env_number(env_vars::MAX_ATTEMPTS) {
            self.max_attempts = attempts;
        }
        if let Some(delay) = env_number(env_vars::RETRY_DELAY) {
            self.retry_delay_seconds = delay;
        }
        if let Some(delay) = env_number(env_vars::REQUEST_DELAY) {
            self.request_delay_seconds = delay;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Retry parameters for the fetch layer.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.retry_delay_seconds),
            rate_limit_base: Duration::from_secs(self.rate_limit_base_seconds),
            max_backoff: Duration::from_secs(self.max_backoff_seconds),
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_seconds)
    }

    /// Returns the directory the log file is written into.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn clear_env() {
        unsafe {
            for name in [
                env_vars::API_DOMAIN,
                env_vars::SETTINGS_FILE,
                env_vars::ORGANIZATIONS_FILE,
                env_vars::OUTPUT_DIR,
                env_vars::LOG_FILE,
                env_vars::HTTP_TIMEOUT,
                env_vars::MAX_ATTEMPTS,
                env_vars::RETRY_DELAY,
                env_vars::REQUEST_DELAY,
            ] {
                std::env::remove_var(name);
            }
        }
    }

    #[test]
    fn test_default_matches_constants() {
        let config = Config::default();
        assert_eq!(config.api_domain, "https://bsm.baseball-softball.de");
        assert_eq!(config.organizations_path, "config/organizations.json");
        assert_eq!(config.output_dir, "data");
        assert_eq!(config.http_timeout_seconds, 30);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay_seconds, 10);
        assert_eq!(config.request_delay_seconds, 2);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_partial_settings_file_keeps_defaults() {
        let temp_dir = tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.toml");
        tokio::fs::write(
            &settings_path,
            r#"
output_dir = "public/data"
max_attempts = 5
"#,
        )
        .await
        .unwrap();

        let config = Config::load_from_path(&settings_path.to_string_lossy())
            .await
            .unwrap();

        assert_eq!(config.output_dir, "public/data");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.api_domain, constants::DEFAULT_API_DOMAIN);
        assert_eq!(config.retry_delay_seconds, 10);
    }

    #[tokio::test]
    async fn test_load_invalid_toml_fails() {
        let temp_dir = tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.toml");
        tokio::fs::write(&settings_path, "max_attempts = \"many\"")
            .await
            .unwrap();

        let result = Config::load_from_path(&settings_path.to_string_lossy()).await;
        assert!(matches!(result, Err(AppError::TomlDeserialize(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_load_without_settings_file_uses_defaults() {
        clear_env();
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        unsafe {
            std::env::set_var(env_vars::SETTINGS_FILE, &missing);
        }

        let config = Config::load().await.unwrap();
        assert_eq!(config, Config::default());

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_environment_variables_override_file() {
        clear_env();
        let temp_dir = tempdir().unwrap();
        let settings_path = temp_dir.path().join("settings.toml");
        tokio::fs::write(
            &settings_path,
            r#"
api_domain = "https://file.example.com"
http_timeout_seconds = 12
"#,
        )
        .await
        .unwrap();

        unsafe {
            std::env::set_var(env_vars::SETTINGS_FILE, &settings_path);
            std::env::set_var(env_vars::API_DOMAIN, "https://env.example.com");
            std::env::set_var(env_vars::REQUEST_DELAY, "0");
            std::env::set_var(env_vars::MAX_ATTEMPTS, "not-a-number");
        }

        let config = Config::load().await.unwrap();
        assert_eq!(config.api_domain, "https://env.example.com");
        assert_eq!(config.http_timeout_seconds, 12);
        assert_eq!(config.request_delay_seconds, 0);
        assert_eq!(config.max_attempts, 3, "Unparsable override is ignored");

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_load_rejects_invalid_override() {
        clear_env();
        let temp_dir = tempdir().unwrap();
        unsafe {
            std::env::set_var(env_vars::SETTINGS_FILE, temp_dir.path().join("missing.toml"));
            std::env::set_var(env_vars::MAX_ATTEMPTS, "0");
        }

        let result = Config::load().await;
        assert!(matches!(result, Err(AppError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = Config {
            max_attempts: 4,
            retry_delay_seconds: 7,
            rate_limit_base_seconds: 3,
            max_backoff_seconds: 50,
            ..Config::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.retry_delay, Duration::from_secs(7));
        assert_eq!(policy.rate_limit_base, Duration::from_secs(3));
        assert_eq!(policy.max_backoff, Duration::from_secs(50));
        assert_eq!(config.request_delay(), Duration::from_secs(2));
    }
}
