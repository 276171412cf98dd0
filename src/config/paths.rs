use crate::constants::{env_vars, paths};
use std::path::Path;

/// Returns the path of the TOML settings file.
///
/// # Notes
/// - `BSM_SETTINGS_FILE` wins when set
/// - Otherwise `config/settings.toml` relative to the working directory,
///   next to the organization mapping
pub fn get_settings_path() -> String {
    std::env::var(env_vars::SETTINGS_FILE).unwrap_or_else(|_| paths::SETTINGS_FILE.to_string())
}

/// Returns the platform-specific path for the log directory.
///
/// # Notes
/// - Uses the platform cache directory (e.g., ~/.cache on Linux)
/// - Falls back to the current directory if the cache directory is unavailable
pub fn get_log_dir_path() -> String {
    dirs::cache_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join("bsm_structure")
        .join("logs")
        .to_string_lossy()
        .to_string()
}

/// Full path of the snapshot for `year` inside `output_dir`.
pub fn snapshot_file_path(output_dir: &str, year: i32) -> std::path::PathBuf {
    Path::new(output_dir).join(format!("{}-{year}.json", paths::SNAPSHOT_FILE_PREFIX))
}
