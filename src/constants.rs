//! Application-wide constants and default configuration values
//!
//! Defaults live here so that `Config` and the retry policy share a single
//! source of truth.

/// Public BSM API the extractor reads from
pub const DEFAULT_API_DOMAIN: &str = "https://bsm.baseball-softball.de";

/// Default timeout for a single HTTP request in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of idle connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 4;

/// User agent sent with every API request
pub const USER_AGENT: &str = concat!("bsm_structure/", env!("CARGO_PKG_VERSION"));

/// Filesystem defaults
pub mod paths {
    /// Organization short-name to ID mapping
    pub const ORGANIZATIONS_FILE: &str = "config/organizations.json";

    /// Optional TOML settings file
    pub const SETTINGS_FILE: &str = "config/settings.toml";

    /// Directory the snapshot is written into
    pub const OUTPUT_DIR: &str = "data";

    /// File name used for the rolling log
    pub const LOG_FILE_NAME: &str = "bsm_structure.log";

    /// Prefix of the snapshot file; the full name is `<prefix>-<year>.json`
    pub const SNAPSHOT_FILE_PREFIX: &str = "bsm-structure";
}

/// Retry configuration
pub mod retry {
    /// Total attempts per organization, including the first one
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Fixed wait after a timeout, connection error or server error (seconds)
    pub const RETRY_DELAY_SECONDS: u64 = 10;

    /// Base of the exponential backoff after a rate-limit response (seconds)
    pub const RATE_LIMIT_BASE_SECONDS: u64 = 10;

    /// Upper bound for a single backoff wait (seconds)
    pub const MAX_BACKOFF_SECONDS: u64 = 120;

    /// Courtesy pause between two organizations' requests (seconds)
    pub const REQUEST_DELAY_SECONDS: u64 = 2;
}

/// Environment variable names
pub mod env_vars {
    pub const API_DOMAIN: &str = "BSM_API_DOMAIN";
    pub const SETTINGS_FILE: &str = "BSM_SETTINGS_FILE";
    pub const ORGANIZATIONS_FILE: &str = "BSM_ORGANIZATIONS_FILE";
    pub const OUTPUT_DIR: &str = "BSM_OUTPUT_DIR";
    pub const LOG_FILE: &str = "BSM_LOG_FILE";
    pub const HTTP_TIMEOUT: &str = "BSM_HTTP_TIMEOUT";
    pub const MAX_ATTEMPTS: &str = "BSM_MAX_ATTEMPTS";
    pub const RETRY_DELAY: &str = "BSM_RETRY_DELAY";
    pub const REQUEST_DELAY: &str = "BSM_REQUEST_DELAY";
}

/// Validation limits
pub mod validation {
    /// Earliest season accepted on the command line
    pub const MIN_YEAR: i32 = 1900;

    /// Latest season accepted on the command line
    pub const MAX_YEAR: i32 = 2100;
}
