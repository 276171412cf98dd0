//! BSM structure extractor library
//!
//! Fetches the matches of regional baseball/softball organizations from the
//! BSM API and folds them into an organization → league → team → club
//! snapshot for one season.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bsm_structure::config::{Config, load_organizations};
//! use bsm_structure::data_fetcher::api::create_http_client_with_timeout;
//! use bsm_structure::error::AppError;
//! use bsm_structure::output::write_snapshot;
//! use bsm_structure::snapshot::{SnapshotOptions, build_snapshot};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let organizations = load_organizations(&config.organizations_path).await?;
//!     let client = create_http_client_with_timeout(Duration::from_secs(30))?;
//!
//!     let snapshot =
//!         build_snapshot(&client, &SnapshotOptions::from(&config), &organizations, 2025).await;
//!     write_snapshot(&snapshot, &config.output_dir).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;
pub mod logging;
pub mod output;
pub mod snapshot;

// Re-export commonly used types for convenience
pub use config::Config;
pub use data_fetcher::api::{RetryPolicy, fetch_organization_matches};
pub use data_fetcher::build_hierarchy;
pub use error::AppError;
pub use snapshot::{Snapshot, SnapshotMetadata, build_snapshot};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
