pub mod urls;
pub mod http_client;
pub mod retry;
mod fetch_utils;
mod core;

// Re-export URL utilities
pub use urls::*;
// Re-export HTTP client utilities
pub use http_client::*;
pub use retry::RetryPolicy;
// Re-export core API functions
pub use self::core::*;
