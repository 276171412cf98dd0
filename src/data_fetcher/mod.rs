pub mod api;
pub mod models;
pub mod processors;

pub use api::{RetryPolicy, fetch_organization_matches};
pub use models::{MatchRecord, OrganizationStructure};
pub use processors::build_hierarchy;
