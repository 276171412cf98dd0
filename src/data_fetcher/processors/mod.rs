pub mod hierarchy;

pub use hierarchy::{BuildStats, build_hierarchy};
