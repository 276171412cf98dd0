pub mod api;
pub mod structure;

pub use api::{ClubRef, LeagueEntryRef, LeagueRef, MatchRecord, TeamRef};
pub use structure::{Club, ClubAffiliation, League, LeagueMap, OrganizationStructure, Team};
