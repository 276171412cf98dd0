//! Output side of the hierarchy: organization → league → team → club.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub acronym: String,
    pub short_name: String,
    pub logo_url: Option<String>,
}

/// A team is backed by exactly one club or by a joint team
/// (Spielgemeinschaft) of two or more clubs. Serialized flattened into the
/// team as either a `club` object or a `clubs` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClubAffiliation {
    Single { club: Club },
    Joint { clubs: Vec<Club> },
}

impl ClubAffiliation {
    /// Normalizes a club list: one club becomes `Single`, two or more become
    /// `Joint` in the given order, an empty list has no affiliation.
    pub fn from_clubs(mut clubs: Vec<Club>) -> Option<Self> {
        match clubs.len() {
            0 => None,
            1 => clubs.pop().map(|club| ClubAffiliation::Single { club }),
            _ => Some(ClubAffiliation::Joint { clubs }),
        }
    }

    pub fn clubs(&self) -> &[Club] {
        match self {
            ClubAffiliation::Single { club } => std::slice::from_ref(club),
            ClubAffiliation::Joint { clubs } => clubs,
        }
    }

    pub fn is_joint(&self) -> bool {
        matches!(self, ClubAffiliation::Joint { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub affiliation: ClubAffiliation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: i64,
    pub name: String,
    /// Sorted by team ID, each ID at most once.
    pub teams: Vec<Team>,
}

/// Leagues of one organization keyed by league ID.
pub type LeagueMap = BTreeMap<i64, League>;

/// One organization's entry in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationStructure {
    pub id: String,
    pub leagues: LeagueMap,
    /// Set when the organization could not be fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrganizationStructure {
    pub fn fetched(id: impl Into<String>, leagues: LeagueMap) -> Self {
        OrganizationStructure {
            id: id.into(),
            leagues,
            error: None,
        }
    }

    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        OrganizationStructure {
            id: id.into(),
            leagues: LeagueMap::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn team_count(&self) -> usize {
        self.leagues.values().map(|league| league.teams.len()).sum()
    }
}
