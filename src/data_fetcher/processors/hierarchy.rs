//! Folds flat match records into the league → team → club hierarchy.

use crate::data_fetcher::models::{
    Club, ClubAffiliation, ClubRef, League, LeagueMap, MatchRecord, Team, TeamRef,
};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{debug, warn};

/// Counters collected while building one organization's hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub records: usize,
    /// Records without a league ID or without a single usable team.
    pub skipped_records: usize,
    /// Team references without an ID or without any club.
    pub skipped_teams: usize,
    /// Later sightings of a known league or team that disagreed with the first one.
    pub conflicts: usize,
}

struct LeagueBuilder {
    name: String,
    teams: BTreeMap<i64, Team>,
}

/// Builds the hierarchy for one organization.
///
/// First-seen wins for league names, team names and club affiliations; later
/// sightings are only compared and a disagreement is logged. The result does
/// not depend on how often a record repeats, so duplicate matches across a
/// response never duplicate teams or leagues.
pub fn build_hierarchy(records: &[MatchRecord]) -> (LeagueMap, BuildStats) {
    let mut stats = BuildStats {
        records: records.len(),
        ..BuildStats::default()
    };
    let mut leagues: BTreeMap<i64, LeagueBuilder> = BTreeMap::new();

    for record in records {
        let Some((league_id, league_name)) = record
            .league
            .as_ref()
            .and_then(|league| league.id.map(|id| (id, league.name.as_deref())))
        else {
            debug!("Skipping match {:?}: no league reference", record.id);
            stats.skipped_records += 1;
            continue;
        };

        let mut teams = Vec::with_capacity(2);
        for team_ref in record.teams() {
            match to_team(team_ref) {
                Some(team) => teams.push(team),
                None => {
                    debug!(
                        "Skipping team {:?} in match {:?}: missing ID or club",
                        team_ref.id, record.id
                    );
                    stats.skipped_teams += 1;
                }
            }
        }
        if teams.is_empty() {
            debug!("Skipping match {:?}: no usable team reference", record.id);
            stats.skipped_records += 1;
            continue;
        }

        let league = leagues.entry(league_id).or_insert_with(|| LeagueBuilder {
            name: league_name.unwrap_or_default().to_string(),
            teams: BTreeMap::new(),
        });
        if let Some(name) = league_name
            && name != league.name
        {
            warn!(
                "League {league_id} reported as '{name}', keeping first-seen name '{}'",
                league.name
            );
            stats.conflicts += 1;
        }

        for team in teams {
            match league.teams.entry(team.id) {
                Entry::Vacant(slot) => {
                    slot.insert(team);
                }
                Entry::Occupied(existing) => {
                    let existing = existing.get();
                    if existing.name != team.name || existing.affiliation != team.affiliation {
                        warn!(
                            "Team {} in league {league_id} differs from first sighting ('{}' vs '{}'), keeping first",
                            team.id, existing.name, team.name
                        );
                        stats.conflicts += 1;
                    }
                }
            }
        }
    }

    let leagues = leagues
        .into_iter()
        .map(|(id, builder)| {
            let league = League {
                id,
                name: builder.name,
                teams: builder.teams.into_values().collect(),
            };
            (id, league)
        })
        .collect();

    (leagues, stats)
}

fn to_team(team: &TeamRef) -> Option<Team> {
    let id = team.id?;

    let mut clubs: Vec<Club> = team.clubs.iter().filter_map(to_club).collect();
    if clubs.is_empty()
        && let Some(club) = team.club.as_ref().and_then(to_club)
    {
        clubs.push(club);
    }

    let affiliation = ClubAffiliation::from_clubs(clubs)?;
    Some(Team {
        id,
        name: team.name.clone().unwrap_or_default(),
        affiliation,
    })
}

fn to_club(club: &ClubRef) -> Option<Club> {
    Some(Club {
        id: club.id?,
        name: club.name.clone().unwrap_or_default(),
        acronym: club.acronym.clone().unwrap_or_default(),
        short_name: club.short_name.clone().unwrap_or_default(),
        logo_url: club.logo_url.clone(),
    })
}
