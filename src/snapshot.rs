//! Assembles the yearly snapshot across all configured organizations.

use crate::config::{Config, Organizations};
use crate::data_fetcher::api::{RetryPolicy, fetch_organization_matches};
use crate::data_fetcher::models::{LeagueMap, OrganizationStructure};
use crate::data_fetcher::processors::build_hierarchy;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{error, info, warn};

/// The full output document for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub year: i32,
    pub organizations: BTreeMap<String, OrganizationStructure>,
    pub metadata: SnapshotMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// UTC timestamp (RFC 3339) taken when the last organization was processed.
    pub generated_at: String,
    pub total_organizations: usize,
    pub successful_organizations: usize,
    pub failed_organizations: usize,
}

/// Parameters the assembler needs from the runtime configuration.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub api_domain: String,
    pub retry: RetryPolicy,
    /// Pause between two organizations; not applied after the last one.
    pub request_delay: Duration,
}

impl From<&Config> for SnapshotOptions {
    fn from(config: &Config) -> Self {
        SnapshotOptions {
            api_domain: config.api_domain.clone(),
            retry: config.retry_policy(),
            request_delay: config.request_delay(),
        }
    }
}

/// Fetches and folds every organization in config order.
///
/// A failed organization is recorded with its `error` and counted in
/// `failed_organizations`; it never aborts the run. League IDs stay unique
/// across organizations: a league already reported by an earlier
/// organization is dropped from later ones.
pub async fn build_snapshot(
    client: &Client,
    options: &SnapshotOptions,
    organizations: &Organizations,
    year: i32,
) -> Snapshot {
    let total = organizations.len();
    let mut result = BTreeMap::new();
    let mut league_owners: HashMap<i64, String> = HashMap::new();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for (index, org) in organizations.iter().enumerate() {
        info!("[{}/{}] Processing {} ({})", index + 1, total, org.name, org.id);

        let fetched = fetch_organization_matches(
            client,
            &options.api_domain,
            &options.retry,
            &org.id,
            year,
        )
        .await;

        let entry = match fetched {
            Ok(records) => {
                let (leagues, stats) = build_hierarchy(&records);
                if stats.skipped_records > 0 || stats.skipped_teams > 0 {
                    warn!(
                        "{}: skipped {} incomplete match records and {} incomplete team references",
                        org.name, stats.skipped_records, stats.skipped_teams
                    );
                }

                let leagues = claim_leagues(&org.name, leagues, &mut league_owners);
                let structure = OrganizationStructure::fetched(org.id.clone(), leagues);
                if structure.leagues.is_empty() {
                    warn!("No leagues found for {} in {year}", org.name);
                }
                info!(
                    "{}: {} leagues, {} teams",
                    org.name,
                    structure.leagues.len(),
                    structure.team_count()
                );
                successful += 1;
                structure
            }
            Err(e) => {
                error!("Could not fetch data for {} ({}): {e}", org.name, org.id);
                failed += 1;
                OrganizationStructure::failed(org.id.clone(), e.to_string())
            }
        };
        result.insert(org.name.clone(), entry);

        if index + 1 < total && !options.request_delay.is_zero() {
            tokio::time::sleep(options.request_delay).await;
        }
    }

    Snapshot {
        year,
        organizations: result,
        metadata: SnapshotMetadata {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            total_organizations: total,
            successful_organizations: successful,
            failed_organizations: failed,
        },
    }
}

/// Keeps only leagues not yet owned by another organization and records
/// `org_name` as the owner of the rest.
fn claim_leagues(
    org_name: &str,
    leagues: LeagueMap,
    owners: &mut HashMap<i64, String>,
) -> LeagueMap {
    leagues
        .into_iter()
        .filter(|(league_id, league)| {
            if let Some(owner) = owners.get(league_id)
                && owner != org_name
            {
                warn!(
                    "League {league_id} ('{}') already listed under {owner}, dropping it from {org_name}",
                    league.name
                );
                return false;
            }
            owners.insert(*league_id, org_name.to_string());
            true
        })
        .collect()
}
