use super::fetch_utils::fetch;
use super::retry::RetryPolicy;
use super::urls::build_matches_url;
use crate::data_fetcher::models::MatchRecord;
use crate::error::AppError;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, instrument, warn};

/// Fetches every match of one organization in one season.
///
/// The body must be a JSON array. Elements are decoded one by one so a
/// single malformed record is skipped instead of failing the organization.
///
/// # Returns
/// * `Ok(Vec<MatchRecord>)` - Decoded match records, possibly empty
/// * `Err(AppError)` - Request failed permanently or retries were exhausted
#[instrument(skip(client, policy))]
pub async fn fetch_organization_matches(
    client: &Client,
    api_domain: &str,
    policy: &RetryPolicy,
    org_id: &str,
    year: i32,
) -> Result<Vec<MatchRecord>, AppError> {
    let url = build_matches_url(api_domain, org_id, year)?;
    let raw: Vec<Value> = fetch(client, &url, policy).await?;

    let total = raw.len();
    let records: Vec<MatchRecord> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable match record #{index} for {org_id}: {e}");
                None
            }
        })
        .collect();

    info!(
        "Received {} match records for {org_id} ({} undecodable)",
        records.len(),
        total - records.len()
    );
    Ok(records)
}
