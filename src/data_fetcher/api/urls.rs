//! URL building utilities for API endpoints

use crate::error::AppError;
use reqwest::Url;

/// Builds the URL listing every match of one organization in one season.
///
/// Query keys use the API's bracket syntax and are percent-encoded.
///
/// # Example
/// ```
/// use bsm_structure::data_fetcher::api::build_matches_url;
///
/// let url = build_matches_url("https://bsm.example.com", "organization_7", 2025).unwrap();
/// assert_eq!(
///     url,
///     "https://bsm.example.com/matches.json?compact=true\
///      &filters%5Bseasons%5D%5B%5D=2025\
///      &filters%5Borganizations%5D%5B%5D=organization_7\
///      &filters%5Bgamedays%5D%5B%5D=any"
/// );
/// ```
pub fn build_matches_url(api_domain: &str, org_id: &str, year: i32) -> Result<String, AppError> {
    let base = format!("{}/matches.json", api_domain.trim_end_matches('/'));
    let mut url = Url::parse(&base)
        .map_err(|e| AppError::config_error(format!("Invalid API domain '{api_domain}': {e}")))?;

    url.query_pairs_mut()
        .append_pair("compact", "true")
        .append_pair("filters[seasons][]", &year.to_string())
        .append_pair("filters[organizations][]", org_id)
        .append_pair("filters[gamedays][]", "any");

    Ok(url.to_string())
}
