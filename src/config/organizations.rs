//! Loading of the organization short-name to ID mapping

use crate::error::AppError;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// One configured organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationEntry {
    /// Short name used as the key in the snapshot, e.g. `BWBSV`.
    pub name: String,
    /// Opaque organization ID passed to the API, e.g. `organization_7`.
    pub id: String,
}

/// Configured organizations in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organizations {
    entries: Vec<OrganizationEntry>,
}

impl Organizations {
    pub fn iter(&self) -> impl Iterator<Item = &OrganizationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses the JSON mapping. Keys must be non-empty; values must be strings.
    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| AppError::config_error(format!("Invalid JSON in organization file: {e}")))?;

        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(AppError::config_error(format!(
                    "Organization file must contain a JSON object, got {}",
                    json_type_name(&other)
                )));
            }
        };

        let mut entries = Vec::with_capacity(map.len());
        for (name, id) in map {
            if name.trim().is_empty() {
                return Err(AppError::config_error(
                    "Organization short name cannot be empty",
                ));
            }
            let id = match id {
                Value::String(id) => id,
                other => {
                    return Err(AppError::config_error(format!(
                        "Organization '{name}' must map to a string ID, got {}",
                        json_type_name(&other)
                    )));
                }
            };
            entries.push(OrganizationEntry { name, id });
        }

        Ok(Organizations { entries })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Organizations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Organizations {
            entries: iter
                .into_iter()
                .map(|(name, id)| OrganizationEntry {
                    name: name.into(),
                    id: id.into(),
                })
                .collect(),
        }
    }
}

/// Reads the organization mapping from `path`.
///
/// # Errors
/// `AppError::Config` when the file is missing, unreadable, not a JSON
/// object of strings, or lists no organizations at all.
pub async fn load_organizations(path: &str) -> Result<Organizations, AppError> {
    if !Path::new(path).exists() {
        return Err(AppError::config_error(format!(
            "Organization file not found: {path}"
        )));
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::config_error(format!("Cannot read organization file '{path}': {e}")))?;

    let organizations = Organizations::from_json_str(&content)?;
    if organizations.is_empty() {
        return Err(AppError::config_error(format!(
            "No organizations configured in {path}"
        )));
    }

    info!("Loaded {} organizations from {path}", organizations.len());
    for entry in organizations.iter() {
        debug!("Organization {} -> {}", entry.name, entry.id);
    }

    Ok(organizations)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
