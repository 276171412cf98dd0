//! Writes the snapshot to `<output_dir>/bsm-structure-<year>.json`.

use crate::config::paths::snapshot_file_path;
use crate::error::AppError;
use crate::snapshot::Snapshot;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Serializes `snapshot` as pretty JSON and replaces the yearly file.
///
/// The document goes to a `.tmp` sibling first and is renamed over the
/// target, so readers never see a half-written snapshot.
///
/// # Errors
/// * `AppError::Io` - Directory cannot be created or file cannot be written
/// * `AppError::ApiParse` - Serialization failed
pub async fn write_snapshot(snapshot: &Snapshot, output_dir: &str) -> Result<PathBuf, AppError> {
    if !Path::new(output_dir).exists() {
        fs::create_dir_all(output_dir).await?;
        info!("Created output directory {output_dir}");
    }

    let output_file = snapshot_file_path(output_dir, snapshot.year);
    let mut temp_name = output_file.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_file = PathBuf::from(temp_name);

    let content = serde_json::to_vec_pretty(snapshot)?;

    if let Err(e) = replace_file(&temp_file, &output_file, &content).await {
        let _ = fs::remove_file(&temp_file).await;
        return Err(e.into());
    }

    let meta = &snapshot.metadata;
    info!("Snapshot written to {}", output_file.display());
    info!(
        "Organizations: {} successful, {} failed, {} total",
        meta.successful_organizations, meta.failed_organizations, meta.total_organizations
    );
    if meta.failed_organizations > 0 {
        warn!(
            "{} organization(s) could not be processed, see errors above",
            meta.failed_organizations
        );
    }

    Ok(output_file)
}

/// Writes `content` plus a trailing newline to `temp_file`, syncs it and
/// renames it over `target`. The caller removes `temp_file` on error.
async fn replace_file(temp_file: &Path, target: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_file).await?;
    file.write_all(content).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(temp_file, target).await
}
