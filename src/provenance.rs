//! Provenance record assembly and atomic persistence.
use crate::collector::DigestMap;
use crate::env::EnvSnapshot;
use crate::error::ProvenanceError;
use crate::github_actions::{collect_github_actions_metadata, GithubActionsMetadata};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// The artifact written for one assessment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub image_digests: DigestMap,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_actions: Option<GithubActionsMetadata>,
}

/// UTC, whole seconds, literal `Z` suffix.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Combine digests, the run instant and any CI metadata into one record.
pub fn assemble(digests: DigestMap, now: DateTime<Utc>, env: &EnvSnapshot) -> ProvenanceRecord {
    ProvenanceRecord {
        image_digests: digests,
        timestamp: format_timestamp(now),
        github_actions: collect_github_actions_metadata(env),
    }
}

/// Serialize the record as 2-space indented JSON.
pub fn render(record: &ProvenanceRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

/// Replace `path` with the rendered record.
///
/// The bytes go to a temporary file beside `path` that is renamed into place,
/// so readers see either the previous content or the complete new record.
/// The parent directory must already exist.
pub fn write_provenance(path: &Path, record: &ProvenanceRecord) -> Result<(), ProvenanceError> {
    let json = render(record).map_err(|err| ProvenanceError::write(path, err.into()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".provenance-").suffix(".tmp");
    // Temp files default to 0600; the record is meant to be shared.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    let mut staged = builder
        .tempfile_in(parent)
        .map_err(|err| ProvenanceError::write(path, err))?;
    fill_staged(&mut staged, json.as_bytes()).map_err(|err| ProvenanceError::write(path, err))?;
    staged
        .persist(path)
        .map_err(|err| ProvenanceError::write(path, err.error))?;

    tracing::info!(
        path = %path.display(),
        images = record.image_digests.len(),
        ci = record.github_actions.is_some(),
        "provenance written"
    );
    Ok(())
}

fn fill_staged(staged: &mut NamedTempFile, bytes: &[u8]) -> std::io::Result<()> {
    staged.write_all(bytes)?;
    staged.flush()?;
    staged.as_file().sync_all()
}

/// Assemble with the current clock and persist.
pub fn assemble_and_write(
    digests: DigestMap,
    output: &Path,
    env: &EnvSnapshot,
) -> Result<ProvenanceRecord, ProvenanceError> {
    let record = assemble(digests, Utc::now(), env);
    write_provenance(output, &record)?;
    Ok(record)
}
