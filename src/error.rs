//! Error taxonomy for a provenance run.
//!
//! Every variant is fatal: the run aborts on the first error and no output
//! file is written.
use std::path::PathBuf;

/// Failure to turn one image reference into a registry digest.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The inspection tool could not run, timed out, or exited non-zero.
    #[error("failed to inspect image '{image}': {detail}")]
    InspectionFailed { image: String, detail: String },

    /// The tool succeeded but reported no registry digest.
    #[error("no registry digest found for image '{image}'")]
    DigestMissing { image: String },
}

impl ResolveError {
    pub fn inspection_failed(image: &str, detail: impl Into<String>) -> Self {
        Self::InspectionFailed {
            image: image.to_string(),
            detail: detail.into(),
        }
    }

    pub fn digest_missing(image: &str) -> Self {
        Self::DigestMissing {
            image: image.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    #[error("{} not found", path.display())]
    DescriptorNotFound { path: PathBuf },

    /// Unreadable file, invalid YAML, or no `services` mapping.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("service '{service}': {error}")]
    Resolve { service: String, error: ResolveError },

    #[error("failed to write {}: {error}", path.display())]
    Write {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl ProvenanceError {
    pub fn parse(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn write(path: &std::path::Path, error: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            error,
        }
    }
}
