//! CLI argument parsing.
//!
//! Two paths are required; everything else has a default or an environment
//! fallback resolved in [`crate::config`].
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "record-provenance",
    version,
    about = "Record image digests, a timestamp and CI run metadata for assessment results",
    after_help = "Environment:\n  RECORD_PROVENANCE_TOOL          Container CLI used for `image inspect` (default: docker)\n  RECORD_PROVENANCE_TIMEOUT_SECS  Per-image inspection timeout (default: 60)\n  RUST_LOG                        Log filter (overrides --verbose)\n\nExample:\n  record-provenance --compose docker-compose.yml --output results/provenance.json"
)]
pub struct RecordArgs {
    /// Path to docker-compose.yml
    #[arg(long, value_name = "PATH")]
    pub compose: PathBuf,

    /// Path to output provenance JSON file
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// Container CLI used for `image inspect`
    #[arg(long, value_name = "PROGRAM")]
    pub tool: Option<String>,

    /// Seconds to wait for each image inspection
    #[arg(long, value_name = "SECS")]
    pub inspect_timeout: Option<u64>,

    /// Emit debug logs to stderr
    #[arg(long)]
    pub verbose: bool,
}
