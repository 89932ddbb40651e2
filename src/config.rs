//! Run configuration: CLI flags first, then environment, then defaults.
use crate::cli::RecordArgs;
use crate::env::EnvSnapshot;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;

pub const TOOL_ENV: &str = "RECORD_PROVENANCE_TOOL";
pub const TIMEOUT_ENV: &str = "RECORD_PROVENANCE_TIMEOUT_SECS";

pub const DEFAULT_TOOL: &str = "docker";
pub const DEFAULT_INSPECT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Program invoked as `<tool> image inspect ...`.
    pub tool: String,
    pub inspect_timeout: Duration,
}

pub fn resolve_config(args: &RecordArgs, env: &EnvSnapshot) -> Result<RecorderConfig> {
    let tool = match args.tool.as_deref().or_else(|| env.get(TOOL_ENV)) {
        Some(tool) if tool.trim().is_empty() => return Err(anyhow!("inspection tool is empty")),
        Some(tool) => tool.to_string(),
        None => DEFAULT_TOOL.to_string(),
    };

    let timeout_secs = match args.inspect_timeout {
        Some(secs) => secs,
        None => match env.get(TIMEOUT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("parse {TIMEOUT_ENV}={raw:?}"))?,
            None => DEFAULT_INSPECT_TIMEOUT_SECS,
        },
    };
    if timeout_secs == 0 {
        return Err(anyhow!("inspection timeout must be at least 1 second"));
    }

    Ok(RecorderConfig {
        tool,
        inspect_timeout: Duration::from_secs(timeout_secs),
    })
}
