use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod collector;
mod config;
mod descriptor;
mod env;
mod error;
mod github_actions;
mod provenance;
mod resolver;

use cli::RecordArgs;
use collector::collect_image_digests;
use config::{resolve_config, RecorderConfig};
use descriptor::parse_descriptor;
use env::EnvSnapshot;
use provenance::assemble_and_write;
use resolver::DockerInspector;

fn main() -> Result<()> {
    let args = RecordArgs::parse();
    init_tracing(args.verbose);

    let env = EnvSnapshot::from_process();
    let config = resolve_config(&args, &env)?;
    cmd_record(&args, &config, &env)
}

fn cmd_record(args: &RecordArgs, config: &RecorderConfig, env: &EnvSnapshot) -> Result<()> {
    let descriptor = parse_descriptor(&args.compose)?;
    if descriptor.is_empty() {
        tracing::warn!(compose = %args.compose.display(), "descriptor declares no services");
    }

    let inspector = DockerInspector::new(config.tool.clone(), config.inspect_timeout);
    tracing::debug!(
        tool = inspector.program(),
        timeout_secs = config.inspect_timeout.as_secs(),
        services = descriptor.len(),
        "resolving image digests"
    );
    let digests = collect_image_digests(&descriptor, &inspector)?;
    let record = assemble_and_write(digests, &args.output, env)?;

    println!(
        "Recorded provenance to {} ({} images)",
        args.output.display(),
        record.image_digests.len()
    );
    Ok(())
}

/// Logs go to stderr so stdout carries only the summary line.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
