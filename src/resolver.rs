//! Image digest resolution through an external inspection tool.
use crate::error::ResolveError;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// Go template asking the tool for the first registry digest.
pub const REPO_DIGEST_FORMAT: &str = "{{index .RepoDigests 0}}";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Resolves an image reference to a registry-qualified digest.
///
/// Implementations are called once per image, in descriptor order, and must
/// not cache.
pub trait DigestResolver {
    fn resolve(&self, image: &str) -> Result<String, ResolveError>;
}

impl<F> DigestResolver for F
where
    F: Fn(&str) -> Result<String, ResolveError>,
{
    fn resolve(&self, image: &str) -> Result<String, ResolveError> {
        self(image)
    }
}

/// Runs `<tool> image inspect <ref> --format {{index .RepoDigests 0}}`.
#[derive(Debug, Clone)]
pub struct DockerInspector {
    program: String,
    timeout: Duration,
}

impl DockerInspector {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn locate_program(&self) -> Result<PathBuf, String> {
        which::which(&self.program)
            .map_err(|err| format!("inspection tool '{}' not found: {err}", self.program))
    }
}

impl DigestResolver for DockerInspector {
    fn resolve(&self, image: &str) -> Result<String, ResolveError> {
        let program = self
            .locate_program()
            .map_err(|detail| ResolveError::inspection_failed(image, detail))?;
        let inspection = run_inspection(&program, image, self.timeout)
            .map_err(|detail| ResolveError::inspection_failed(image, detail))?;

        if inspection.timed_out {
            return Err(ResolveError::inspection_failed(
                image,
                format!("timed out after {}s", self.timeout.as_secs()),
            ));
        }
        if !inspection.status.success() {
            let stderr = inspection.stderr.trim();
            let detail = if stderr.is_empty() {
                format!("exited with {}", inspection.status)
            } else {
                stderr.to_string()
            };
            return Err(ResolveError::inspection_failed(image, detail));
        }

        let digest = inspection.stdout.trim();
        if digest.is_empty() {
            return Err(ResolveError::digest_missing(image));
        }
        tracing::debug!(image, digest, "inspection complete");
        Ok(digest.to_string())
    }
}

struct Inspection {
    stdout: String,
    stderr: String,
    status: ExitStatus,
    timed_out: bool,
}

fn run_inspection(program: &Path, image: &str, timeout: Duration) -> Result<Inspection, String> {
    let mut cmd = Command::new(program);
    cmd.args(["image", "inspect", image, "--format", REPO_DIGEST_FORMAT])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let start = Instant::now();
    let mut child = cmd
        .spawn()
        .map_err(|err| format!("spawn {}: {err}", program.display()))?;
    let mut timed_out = false;

    loop {
        match child.try_wait() {
            Ok(Some(_status)) => break,
            Ok(None) => {}
            Err(err) => return Err(format!("wait for {}: {err}", program.display())),
        }
        if start.elapsed() > timeout {
            timed_out = true;
            let _ = child.kill();
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let output = child
        .wait_with_output()
        .map_err(|err| format!("collect output of {}: {err}", program.display()))?;
    tracing::debug!(
        image,
        elapsed_ms = start.elapsed().as_millis() as u64,
        timed_out,
        "image inspect finished"
    );

    Ok(Inspection {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
        timed_out,
    })
}
