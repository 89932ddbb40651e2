//! Shared test infrastructure for integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Digest table served by the stub inspection tool: `(reference, stdout)`.
/// References not listed fail the way `docker image inspect` does.
pub type StubDigests<'a> = &'a [(&'a str, &'a str)];

/// Scratch directory holding a descriptor, a stub inspection tool and a call log.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn create() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_compose(&self, yaml: &str) -> PathBuf {
        let path = self.path("docker-compose.yml");
        std::fs::write(&path, yaml).expect("write compose file");
        path
    }

    /// Install a shell script that mimics `docker image inspect --format`.
    pub fn install_stub_tool(&self, digests: StubDigests<'_>) -> PathBuf {
        let mut cases = String::new();
        for (reference, stdout) in digests {
            cases.push_str(&format!("  '{reference}') echo '{stdout}' ;;\n"));
        }
        let script = format!(
            "#!/bin/sh\n\
             echo \"$3\" >> '{log}'\n\
             [ \"$1\" = image ] && [ \"$2\" = inspect ] && [ \"$4\" = --format ] || exit 64\n\
             case \"$3\" in\n\
             {cases}  *) echo \"Error: No such image: $3\" >&2; exit 1 ;;\n\
             esac\n",
            log = self.calls_log().display(),
        );
        let path = self.path("stub-docker");
        std::fs::write(&path, script).expect("write stub tool");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod stub tool");
        path
    }

    pub fn calls_log(&self) -> PathBuf {
        self.path("inspect-calls.log")
    }

    /// Image references the stub tool was asked about, in call order.
    pub fn inspected(&self) -> Vec<String> {
        match std::fs::read_to_string(self.calls_log()) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Base command for the built binary with a scrubbed environment.
///
/// CI variables from the machine running the tests never leak in; callers add
/// the ones they need with `.env(...)`.
pub fn recorder(compose: &Path, output: &Path, tool: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_record-provenance"));
    command
        .env_clear()
        .env("PATH", std::env::var_os("PATH").unwrap_or_default())
        .arg("--compose")
        .arg(compose)
        .arg("--output")
        .arg(output)
        .arg("--tool")
        .arg(tool);
    command
}

pub fn run(mut command: Command) -> Output {
    command.output().expect("run record-provenance")
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("read provenance");
    serde_json::from_str(&text).expect("parse provenance JSON")
}
