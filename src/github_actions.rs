//! GitHub Actions run metadata.
//!
//! Every field is derived independently from an [`EnvSnapshot`], so the
//! result depends only on the snapshot passed in and never on the live
//! process environment.
use crate::env::EnvSnapshot;
use serde::{Deserialize, Serialize};

pub const ACTIVATION_VAR: &str = "GITHUB_ACTIONS";
pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";
pub const SERVER_URL_VAR: &str = "GITHUB_SERVER_URL";
pub const API_URL_VAR: &str = "GITHUB_API_URL";
pub const RUN_ID_VAR: &str = "GITHUB_RUN_ID";
pub const REF_VAR: &str = "GITHUB_REF";
pub const SHA_VAR: &str = "GITHUB_SHA";
pub const WORKFLOW_REF_VAR: &str = "GITHUB_WORKFLOW_REF";
pub const WORKFLOW_SHA_VAR: &str = "GITHUB_WORKFLOW_SHA";

/// Identifies the workflow run that produced a provenance record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubActionsMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_logs_url: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_sha: Option<String>,
}

impl GithubActionsMetadata {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Collect run metadata when running under GitHub Actions.
///
/// Returns `None` when `GITHUB_ACTIONS` is unset or empty, or when no field
/// could be derived.
pub fn collect_github_actions_metadata(env: &EnvSnapshot) -> Option<GithubActionsMetadata> {
    env.get(ACTIVATION_VAR)?;
    tracing::debug!("GitHub Actions environment detected");

    let metadata = GithubActionsMetadata {
        run_url: run_url(env),
        run_logs_url: run_logs_url(env),
        git_ref: copied(env, REF_VAR),
        sha: copied(env, SHA_VAR),
        repository_url: repository_url(env),
        workflow_ref: copied(env, WORKFLOW_REF_VAR),
        workflow_sha: copied(env, WORKFLOW_SHA_VAR),
    };
    (!metadata.is_empty()).then_some(metadata)
}

fn run_url(env: &EnvSnapshot) -> Option<String> {
    let repository = env.get(REPOSITORY_VAR)?;
    let server_url = env.get(SERVER_URL_VAR)?;
    let run_id = env.get(RUN_ID_VAR)?;
    Some(format!("{server_url}/{repository}/actions/runs/{run_id}"))
}

fn run_logs_url(env: &EnvSnapshot) -> Option<String> {
    let repository = env.get(REPOSITORY_VAR)?;
    let api_url = env.get(API_URL_VAR)?;
    let run_id = env.get(RUN_ID_VAR)?;
    Some(format!("{api_url}/repos/{repository}/actions/runs/{run_id}/logs"))
}

fn repository_url(env: &EnvSnapshot) -> Option<String> {
    let repository = env.get(REPOSITORY_VAR)?;
    let server_url = env.get(SERVER_URL_VAR)?;
    Some(format!("{server_url}/{repository}"))
}

fn copied(env: &EnvSnapshot, key: &str) -> Option<String> {
    env.get(key).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
        pairs.iter().copied().collect()
    }

    const FULL: &[(&str, &str)] = &[
        (ACTIVATION_VAR, "true"),
        (REPOSITORY_VAR, "octo/assess"),
        (SERVER_URL_VAR, "https://github.com"),
        (API_URL_VAR, "https://api.github.com"),
        (RUN_ID_VAR, "4242"),
        (REF_VAR, "refs/heads/main"),
        (SHA_VAR, "0123abcd"),
        (WORKFLOW_REF_VAR, "octo/assess/.github/workflows/run.yml@refs/heads/main"),
        (WORKFLOW_SHA_VAR, "4567ef01"),
    ];

    fn full_env() -> EnvSnapshot {
        env(FULL)
    }

    fn full_env_without(key: &str) -> EnvSnapshot {
        FULL.iter().copied().filter(|(name, _)| *name != key).collect()
    }

    #[test]
    fn inactive_without_activation_flag() {
        let vars = full_env_without(ACTIVATION_VAR);
        assert_eq!(collect_github_actions_metadata(&vars), None);
    }

    #[test]
    fn empty_activation_flag_is_inactive() {
        let vars = env(&[(ACTIVATION_VAR, ""), (SHA_VAR, "0123abcd")]);
        assert_eq!(collect_github_actions_metadata(&vars), None);
    }

    #[test]
    fn activation_alone_yields_nothing() {
        assert_eq!(
            collect_github_actions_metadata(&env(&[(ACTIVATION_VAR, "true")])),
            None
        );
    }

    #[test]
    fn derives_all_fields_in_output_order() {
        let metadata = collect_github_actions_metadata(&full_env()).expect("metadata");
        let value = serde_json::to_value(&metadata).expect("serialize");
        assert_eq!(
            value,
            json!({
                "run_url": "https://github.com/octo/assess/actions/runs/4242",
                "run_logs_url": "https://api.github.com/repos/octo/assess/actions/runs/4242/logs",
                "ref": "refs/heads/main",
                "sha": "0123abcd",
                "repository_url": "https://github.com/octo/assess",
                "workflow_ref": "octo/assess/.github/workflows/run.yml@refs/heads/main",
                "workflow_sha": "4567ef01",
            })
        );
        let text = serde_json::to_string(&metadata).expect("serialize");
        let keys = [
            "\"run_url\"",
            "\"run_logs_url\"",
            "\"ref\"",
            "\"sha\"",
            "\"repository_url\"",
            "\"workflow_ref\"",
            "\"workflow_sha\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| text.find(key).expect("key present"))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{text}");
    }

    #[test]
    fn sha_only_serializes_just_sha() {
        let metadata = collect_github_actions_metadata(&env(&[
            (ACTIVATION_VAR, "true"),
            (SHA_VAR, "deadbeef"),
        ]))
        .expect("metadata");
        assert_eq!(
            serde_json::to_value(&metadata).expect("serialize"),
            json!({ "sha": "deadbeef" })
        );
    }

    #[test]
    fn run_url_needs_run_id() {
        let metadata = collect_github_actions_metadata(&env(&[
            (ACTIVATION_VAR, "true"),
            (REPOSITORY_VAR, "octo/assess"),
            (SERVER_URL_VAR, "https://github.com"),
            (API_URL_VAR, "https://api.github.com"),
        ]))
        .expect("metadata");
        assert_eq!(metadata.run_url, None);
        assert_eq!(metadata.run_logs_url, None);
        assert_eq!(
            metadata.repository_url.as_deref(),
            Some("https://github.com/octo/assess")
        );
    }

    #[test]
    fn run_logs_url_needs_api_url() {
        let vars = full_env_without(API_URL_VAR);
        let metadata = collect_github_actions_metadata(&vars).expect("metadata");
        assert_eq!(metadata.run_logs_url, None);
        assert!(metadata.run_url.is_some());
    }

    #[test]
    fn empty_inputs_count_as_missing() {
        let metadata = collect_github_actions_metadata(&env(&[
            (ACTIVATION_VAR, "true"),
            (REPOSITORY_VAR, ""),
            (SERVER_URL_VAR, "https://github.com"),
            (RUN_ID_VAR, "1"),
            (REF_VAR, ""),
            (WORKFLOW_SHA_VAR, "feed"),
        ]))
        .expect("metadata");
        assert_eq!(
            metadata,
            GithubActionsMetadata {
                workflow_sha: Some("feed".to_string()),
                ..GithubActionsMetadata::default()
            }
        );
    }

    #[test]
    fn any_non_empty_flag_activates() {
        let metadata = collect_github_actions_metadata(&env(&[
            (ACTIVATION_VAR, "1"),
            (REF_VAR, "refs/tags/v1"),
        ]))
        .expect("metadata");
        assert_eq!(metadata.git_ref.as_deref(), Some("refs/tags/v1"));
    }
}
