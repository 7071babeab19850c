//! Run configuration gathered from the GitHub Actions environment.

use crate::error::{PreviewError, Result};
use crate::github::RepoSlug;
use crate::report::Reporter;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// Settings for one pull request run. Every field may be overridden from the
/// command line before the run starts.
#[derive(Debug, Clone, Default)]
pub struct ActionConfig {
    pub token: Option<String>,
    pub repo: Option<RepoSlug>,
    pub pr_number: Option<u64>,
    pub base_ref: Option<String>,
    pub head_ref: Option<String>,
    /// Repository checkout; defaults to the current directory.
    pub workspace: Option<PathBuf>,
    /// Resource pack location, absolute or relative to the workspace.
    pub resource_pack: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    number: Option<u64>,
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: Option<u64>,
    base: BranchPayload,
    head: BranchPayload,
}

#[derive(Debug, Deserialize)]
struct BranchPayload {
    #[serde(rename = "ref")]
    name: String,
}

impl ActionConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `var`, which looks up one variable.
    ///
    /// Empty values count as unset. A missing event file is not an error
    /// (the refs can come from the command line) but an unreadable one is.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        let mut config = ActionConfig {
            token: var("INPUT_GITHUB-TOKEN").or_else(|| var("GITHUB_TOKEN")),
            repo: var("GITHUB_REPOSITORY").map(|s| s.parse::<RepoSlug>()).transpose()?,
            workspace: var("GITHUB_WORKSPACE").map(PathBuf::from),
            resource_pack: var("INPUT_RESOURCE-PACK-PATH").map(PathBuf::from),
            ..Default::default()
        };

        if let Some(event_path) = var("GITHUB_EVENT_PATH") {
            let event_path = PathBuf::from(event_path);
            if event_path.is_file() {
                let event: PullRequestEvent =
                    serde_json::from_str(&std::fs::read_to_string(&event_path)?)?;
                config.pr_number = event
                    .number
                    .or_else(|| event.pull_request.as_ref().and_then(|pr| pr.number));
                if let Some(pr) = event.pull_request {
                    config.base_ref = Some(pr.base.name);
                    config.head_ref = Some(pr.head.name);
                }
            }
        }

        Ok(config)
    }

    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| missing("a GitHub token (GITHUB_TOKEN or --token)"))
    }

    pub fn require_repo(&self) -> Result<&RepoSlug> {
        self.repo
            .as_ref()
            .ok_or_else(|| missing("the repository (GITHUB_REPOSITORY or --repo)"))
    }

    pub fn require_pr_number(&self) -> Result<u64> {
        self.pr_number
            .ok_or_else(|| missing("the pull request number (event payload or --pr)"))
    }

    /// Base and head refs of the pull request.
    pub fn require_refs(&self) -> Result<(&str, &str)> {
        match (self.base_ref.as_deref(), self.head_ref.as_deref()) {
            (Some(base), Some(head)) => Ok((base, head)),
            _ => Err(PreviewError::Config(
                "Could not get base and head refs from pull request context.".to_string(),
            )),
        }
    }

    /// Absolute workspace path.
    pub fn workspace_dir(&self) -> Result<PathBuf> {
        let workspace = match &self.workspace {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        absolute(&workspace)
    }

    /// Absolute resource pack path, confined to the workspace.
    pub fn resource_pack_dir(&self, reporter: &dyn Reporter) -> Result<PathBuf> {
        let workspace = self.workspace_dir()?;
        let input = self
            .resource_pack
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(resolve_pack_path(&workspace, &input, reporter))
    }
}

fn missing(what: &str) -> PreviewError {
    PreviewError::Config(format!("missing {}", what))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Resolve `input` against `workspace`.
///
/// A path that ends up outside the workspace falls back to the workspace
/// root with a warning.
pub fn resolve_pack_path(workspace: &Path, input: &Path, reporter: &dyn Reporter) -> PathBuf {
    let workspace = normalize(workspace);
    let resolved = normalize(&workspace.join(input));

    if !resolved.starts_with(&workspace) {
        reporter.warn(&format!(
            "Input resource-pack-path resolved outside workspace (\"{}\"). Falling back to workspace root (\"{}\").",
            resolved.display(),
            workspace.display()
        ));
        return workspace;
    }
    resolved
}

/// Forward-slash path of `pack` relative to `workspace`, empty when they are
/// the same directory.
pub fn pack_prefix(workspace: &Path, pack: &Path) -> String {
    let workspace = normalize(workspace);
    let pack = normalize(pack);
    match pack.strip_prefix(&workspace) {
        Ok(rel) => rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => String::new(),
    }
}

/// Lexically remove `.` and `..` components without touching the disk.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
