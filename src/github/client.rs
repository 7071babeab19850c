//! Minimal GitHub REST v3 client.

use super::RepoSlug;
use crate::error::{PreviewError, Result};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Files per page when listing pull request files (the API maximum).
const PER_PAGE: usize = 100;

/// The API stops listing pull request files after 3000 entries.
const MAX_PAGES: usize = 30;

#[derive(Debug, Deserialize)]
struct PullRequestFile {
    filename: String,
}

/// Authenticated GitHub API client.
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Client for a GitHub Enterprise (or mock) API root.
    pub fn with_api_url(token: impl Into<String>, api_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            agent,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{}{}", self.api_url, path))
            .set("Accept", "application/vnd.github+json")
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("User-Agent", "mc-model-preview")
            .set("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Paths of every file changed by a pull request.
    pub fn list_pull_request_files(&self, repo: &RepoSlug, number: u64) -> Result<Vec<String>> {
        let mut files = Vec::new();

        for page in 1..=MAX_PAGES {
            let path = format!(
                "/repos/{}/{}/pulls/{}/files?per_page={}&page={}",
                repo.owner, repo.name, number, PER_PAGE, page
            );
            let response = self.request("GET", &path).call().map_err(api_error)?;
            let batch: Vec<PullRequestFile> = response.into_json()?;
            let done = batch.len() < PER_PAGE;
            files.extend(batch.into_iter().map(|file| file.filename));
            if done {
                break;
            }
        }

        Ok(files)
    }

    /// Post a comment on an issue or pull request.
    pub fn create_issue_comment(&self, repo: &RepoSlug, number: u64, body: &str) -> Result<()> {
        let path = format!("/repos/{}/{}/issues/{}/comments", repo.owner, repo.name, number);
        self.request("POST", &path)
            .send_json(serde_json::json!({ "body": body }))
            .map_err(api_error)?;
        Ok(())
    }
}

/// Turn HTTP status errors into readable API errors.
fn api_error(err: ureq::Error) -> PreviewError {
    match err {
        ureq::Error::Status(code, response) => {
            let url = response.get_url().to_string();
            let body = response.into_string().unwrap_or_default();
            PreviewError::GitHub(format!("{} returned {}: {}", url, code, body.trim()))
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let client = GitHubClient::with_api_url("t", "https://ghe.example.com/api/v3/");
        assert_eq!(client.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_pull_request_file_deserializes() {
        let files: Vec<PullRequestFile> = serde_json::from_str(
            r#"[{"sha": "abc", "filename": "models/entity/creeper.geo.json", "status": "modified"}]"#,
        )
        .unwrap();
        assert_eq!(files[0].filename, "models/entity/creeper.geo.json");
    }
}
