//! GitHub integration: REST client, comment formatting and image hosting.

pub mod client;
pub mod comment;
pub mod hosting;

pub use client::GitHubClient;
pub use comment::build_comment_body;
pub use hosting::GitBranchHost;

use crate::error::{PreviewError, Result};
use std::fmt;
use std::str::FromStr;

/// An `owner/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoSlug {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(PreviewError::Config(format!(
                "repository must look like owner/name, got {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
