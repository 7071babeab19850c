//! Publishing rendered images on a dedicated branch of the repository.
//!
//! Images are committed to an orphan branch and linked through
//! `raw.githubusercontent.com` at the exact commit, so links in older
//! comments keep working after the branch moves on.

use super::RepoSlug;
use crate::error::Result;
use crate::git::GitRepo;
use crate::report::Reporter;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Branch that stores preview images.
pub const IMAGE_BRANCH: &str = "mc-model-preview-images";

const REMOTE_NAME: &str = "origin-mc-model-preview-images";
const BOT_NAME: &str = "github-actions[bot]";
const BOT_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

/// Uploads images by pushing them to [`IMAGE_BRANCH`] from a scratch clone.
#[derive(Debug, Clone)]
pub struct GitBranchHost {
    repo: RepoSlug,
    remote_url: String,
    scratch_dir: PathBuf,
}

impl GitBranchHost {
    /// Host pushing to `github.com` with an installation or personal token.
    pub fn new(repo: RepoSlug, token: &str, scratch_dir: impl Into<PathBuf>) -> Self {
        let remote_url = format!("https://x-access-token:{}@github.com/{}.git", token, repo);
        Self::with_remote_url(repo, remote_url, scratch_dir)
    }

    /// Host pushing to an arbitrary remote; URLs still point at `repo`.
    pub fn with_remote_url(
        repo: RepoSlug,
        remote_url: impl Into<String>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repo,
            remote_url: remote_url.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Public URL of `file_name` at commit `sha`.
    pub fn raw_url(&self, sha: &str, file_name: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}",
            self.repo, sha, file_name
        )
    }

    /// Commit every PNG in `image_dir` and push it.
    ///
    /// Returns a map from image file name to its public URL. Nothing is
    /// pushed when the directory holds no PNGs.
    pub fn upload(
        &self,
        image_dir: &Path,
        pr_number: u64,
        reporter: &dyn Reporter,
    ) -> Result<BTreeMap<String, String>> {
        let images = png_files(image_dir)?;
        if images.is_empty() {
            return Ok(BTreeMap::new());
        }

        reporter.info(&format!(
            "Uploading {} images to {}...",
            images.len(),
            IMAGE_BRANCH
        ));

        if self.scratch_dir.exists() {
            fs::remove_dir_all(&self.scratch_dir)?;
        }
        fs::create_dir_all(&self.scratch_dir)?;
        let git = GitRepo::new(&self.scratch_dir);

        git.run(&["init", "-q"])?;
        git.run(&["config", "user.name", BOT_NAME])?;
        git.run(&["config", "user.email", BOT_EMAIL])?;
        git.run(&["config", "commit.gpgsign", "false"])?;
        git.run(&["remote", "add", REMOTE_NAME, &self.remote_url])?;

        let branch_ref = format!("refs/heads/{}", IMAGE_BRANCH);
        git.run(&["symbolic-ref", "HEAD", &branch_ref])?;
        if git.succeeds(&["ls-remote", "--exit-code", "--heads", REMOTE_NAME, IMAGE_BRANCH])? {
            git.run(&["fetch", "-q", "--depth", "1", REMOTE_NAME, IMAGE_BRANCH])?;
            git.run(&["reset", "-q", "--hard", "FETCH_HEAD"])?;
        } else {
            reporter.info(&format!(
                "{} does not exist yet, starting an orphan branch",
                IMAGE_BRANCH
            ));
        }

        let mut names = Vec::with_capacity(images.len());
        for image in &images {
            let Some(name) = image.file_name() else {
                continue;
            };
            fs::copy(image, self.scratch_dir.join(name))?;
            names.push(name.to_string_lossy().into_owned());
        }

        let mut add_args = vec!["add", "--"];
        add_args.extend(names.iter().map(String::as_str));
        git.run(&add_args)?;

        let message = format!("Add images for PR #{}", pr_number);
        git.run(&["commit", "-q", "--allow-empty", "-m", &message])?;
        let refspec = format!("HEAD:{}", branch_ref);
        git.run(&["push", "-q", REMOTE_NAME, &refspec])?;

        let sha = git.run(&["rev-parse", "HEAD"])?;
        reporter.info("Image upload complete.");

        Ok(names
            .into_iter()
            .map(|name| {
                let url = self.raw_url(&sha, &name);
                (name, url)
            })
            .collect())
    }
}

/// PNG files directly inside `dir`, sorted by name.
fn png_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if is_png && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
