//! One pull request run: find affected entities, render both sides, upload
//! and comment.
//!
//! Every side effect goes through a trait object so the whole run can be
//! exercised with in-memory fakes.

use crate::error::Result;
use crate::export::create_project;
use crate::git::Checkout;
use crate::github::{build_comment_body, GitBranchHost, GitHubClient, RepoSlug};
use crate::render::{image_file_name, render_stem, Renderer};
use crate::report::Reporter;
use crate::resolver::{find_affected_entities, parse_resource_pack, to_pack_relative};
use crate::resource_pack::{loader, ResourcePack};
use crate::types::{Entity, PreviewRow, Side};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies the repository-relative paths changed by the pull request.
pub trait ChangeSource {
    fn changed_files(&self) -> Result<Vec<String>>;
}

/// Publishes rendered images and returns file name to public URL.
pub trait ImageHost {
    fn upload(
        &self,
        image_dir: &Path,
        pr_number: u64,
        reporter: &dyn Reporter,
    ) -> Result<BTreeMap<String, String>>;
}

/// Posts the finished comment somewhere.
pub trait Commenter {
    fn comment(&self, body: &str) -> Result<()>;
}

/// Changed files listed by the GitHub API.
pub struct PullRequestChanges<'a> {
    pub client: &'a GitHubClient,
    pub repo: &'a RepoSlug,
    pub number: u64,
}

impl ChangeSource for PullRequestChanges<'_> {
    fn changed_files(&self) -> Result<Vec<String>> {
        self.client.list_pull_request_files(self.repo, self.number)
    }
}

/// A fixed list of changed files, e.g. from the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticChanges(pub Vec<String>);

impl ChangeSource for StaticChanges {
    fn changed_files(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

impl ImageHost for GitBranchHost {
    fn upload(
        &self,
        image_dir: &Path,
        pr_number: u64,
        reporter: &dyn Reporter,
    ) -> Result<BTreeMap<String, String>> {
        GitBranchHost::upload(self, image_dir, pr_number, reporter)
    }
}

/// Leaves images where they were rendered and links them by absolute path.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalImages;

impl ImageHost for LocalImages {
    fn upload(
        &self,
        image_dir: &Path,
        _pr_number: u64,
        _reporter: &dyn Reporter,
    ) -> Result<BTreeMap<String, String>> {
        let mut urls = BTreeMap::new();
        if !image_dir.is_dir() {
            return Ok(urls);
        }
        for entry in fs::read_dir(image_dir)? {
            let path = entry?.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                urls.insert(name.to_string(), path.display().to_string());
            }
        }
        Ok(urls)
    }
}

/// Comments on the pull request through the GitHub API.
pub struct PullRequestCommenter<'a> {
    pub client: &'a GitHubClient,
    pub repo: &'a RepoSlug,
    pub number: u64,
}

impl Commenter for PullRequestCommenter<'_> {
    fn comment(&self, body: &str) -> Result<()> {
        self.client.create_issue_comment(self.repo, self.number, body)
    }
}

/// Prints the comment instead of posting it.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutCommenter;

impl Commenter for StdoutCommenter {
    fn comment(&self, body: &str) -> Result<()> {
        println!("{}", body);
        Ok(())
    }
}

/// What to run against.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Absolute resource pack directory inside the checkout.
    pub pack_dir: PathBuf,
    /// Pack location relative to the repository root ("" when at the root).
    pub pack_prefix: String,
    pub base_ref: String,
    pub head_ref: String,
    pub pr_number: u64,
    /// Rendered images are written to `<work_dir>/images`.
    pub work_dir: PathBuf,
}

/// The side-effecting services a run needs.
pub struct Collaborators<'a> {
    pub changes: &'a dyn ChangeSource,
    pub checkout: &'a dyn Checkout,
    pub renderer: &'a dyn Renderer,
    pub host: &'a dyn ImageHost,
    pub commenter: &'a dyn Commenter,
    pub reporter: &'a dyn Reporter,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Identifiers of affected head entities, in pack order.
    pub affected: Vec<String>,
    pub rows: Vec<PreviewRow>,
    pub commented: bool,
}

pub struct Pipeline<'a> {
    settings: PipelineSettings,
    services: Collaborators<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: PipelineSettings, services: Collaborators<'a>) -> Self {
        Self { settings, services }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn run(&self) -> Result<RunSummary> {
        let reporter = self.services.reporter;
        let settings = &self.settings;

        let changed = self.services.changes.changed_files()?;
        let changed = to_pack_relative(&settings.pack_prefix, &changed);
        reporter.info(&format!("Found {} changed files in the resource pack.", changed.len()));

        let head_pack = loader::load_from_path(&settings.pack_dir, reporter)?;
        let head_entities = parse_resource_pack(&head_pack, reporter);
        let affected = find_affected_entities(&head_entities, &changed);

        let mut summary = RunSummary {
            affected: affected.iter().map(|e| e.identifier.clone()).collect(),
            ..Default::default()
        };
        if affected.is_empty() {
            reporter.info("No model changes detected in this pull request.");
            return Ok(summary);
        }
        reporter.info(&format!(
            "Found {} affected entities on HEAD ({}): {}",
            affected.len(),
            settings.head_ref,
            summary.affected.join(", ")
        ));

        self.services.renderer.prepare(reporter)?;

        // images left over from an earlier run would be uploaded again
        let image_dir = settings.work_dir.join("images");
        if image_dir.exists() {
            fs::remove_dir_all(&image_dir)?;
        }
        fs::create_dir_all(&image_dir)?;

        self.render_all(affected.into_iter(), &head_pack, Side::Head, &image_dir)?;

        reporter.info(&format!("Checking out base branch: {}", settings.base_ref));
        let base_result = self.render_base(&summary.affected, &image_dir);

        reporter.info(&format!("Checking out head branch: {}", settings.head_ref));
        self.services.checkout.checkout(&settings.head_ref, reporter)?;
        base_result?;

        let urls = self
            .services
            .host
            .upload(&image_dir, settings.pr_number, reporter)?;
        summary.rows = build_rows(&summary.affected, &urls);

        let body = build_comment_body(&summary.rows);
        self.services.commenter.comment(&body)?;
        summary.commented = true;

        reporter.info("Action completed successfully.");
        Ok(summary)
    }

    /// Check out the base ref and render the base version of every affected
    /// identifier found there.
    fn render_base(&self, affected: &[String], image_dir: &Path) -> Result<()> {
        let reporter = self.services.reporter;
        self.services.checkout.checkout(&self.settings.base_ref, reporter)?;

        let base_pack = match loader::load_from_path(&self.settings.pack_dir, reporter) {
            Ok(pack) => pack,
            Err(err) => {
                reporter.warn(&format!(
                    "Could not load the resource pack on base ({}): {}",
                    self.settings.base_ref, err
                ));
                return Ok(());
            }
        };

        let wanted: HashSet<&str> = affected.iter().map(String::as_str).collect();
        let base_entities = parse_resource_pack(&base_pack, reporter);
        let matching = base_entities
            .iter()
            .filter(|e| wanted.contains(e.identifier.as_str()));
        self.render_all(matching, &base_pack, Side::Base, image_dir)
    }

    /// Render `entities` on one side. Images are named by identifier, so
    /// only the first record of each identifier is rendered.
    fn render_all<'e>(
        &self,
        entities: impl Iterator<Item = &'e Entity>,
        pack: &ResourcePack,
        side: Side,
        image_dir: &Path,
    ) -> Result<()> {
        let mut rendered = HashSet::new();
        for entity in entities {
            if !rendered.insert(entity.identifier.as_str()) {
                self.services.reporter.debug(&format!(
                    "Skipping {} ({}) from {}: already rendered",
                    entity.identifier, side, entity.definition_path
                ));
                continue;
            }
            self.render_side(entity, pack, side, image_dir)?;
        }
        Ok(())
    }

    /// Render one entity into `image_dir`. Generation and render failures
    /// are warnings; only writing the image can fail the run.
    fn render_side(
        &self,
        entity: &Entity,
        pack: &ResourcePack,
        side: Side,
        image_dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let reporter = self.services.reporter;
        reporter.info(&format!("Rendering {} ({})...", entity.identifier, side));

        let project = match create_project(entity, pack, reporter) {
            Ok(project) => project,
            Err(err) => {
                reporter.warn(&format!(
                    "Failed to create project for {} ({}): {}",
                    entity.identifier, side, err
                ));
                return Ok(None);
            }
        };

        let bytes = match self
            .services
            .renderer
            .render(&project, &render_stem(&entity.identifier, side), reporter)
        {
            Ok(bytes) => bytes,
            Err(err) => {
                reporter.warn(&format!(
                    "Failed to render {} ({}): {}",
                    entity.identifier, side, err
                ));
                return Ok(None);
            }
        };

        let path = image_dir.join(image_file_name(&entity.identifier, side));
        fs::write(&path, bytes)?;
        Ok(Some(path))
    }
}

/// One row per affected identifier (first occurrence wins), dropping rows
/// with no image on either side.
pub fn build_rows(affected: &[String], urls: &BTreeMap<String, String>) -> Vec<PreviewRow> {
    let mut seen = HashSet::new();
    affected
        .iter()
        .filter(|identifier| seen.insert(identifier.as_str()))
        .map(|identifier| PreviewRow {
            identifier: identifier.clone(),
            base_url: urls.get(&image_file_name(identifier, Side::Base)).cloned(),
            head_url: urls.get(&image_file_name(identifier, Side::Head)).cloned(),
        })
        .filter(PreviewRow::has_image)
        .collect()
}
