//! # Minecraft Model Preview
//!
//! Renders before/after previews of the Bedrock entity models touched by a
//! pull request and posts them as a comment.
//!
//! ## Overview
//!
//! A resource pack is scanned into [`Entity`] records that list every file
//! an entity depends on (definition, geometry, textures, animations and
//! materials). The changed files of a pull request select the affected
//! entities, each of which is turned into a Blockbench project and rendered
//! on both the base and head commit.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mc_model_preview::{find_affected_entities, load_resource_pack, parse_resource_pack};
//! use mc_model_preview::report::TracingReporter;
//!
//! let reporter = TracingReporter::new();
//! let pack = load_resource_pack("path/to/RP", &reporter)?;
//! let entities = parse_resource_pack(&pack, &reporter);
//!
//! let changed = ["models/entity/creeper.geo.json"];
//! for entity in find_affected_entities(&entities, &changed) {
//!     println!("{}", entity.identifier);
//! }
//! ```
//!
//! ## Pull request runs
//!
//! [`Pipeline`] drives a full run. Git, the renderer, image hosting and the
//! comment target are passed in as trait objects, so a run can be pointed at
//! GitHub ([`GitHubClient`], [`GitBranchHost`], [`BlockbenchRenderer`]) or at
//! local stand-ins.

pub mod error;
pub mod report;
pub mod types;
pub mod resource_pack;
pub mod resolver;
pub mod export;
pub mod render;
pub mod git;
pub mod github;
pub mod config;
pub mod pipeline;

// Re-export main types for convenience
pub use error::{PreviewError, Result};
pub use types::{Entity, PreviewRow, Side};
pub use resource_pack::ResourcePack;
pub use resolver::{
    build_resource_map, find_affected_entities, parse_entities, parse_resource_pack,
    to_pack_relative, ResourceMap,
};
pub use export::{create_project, Project};
pub use render::{BlockbenchConfig, BlockbenchRenderer, Renderer};
pub use git::{Checkout, GitRepo};
pub use github::{build_comment_body, GitBranchHost, GitHubClient, RepoSlug};
pub use config::ActionConfig;
pub use pipeline::{Collaborators, Pipeline, PipelineSettings, RunSummary};

/// Load a resource pack directory.
pub fn load_resource_pack<P: AsRef<std::path::Path>>(
    path: P,
    reporter: &dyn report::Reporter,
) -> Result<ResourcePack> {
    resource_pack::loader::load_from_path(path, reporter)
}
