//! Resource pack loading and parsing.
//!
//! This module handles discovering the files of a Bedrock resource pack
//! directory and parsing the JSON documents the resolver consumes: geometry
//! files, animation files and client entity definitions.

pub mod loader;
pub mod geometry;
pub mod animation;
pub mod client_entity;
pub mod texture;

pub use animation::{AnimationDefinition, AnimationFile, LoopMode};
pub use client_entity::{ClientEntityFile, EntityDescription};
pub use geometry::{Bone, Cube, GeometryDefinition};

use crate::error::Result;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// A resource pack directory and the files found beneath it.
///
/// File paths are relative to the pack root, `/`-separated and sorted.
#[derive(Debug, Clone)]
pub struct ResourcePack {
    root: PathBuf,
    files: Vec<String>,
}

impl ResourcePack {
    /// Create a pack from a root and a list of relative file paths.
    pub fn new(root: impl Into<PathBuf>, mut files: Vec<String>) -> Self {
        files.sort();
        files.dedup();
        Self {
            root: root.into(),
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Check if the pack contains a file at the relative path.
    pub fn contains(&self, relative: &str) -> bool {
        self.files.binary_search_by(|f| f.as_str().cmp(relative)).is_ok()
    }

    /// Absolute location of a pack file on disk.
    pub fn absolute_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Files that sit below a directory named `segment` (at any depth) and
    /// whose name ends with one of `extensions`.
    ///
    /// `files_under("models", &[".json"])` matches `models/a.json` and
    /// `sub/models/entity/b.geo.json`, but not `models.json`.
    pub fn files_under<'a>(
        &'a self,
        segment: &'a str,
        extensions: &'a [&'a str],
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.files
            .iter()
            .map(String::as_str)
            .filter(move |path| has_directory_segment(path, segment))
            .filter(move |path| extensions.iter().any(|ext| path.ends_with(ext)))
    }

    /// Read a pack file as UTF-8 text, dropping a leading byte order mark.
    pub fn read_to_string(&self, relative: &str) -> Result<String> {
        let contents = std::fs::read_to_string(self.absolute_path(relative))?;
        Ok(match contents.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => contents,
        })
    }

    /// Read and deserialize a JSON pack file.
    pub fn read_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T> {
        let contents = self.read_to_string(relative)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Check whether any directory component of `path` equals `segment`.
fn has_directory_segment(path: &str, segment: &str) -> bool {
    match path.rsplit_once('/') {
        Some((dirs, _file)) => dirs.split('/').any(|dir| dir == segment),
        None => false,
    }
}
