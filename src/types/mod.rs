//! Shared types used throughout the library.

use serde::Serialize;
use std::fmt;

/// A client entity definition with its dependencies resolved to pack files.
///
/// All paths are relative to the resource pack root and use `/` separators.
/// The dependency lists keep the declaration order of the definition file and
/// may contain duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// Logical name, e.g. "minecraft:creeper". Not guaranteed unique.
    pub identifier: String,
    /// Path of the definition file.
    pub definition_path: String,
    pub geometry_files: Vec<String>,
    /// Literal texture paths as declared (usually without extension).
    pub texture_files: Vec<String>,
    pub animation_files: Vec<String>,
    pub material_files: Vec<String>,
}

impl Entity {
    pub fn new(identifier: impl Into<String>, definition_path: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            definition_path: definition_path.into(),
            geometry_files: Vec::new(),
            texture_files: Vec::new(),
            animation_files: Vec::new(),
            material_files: Vec::new(),
        }
    }

    /// The definition file followed by every dependency path.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.definition_path.as_str())
            .chain(self.geometry_files.iter().map(String::as_str))
            .chain(self.texture_files.iter().map(String::as_str))
            .chain(self.animation_files.iter().map(String::as_str))
            .chain(self.material_files.iter().map(String::as_str))
    }

    /// Check if the entity's definition or any dependency is `path`.
    pub fn depends_on(&self, path: &str) -> bool {
        self.files().any(|file| file == path)
    }
}

/// Which commit of the pull request a render belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The target branch ("before").
    Base,
    /// The pull request branch ("after").
    Head,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Base => "base",
            Side::Head => "head",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the before/after comment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub identifier: String,
    pub base_url: Option<String>,
    pub head_url: Option<String>,
}

impl PreviewRow {
    /// True when at least one side has an image.
    pub fn has_image(&self) -> bool {
        self.base_url.is_some() || self.head_url.is_some()
    }
}
