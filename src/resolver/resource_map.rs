//! Identifier to file indexing.

use crate::resource_pack::geometry::declared_identifiers;
use crate::resource_pack::{AnimationFile, ResourcePack};
use crate::report::Reporter;
use serde_json::Value;
use std::collections::HashMap;

/// Reverse index from named resources to the pack files that define them.
///
/// When two files declare the same identifier the file visited last wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMap {
    /// geometry.creeper -> models/entity/creeper.geo.json
    pub geometries: HashMap<String, String>,
    /// animation.creeper.legs -> animations/creeper.animation.json
    pub animations: HashMap<String, String>,
    /// creeper -> materials/entity.material
    pub materials: HashMap<String, String>,
}

/// Which namespace an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Geometry,
    Animation,
    Material,
}

impl ResourceKind {
    fn label(&self) -> &'static str {
        match self {
            ResourceKind::Geometry => "Geometry",
            ResourceKind::Animation => "Animation",
            ResourceKind::Material => "Material",
        }
    }
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ResourceKind, identifier: &str) -> Option<&str> {
        self.table(kind).get(identifier).map(String::as_str)
    }

    fn table(&self, kind: ResourceKind) -> &HashMap<String, String> {
        match kind {
            ResourceKind::Geometry => &self.geometries,
            ResourceKind::Animation => &self.animations,
            ResourceKind::Material => &self.materials,
        }
    }

    fn table_mut(&mut self, kind: ResourceKind) -> &mut HashMap<String, String> {
        match kind {
            ResourceKind::Geometry => &mut self.geometries,
            ResourceKind::Animation => &mut self.animations,
            ResourceKind::Material => &mut self.materials,
        }
    }

    /// Record `identifier -> path`, replacing any earlier entry.
    ///
    /// Replacing an entry that pointed at a different file is reported.
    pub fn insert(
        &mut self,
        kind: ResourceKind,
        identifier: &str,
        path: &str,
        reporter: &dyn Reporter,
    ) {
        let previous = self
            .table_mut(kind)
            .insert(identifier.to_string(), path.to_string());

        if let Some(previous) = previous {
            if previous != path {
                reporter.warn(&format!(
                    "{} identifier {} is declared in both {} and {}; using {}",
                    kind.label(),
                    identifier,
                    previous,
                    path,
                    path
                ));
            }
        }
    }
}

/// Build the geometry, animation and material indexes for a pack.
///
/// Files that cannot be read or do not have the expected shape are skipped
/// with a warning.
pub fn build_resource_map(pack: &ResourcePack, reporter: &dyn Reporter) -> ResourceMap {
    let mut map = ResourceMap::new();

    for path in pack.files_under("models", &[".json"]) {
        let doc: Value = match pack.read_json(path) {
            Ok(doc) => doc,
            Err(e) => {
                reporter.warn(&format!("Could not parse model file {}: {}", path, e));
                continue;
            }
        };
        match declared_identifiers(&doc) {
            Ok(identifiers) => {
                for identifier in identifiers {
                    map.insert(ResourceKind::Geometry, &identifier, path, reporter);
                }
            }
            Err(e) => reporter.warn(&format!("Could not parse model file {}: {}", path, e)),
        }
    }

    for path in pack.files_under("animations", &[".json"]) {
        match pack.read_json::<AnimationFile>(path) {
            Ok(file) => {
                for identifier in file.animations.keys() {
                    map.insert(ResourceKind::Animation, identifier, path, reporter);
                }
            }
            Err(e) => reporter.warn(&format!("Could not parse animation file {}: {}", path, e)),
        }
    }

    // .material files first, then plain JSON
    for extension in [".material", ".json"] {
        for path in pack.files_under("materials", &[extension]) {
            match pack.read_json::<Value>(path) {
                Ok(Value::Object(object)) => {
                    for identifier in object.keys() {
                        map.insert(ResourceKind::Material, identifier, path, reporter);
                    }
                }
                Ok(_) => reporter.warn(&format!(
                    "Could not parse material file {}: document is not a JSON object",
                    path
                )),
                Err(e) => {
                    reporter.warn(&format!("Could not parse material file {}: {}", path, e))
                }
            }
        }
    }

    map
}
