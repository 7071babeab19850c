//! Bedrock geometry file parsing.
//!
//! Two layouts exist in the wild:
//! - 1.12+: `{"minecraft:geometry": [{"description": {"identifier": ...}, "bones": [...]}]}`
//! - 1.8 (legacy): `{"geometry.name": {"bones": [...]}}`, optionally keyed as
//!   `"geometry.child:geometry.parent"` to inherit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key of the geometry list in 1.12+ files.
pub const GEOMETRY_KEY: &str = "minecraft:geometry";

/// Prefix of legacy top-level geometry keys.
pub const LEGACY_PREFIX: &str = "geometry.";

/// One geometry definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometryDefinition {
    #[serde(default)]
    pub description: GeometryDescription,

    #[serde(default)]
    pub bones: Vec<Bone>,

    /// Texture size in legacy files (lives on the definition itself).
    #[serde(default, rename = "texturewidth", skip_serializing_if = "Option::is_none")]
    pub legacy_texture_width: Option<f32>,
    #[serde(default, rename = "textureheight", skip_serializing_if = "Option::is_none")]
    pub legacy_texture_height: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometryDescription {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub texture_width: Option<f32>,
    #[serde(default)]
    pub texture_height: Option<f32>,
}

impl GeometryDefinition {
    /// Declared texture size, if the definition carries one.
    pub fn texture_size(&self) -> Option<(u32, u32)> {
        let width = self.description.texture_width.or(self.legacy_texture_width)?;
        let height = self.description.texture_height.or(self.legacy_texture_height)?;
        if width > 0.0 && height > 0.0 {
            Some((width.round() as u32, height.round() as u32))
        } else {
            None
        }
    }

    /// True when every cube uses box UV (or there are no cubes).
    pub fn uses_box_uv(&self) -> bool {
        self.bones
            .iter()
            .flat_map(|bone| bone.cubes.iter())
            .all(|cube| !matches!(cube.uv, Some(Value::Object(_))))
    }
}

/// A bone: a named pivot with child cubes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bone {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub pivot: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default)]
    pub mirror: bool,
    #[serde(default)]
    pub inflate: f32,
    #[serde(default)]
    pub cubes: Vec<Cube>,
}

/// A cuboid in model space (1 unit = 1/16 block).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cube {
    #[serde(default)]
    pub origin: [f32; 3],
    #[serde(default)]
    pub size: [f32; 3],
    #[serde(default)]
    pub pivot: Option<[f32; 3]>,
    #[serde(default)]
    pub rotation: Option<[f32; 3]>,
    #[serde(default)]
    pub inflate: Option<f32>,
    #[serde(default)]
    pub mirror: Option<bool>,
    /// `[u, v]` for box UV, or a per-face object.
    #[serde(default)]
    pub uv: Option<Value>,
}

/// Errors in the overall shape of a geometry document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryShapeError {
    NotAnObject,
    GeometryNotAnArray,
}

impl std::fmt::Display for GeometryShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryShapeError::NotAnObject => write!(f, "document is not a JSON object"),
            GeometryShapeError::GeometryNotAnArray => {
                write!(f, "\"{}\" is not an array", GEOMETRY_KEY)
            }
        }
    }
}

/// Identifiers declared by a geometry document, in document order.
///
/// Definitions without a non-empty `description.identifier` are ignored.
/// Legacy keys contribute the part before any `:parent` suffix.
pub fn declared_identifiers(doc: &Value) -> Result<Vec<String>, GeometryShapeError> {
    let object = doc.as_object().ok_or(GeometryShapeError::NotAnObject)?;

    if let Some(definitions) = object.get(GEOMETRY_KEY) {
        let definitions = definitions
            .as_array()
            .ok_or(GeometryShapeError::GeometryNotAnArray)?;
        return Ok(definitions
            .iter()
            .filter_map(|def| def.pointer("/description/identifier"))
            .filter_map(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect());
    }

    Ok(object
        .keys()
        .filter(|key| key.starts_with(LEGACY_PREFIX))
        .map(|key| legacy_identifier(key).to_string())
        .collect())
}

/// The first geometry definition in a document.
///
/// Returns `Ok(None)` if the document declares no definitions.
pub fn first_definition(doc: Value) -> serde_json::Result<Option<GeometryDefinition>> {
    let Value::Object(mut object) = doc else {
        return Ok(None);
    };

    if let Some(Value::Array(definitions)) = object.remove(GEOMETRY_KEY) {
        return match definitions.into_iter().next() {
            Some(first) => serde_json::from_value(first).map(Some),
            None => Ok(None),
        };
    }

    let legacy_key = object
        .keys()
        .find(|key| key.starts_with(LEGACY_PREFIX))
        .cloned();
    match legacy_key.and_then(|key| object.remove(&key).map(|value| (key, value))) {
        Some((key, value)) => {
            let mut definition: GeometryDefinition = serde_json::from_value(value)?;
            if definition.description.identifier.is_empty() {
                definition.description.identifier = legacy_identifier(&key).to_string();
            }
            Ok(Some(definition))
        }
        None => Ok(None),
    }
}

/// "geometry.zombie:geometry.humanoid" -> "geometry.zombie"
fn legacy_identifier(key: &str) -> &str {
    key.split_once(':').map(|(child, _)| child).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declared_identifiers_modern() {
        let doc = json!({
            "format_version": "1.12.0",
            "minecraft:geometry": [
                {"description": {"identifier": "geometry.creeper"}},
                {"description": {"identifier": ""}},
                {"bones": []},
                {"description": {"identifier": "geometry.creeper.charged"}}
            ]
        });
        assert_eq!(
            declared_identifiers(&doc).unwrap(),
            vec!["geometry.creeper", "geometry.creeper.charged"]
        );
    }

    #[test]
    fn test_declared_identifiers_legacy() {
        let doc = json!({
            "format_version": "1.8.0",
            "geometry.zombie:geometry.humanoid": {"bones": []},
            "geometry.humanoid": {"bones": []},
            "debug": true
        });
        assert_eq!(
            declared_identifiers(&doc).unwrap(),
            vec!["geometry.zombie", "geometry.humanoid"]
        );
    }

    #[test]
    fn test_declared_identifiers_bad_shape() {
        assert_eq!(
            declared_identifiers(&json!([1, 2])),
            Err(GeometryShapeError::NotAnObject)
        );
        assert_eq!(
            declared_identifiers(&json!({"minecraft:geometry": {}})),
            Err(GeometryShapeError::GeometryNotAnArray)
        );
    }

    #[test]
    fn test_first_definition_parses_bones_and_cubes() {
        let doc = json!({
            "minecraft:geometry": [{
                "description": {"identifier": "geometry.pig", "texture_width": 64, "texture_height": 32},
                "bones": [{
                    "name": "body",
                    "pivot": [0, 13, 2],
                    "rotation": [90, 0, 0],
                    "cubes": [{"origin": [-5, 7, -5], "size": [10, 16, 8], "uv": [28, 8]}]
                }]
            }]
        });

        let definition = first_definition(doc).unwrap().unwrap();
        assert_eq!(definition.description.identifier, "geometry.pig");
        assert_eq!(definition.texture_size(), Some((64, 32)));
        assert_eq!(definition.bones.len(), 1);
        assert_eq!(definition.bones[0].cubes[0].size, [10.0, 16.0, 8.0]);
        assert!(definition.uses_box_uv());
    }

    #[test]
    fn test_first_definition_legacy_uses_key_as_identifier() {
        let doc = json!({
            "geometry.cow:geometry.quadruped": {
                "texturewidth": 64,
                "textureheight": 32,
                "bones": [{"name": "head", "pivot": [0, 20, -8]}]
            }
        });

        let definition = first_definition(doc).unwrap().unwrap();
        assert_eq!(definition.description.identifier, "geometry.cow");
        assert_eq!(definition.texture_size(), Some((64, 32)));
    }

    #[test]
    fn test_first_definition_empty() {
        assert!(first_definition(json!({"minecraft:geometry": []})).unwrap().is_none());
        assert!(first_definition(json!({"format_version": "1.12.0"})).unwrap().is_none());
    }

    #[test]
    fn test_per_face_uv_disables_box_uv() {
        let definition: GeometryDefinition = serde_json::from_value(json!({
            "bones": [{"name": "a", "cubes": [{"uv": {"north": {"uv": [0, 0], "uv_size": [4, 4]}}}]}]
        }))
        .unwrap();
        assert!(!definition.uses_box_uv());
    }
}
