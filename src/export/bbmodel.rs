//! Blockbench project (`.bbmodel`) generation.
//!
//! Converts a resolved entity into the editor's project document so it can be
//! rendered headlessly. Bedrock geometry uses a mirrored X axis relative to
//! the editor, so X positions and pivots are negated and X/Y rotations flip
//! sign.

use crate::error::{PreviewError, Result};
use crate::report::Reporter;
use crate::resource_pack::geometry::{first_definition, Bone, Cube, GeometryDefinition};
use crate::resource_pack::texture::DEFAULT_RESOLUTION;
use crate::resource_pack::{AnimationDefinition, AnimationFile, ResourcePack};
use crate::types::Entity;
use glam::Vec3;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Project format version written to `meta.format_version`.
pub const FORMAT_VERSION: &str = "4.0";

/// Keyframe snapping used for every animation.
pub const ANIMATION_SNAPPING: u32 = 24;

/// Maximum bone nesting depth (guards against parent cycles).
const MAX_BONE_DEPTH: usize = 64;

/// A Blockbench project document.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub meta: ProjectMeta,
    pub name: String,
    pub model_identifier: String,
    pub resolution: Resolution,
    pub elements: Vec<Element>,
    pub outliner: Vec<OutlinerNode>,
    pub textures: Vec<ProjectTexture>,
    pub animations: Vec<ProjectAnimation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectMeta {
    pub format_version: String,
    pub model_format: String,
    pub box_uv: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// A cube element.
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub box_uv: bool,
    pub from: [f32; 3],
    pub to: [f32; 3],
    pub origin: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    pub inflate: f32,
    pub mirror_uv: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_offset: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub faces: Map<String, Value>,
    pub uuid: Uuid,
}

/// A bone group in the outliner tree.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub name: String,
    pub origin: [f32; 3],
    pub rotation: [f32; 3],
    pub mirror_uv: bool,
    pub export: bool,
    #[serde(rename = "isOpen")]
    pub is_open: bool,
    pub visibility: bool,
    pub uuid: Uuid,
    pub children: Vec<OutlinerNode>,
}

/// Outliner children are either element ids or nested groups.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutlinerNode {
    Element(Uuid),
    Group(Group),
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectTexture {
    pub path: String,
    pub name: String,
    pub folder: String,
    pub namespace: String,
    pub id: String,
    pub particle: bool,
    pub render_mode: String,
    pub frame_time: u32,
    pub frame_order: Vec<u32>,
    pub visible: bool,
    pub saved: bool,
    pub uuid: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectAnimation {
    pub name: String,
    #[serde(rename = "loop")]
    pub looping: String,
    #[serde(rename = "override")]
    pub override_previous: bool,
    pub length: f32,
    pub snapping: u32,
    pub animators: Value,
    pub uuid: Uuid,
}

impl Project {
    /// An empty bedrock project at the default resolution.
    pub fn new(name: impl Into<String>) -> Self {
        let (width, height) = DEFAULT_RESOLUTION;
        Self {
            meta: ProjectMeta {
                format_version: FORMAT_VERSION.to_string(),
                model_format: "bedrock".to_string(),
                box_uv: true,
            },
            name: name.into(),
            model_identifier: String::new(),
            resolution: Resolution { width, height },
            elements: Vec::new(),
            outliner: Vec::new(),
            textures: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of all groups in depth-first order.
    pub fn group_names(&self) -> Vec<&str> {
        fn walk<'a>(nodes: &'a [OutlinerNode], out: &mut Vec<&'a str>) {
            for node in nodes {
                if let OutlinerNode::Group(group) = node {
                    out.push(&group.name);
                    walk(&group.children, out);
                }
            }
        }
        let mut names = Vec::new();
        walk(&self.outliner, &mut names);
        names
    }
}

/// Build a project for an entity from the files of `pack`.
///
/// Uses the first definition of the entity's first geometry file, every
/// texture that can be found, and every animation in every animation file.
/// Missing textures and unreadable animation files are reported and skipped.
pub fn create_project(entity: &Entity, pack: &ResourcePack, reporter: &dyn Reporter) -> Result<Project> {
    let geometry_path = entity
        .geometry_files
        .first()
        .ok_or_else(|| PreviewError::MissingGeometry(entity.identifier.clone()))?;

    let doc: Value = pack.read_json(geometry_path)?;
    let geometry = first_definition(doc)?
        .ok_or_else(|| PreviewError::InvalidGeometry(geometry_path.clone()))?;

    let (elements, outliner) = convert_bones(&geometry, reporter);
    let (textures, texture_size) = collect_textures(entity, pack, reporter);
    let animations = collect_animations(entity, pack, reporter);

    let (width, height) = geometry
        .texture_size()
        .or(texture_size)
        .unwrap_or(DEFAULT_RESOLUTION);

    let mut project = Project::new(entity.identifier.clone());
    project.meta.box_uv = geometry.uses_box_uv();
    project.model_identifier = geometry
        .description
        .identifier
        .trim_start_matches("geometry.")
        .to_string();
    project.resolution = Resolution { width, height };
    project.elements = elements;
    project.outliner = outliner;
    project.textures = textures;
    project.animations = animations;
    Ok(project)
}

/// Convert bones into flat elements plus the nested outliner.
fn convert_bones(geometry: &GeometryDefinition, reporter: &dyn Reporter) -> (Vec<Element>, Vec<OutlinerNode>) {
    let mut children_of: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (index, bone) in geometry.bones.iter().enumerate() {
        let parent = bone
            .parent
            .as_deref()
            .filter(|parent| geometry.bones.iter().any(|b| b.name == *parent));
        match parent {
            Some(parent) if parent != bone.name => children_of.entry(parent).or_default().push(index),
            _ => roots.push(index),
        }
    }

    let mut elements = Vec::new();
    let mut outliner = Vec::new();
    for index in roots {
        let group = build_group(geometry, index, &children_of, &mut elements, 0, reporter);
        outliner.push(OutlinerNode::Group(group));
    }

    (elements, outliner)
}

fn build_group(
    geometry: &GeometryDefinition,
    index: usize,
    children_of: &HashMap<&str, Vec<usize>>,
    elements: &mut Vec<Element>,
    depth: usize,
    reporter: &dyn Reporter,
) -> Group {
    let bone = &geometry.bones[index];
    let mut children = Vec::new();

    for cube in &bone.cubes {
        let element = convert_cube(bone, cube);
        children.push(OutlinerNode::Element(element.uuid));
        elements.push(element);
    }

    if depth >= MAX_BONE_DEPTH {
        reporter.warn(&format!(
            "Bone hierarchy below {} is too deep; children dropped",
            bone.name
        ));
    } else if let Some(child_indices) = children_of.get(bone.name.as_str()) {
        for &child in child_indices {
            let group = build_group(geometry, child, children_of, elements, depth + 1, reporter);
            children.push(OutlinerNode::Group(group));
        }
    }

    Group {
        name: bone.name.clone(),
        origin: mirror_x(Vec3::from(bone.pivot)).to_array(),
        rotation: flip_rotation(bone.rotation),
        mirror_uv: bone.mirror,
        export: true,
        is_open: false,
        visibility: true,
        uuid: Uuid::new_v4(),
        children,
    }
}

fn convert_cube(bone: &Bone, cube: &Cube) -> Element {
    let origin = Vec3::from(cube.origin);
    let size = Vec3::from(cube.size);

    let from = Vec3::new(-(origin.x + size.x), origin.y, origin.z);
    let to = from + size;

    let pivot = cube.pivot.unwrap_or(bone.pivot);

    let (box_uv, uv_offset, faces) = match &cube.uv {
        Some(Value::Array(offset)) => (true, uv_pair(offset), Map::new()),
        Some(Value::Object(per_face)) => (false, None, convert_faces(per_face)),
        _ => (true, Some([0.0, 0.0]), Map::new()),
    };

    Element {
        name: bone.name.clone(),
        kind: "cube",
        box_uv,
        from: from.to_array(),
        to: to.to_array(),
        origin: mirror_x(Vec3::from(pivot)).to_array(),
        rotation: cube.rotation.map(flip_rotation),
        inflate: cube.inflate.unwrap_or(bone.inflate),
        mirror_uv: cube.mirror.unwrap_or(bone.mirror),
        uv_offset,
        faces,
        uuid: Uuid::new_v4(),
    }
}

/// Per-face `{uv, uv_size}` to the editor's `[u1, v1, u2, v2]` faces.
fn convert_faces(per_face: &Map<String, Value>) -> Map<String, Value> {
    per_face
        .iter()
        .filter_map(|(face, spec)| {
            let uv = uv_pair(spec.get("uv")?.as_array()?)?;
            let size = spec
                .get("uv_size")
                .and_then(Value::as_array)
                .and_then(|s| uv_pair(s))
                .unwrap_or([0.0, 0.0]);
            let face_json = serde_json::json!({
                "uv": [uv[0], uv[1], uv[0] + size[0], uv[1] + size[1]],
                "texture": 0
            });
            Some((face.clone(), face_json))
        })
        .collect()
}

fn uv_pair(values: &[Value]) -> Option<[f32; 2]> {
    match values {
        [u, v, ..] => Some([u.as_f64()? as f32, v.as_f64()? as f32]),
        _ => None,
    }
}

fn mirror_x(v: Vec3) -> Vec3 {
    Vec3::new(-v.x, v.y, v.z)
}

fn flip_rotation(rotation: [f32; 3]) -> [f32; 3] {
    [-rotation[0], -rotation[1], rotation[2]]
}

/// Project textures plus the size of the first readable PNG.
fn collect_textures(
    entity: &Entity,
    pack: &ResourcePack,
    reporter: &dyn Reporter,
) -> (Vec<ProjectTexture>, Option<(u32, u32)>) {
    let mut textures = Vec::new();
    let mut size = None;

    for declared in &entity.texture_files {
        let Some(texture) = pack.find_texture(declared) else {
            reporter.warn(&format!(
                "Texture {} for {} not found in pack",
                declared, entity.identifier
            ));
            continue;
        };

        if size.is_none() {
            size = pack.texture_size(&texture);
        }

        textures.push(ProjectTexture {
            path: pack.absolute_path(&texture.path).to_string_lossy().into_owned(),
            name: texture.file_name().to_string(),
            folder: String::new(),
            namespace: String::new(),
            id: texture.stem().to_string(),
            particle: false,
            render_mode: "normal".to_string(),
            frame_time: 1,
            frame_order: Vec::new(),
            visible: true,
            saved: true,
            uuid: Uuid::new_v4(),
        });
    }

    (textures, size)
}

fn collect_animations(entity: &Entity, pack: &ResourcePack, reporter: &dyn Reporter) -> Vec<ProjectAnimation> {
    let mut animations = Vec::new();

    for path in &entity.animation_files {
        let file: AnimationFile = match pack.read_json(path) {
            Ok(file) => file,
            Err(e) => {
                reporter.warn(&format!("Could not read animation file {}: {}", path, e));
                continue;
            }
        };

        for (name, value) in file.animations {
            let definition: AnimationDefinition = match serde_json::from_value(value) {
                Ok(definition) => definition,
                Err(e) => {
                    reporter.warn(&format!("Skipping animation {} in {}: {}", name, path, e));
                    continue;
                }
            };

            animations.push(ProjectAnimation {
                looping: definition.loop_mode().as_str().to_string(),
                override_previous: definition.override_previous_animation,
                length: definition.length(),
                snapping: ANIMATION_SNAPPING,
                animators: definition.bones.unwrap_or_else(|| Value::Object(Map::new())),
                uuid: Uuid::new_v4(),
                name,
            });
        }
    }

    animations
}
