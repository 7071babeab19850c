//! Client entity parsing and reference resolution.

use super::resource_map::{ResourceKind, ResourceMap};
use crate::error::{PreviewError, Result};
use crate::report::Reporter;
use crate::resource_pack::client_entity::{role_values, CLIENT_ENTITY_KEY};
use crate::resource_pack::{ClientEntityFile, ResourcePack};
use crate::types::Entity;
use serde_json::{Map, Value};

/// Parse every client entity definition in the pack.
///
/// Definitions are read from `.json` files below any `entity` directory.
/// Files that are not client entity definitions are skipped silently;
/// files that fail to parse, or lack an identifier, are skipped with a
/// warning. Output order follows the pack's file order.
pub fn parse_entities(pack: &ResourcePack, map: &ResourceMap, reporter: &dyn Reporter) -> Vec<Entity> {
    let mut entities = Vec::new();

    for path in pack.files_under("entity", &[".json"]) {
        match parse_entity_file(pack, map, path) {
            Ok(Some(entity)) => {
                reporter.debug(&format!("Parsed {} from {}", entity.identifier, path));
                entities.push(entity);
            }
            Ok(None) => {}
            Err(e) => reporter.warn(&format!("Could not parse entity file {}: {}", path, e)),
        }
    }

    entities
}

/// Parse one definition file. `Ok(None)` means the file has no client
/// entity description.
fn parse_entity_file(pack: &ResourcePack, map: &ResourceMap, path: &str) -> Result<Option<Entity>> {
    let document: Value = pack.read_json(path)?;
    let has_description = document
        .get(CLIENT_ENTITY_KEY)
        .and_then(|entity| entity.get("description"))
        .is_some_and(Value::is_object);
    if !has_description {
        return Ok(None);
    }

    let file: ClientEntityFile = serde_json::from_value(document)?;
    let Some(description) = file.description() else {
        return Ok(None);
    };

    let identifier = description.identifier.as_deref().ok_or_else(|| {
        PreviewError::InvalidResourcePack("description.identifier is missing".to_string())
    })?;

    let mut entity = Entity::new(identifier, path);
    entity.geometry_files = resolve_all(map, ResourceKind::Geometry, &description.geometry);
    entity.texture_files = role_values(&description.textures).map(str::to_string).collect();
    entity.animation_files = resolve_all(map, ResourceKind::Animation, &description.animations);
    entity.material_files = resolve_all(map, ResourceKind::Material, &description.materials);

    Ok(Some(entity))
}

/// Resolve each referenced identifier; unknown identifiers are dropped.
fn resolve_all(map: &ResourceMap, kind: ResourceKind, references: &Map<String, Value>) -> Vec<String> {
    role_values(references)
        .filter_map(|identifier| map.get(kind, identifier))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use crate::resolver::build_resource_map;
    use crate::resolver::test_support::{creeper_pack, write_pack, CREEPER_GEO};

    fn parse(pack: &ResourcePack, reporter: &RecordingReporter) -> Vec<Entity> {
        let map = build_resource_map(pack, reporter);
        parse_entities(pack, &map, reporter)
    }

    #[test]
    fn test_creeper_resolves_all_dependencies() {
        let dir = creeper_pack();
        let pack = dir.pack();
        let reporter = RecordingReporter::new();
        let entities = parse(&pack, &reporter);

        assert_eq!(entities.len(), 1);
        let creeper = &entities[0];
        assert_eq!(creeper.identifier, "minecraft:creeper");
        assert_eq!(creeper.definition_path, "entity/creeper.entity.json");
        assert_eq!(creeper.geometry_files, vec!["models/entity/creeper.geo.json"]);
        assert_eq!(creeper.texture_files, vec!["textures/entity/creeper/creeper"]);
        assert_eq!(creeper.animation_files, vec!["animations/creeper.animation.json"]);
        assert_eq!(
            creeper.material_files,
            vec!["materials/entity.material", "materials/entity.material"]
        );
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_missing_geometry_reference_is_dropped() {
        let dir = write_pack(&[(
            "entity/ghost.entity.json",
            r#"{"minecraft:client_entity": {"description": {
                "identifier": "custom:ghost",
                "geometry": {"default": "geometry.missing_id"},
                "textures": {"default": "textures/entity/ghost"}
            }}}"#,
        )]);
        let pack = dir.pack();
        let reporter = RecordingReporter::new();
        let entities = parse(&pack, &reporter);

        assert_eq!(entities.len(), 1);
        assert!(entities[0].geometry_files.is_empty());
        assert_eq!(entities[0].texture_files, vec!["textures/entity/ghost"]);
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_textures_are_taken_verbatim_in_declaration_order() {
        let dir = write_pack(&[(
            "entity/sheep.entity.json",
            r#"{"minecraft:client_entity": {"description": {
                "identifier": "minecraft:sheep",
                "textures": {"wool": "textures/entity/sheep/sheep_fur.png", "default": "textures/entity/sheep/sheep", "again": "textures/entity/sheep/sheep"}
            }}}"#,
        )]);
        let pack = dir.pack();
        let entities = parse(&pack, &RecordingReporter::new());

        assert_eq!(
            entities[0].texture_files,
            vec![
                "textures/entity/sheep/sheep_fur.png",
                "textures/entity/sheep/sheep",
                "textures/entity/sheep/sheep"
            ]
        );
    }

    #[test]
    fn test_files_without_description_are_skipped_quietly() {
        let dir = write_pack(&[
            ("entity/server.json", r#"{"minecraft:entity": {"components": {}}}"#),
            ("models/entity/creeper.geo.json", CREEPER_GEO),
        ]);
        let pack = dir.pack();
        let reporter = RecordingReporter::new();
        let entities = parse(&pack, &reporter);

        assert!(entities.is_empty());
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_non_object_documents_are_skipped_quietly() {
        let dir = write_pack(&[
            ("entity/list.json", "[]"),
            ("entity/text.json", r#""minecraft:client_entity""#),
            ("entity/flat.entity.json", r#"{"minecraft:client_entity": "custom:flat"}"#),
            (
                "entity/odd.entity.json",
                r#"{"minecraft:client_entity": {"description": "custom:odd"}}"#,
            ),
        ]);
        let pack = dir.pack();
        let reporter = RecordingReporter::new();
        let entities = parse(&pack, &reporter);

        assert!(entities.is_empty());
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_missing_identifier_and_bad_json_warn() {
        let dir = write_pack(&[
            ("entity/anon.entity.json", r#"{"minecraft:client_entity": {"description": {}}}"#),
            ("entity/broken.entity.json", "{"),
            (
                "entity/ok.entity.json",
                r#"{"minecraft:client_entity": {"description": {"identifier": "custom:ok"}}}"#,
            ),
        ]);
        let pack = dir.pack();
        let reporter = RecordingReporter::new();
        let entities = parse(&pack, &reporter);

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].identifier, "custom:ok");
        assert_eq!(reporter.warnings().len(), 2);
        assert!(reporter.warnings()[0].contains("entity/anon.entity.json"));
    }

    #[test]
    fn test_duplicate_identifiers_produce_two_entities() {
        let definition = r#"{"minecraft:client_entity": {"description": {"identifier": "custom:twin"}}}"#;
        let dir = write_pack(&[
            ("entity/a.entity.json", definition),
            ("entity/b.entity.json", definition),
        ]);
        let pack = dir.pack();
        let entities = parse(&pack, &RecordingReporter::new());

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].identifier, entities[1].identifier);
        assert_ne!(entities[0].definition_path, entities[1].definition_path);
    }

    #[test]
    fn test_nested_entity_directories_are_scanned() {
        let dir = write_pack(&[(
            "packs/rp/entity/mobs/zombie.entity.json",
            r#"{"minecraft:client_entity": {"description": {"identifier": "minecraft:zombie"}}}"#,
        )]);
        let pack = dir.pack();
        let entities = parse(&pack, &RecordingReporter::new());

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].definition_path, "packs/rp/entity/mobs/zombie.entity.json");
    }
}
