//! Entity dependency resolution.
//!
//! This module indexes the named resources of a pack, resolves each client
//! entity's references to concrete files, and decides which entities a set
//! of changed files affects.

pub mod resource_map;
pub mod entity_parser;
pub mod affected;

pub use affected::{find_affected_entities, to_pack_relative};
pub use entity_parser::parse_entities;
pub use resource_map::{build_resource_map, ResourceKind, ResourceMap};

use crate::report::Reporter;
use crate::resource_pack::ResourcePack;
use crate::types::Entity;

/// Index a pack and parse every client entity in it.
pub fn parse_resource_pack(pack: &ResourcePack, reporter: &dyn Reporter) -> Vec<Entity> {
    reporter.info("Building resource map...");
    let map = build_resource_map(pack, reporter);
    reporter.info(&format!(
        "Found {} geometries, {} animations and {} materials.",
        map.geometries.len(),
        map.animations.len(),
        map.materials.len()
    ));

    reporter.info("Parsing entity files...");
    let entities = parse_entities(pack, &map, reporter);
    reporter.info(&format!("Successfully parsed {} entities.", entities.len()));
    entities
}


#[cfg(test)]
mod tests {
    use super::test_support::creeper_pack;
    use super::*;
    use crate::report::RecordingReporter;

    #[test]
    fn test_parse_resource_pack_reports_totals() {
        let pack = creeper_pack();
        let reporter = RecordingReporter::new();
        let entities = parse_resource_pack(&pack.pack(), &reporter);

        assert_eq!(entities.len(), 1);
        assert!(reporter
            .infos()
            .contains(&"Found 1 geometries, 1 animations and 3 materials.".to_string()));
        assert!(reporter
            .infos()
            .contains(&"Successfully parsed 1 entities.".to_string()));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let pack = creeper_pack();
        let first = parse_resource_pack(&pack.pack(), &RecordingReporter::new());
        let second = parse_resource_pack(&pack.pack(), &RecordingReporter::new());
        assert_eq!(first, second);
    }
}
