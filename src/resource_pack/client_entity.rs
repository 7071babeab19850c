//! Client entity definition parsing.
//!
//! Client entity files bind an entity identifier to the geometry, textures,
//! animations and materials used to draw it:
//!
//! ```json
//! {
//!   "format_version": "1.10.0",
//!   "minecraft:client_entity": {
//!     "description": {
//!       "identifier": "minecraft:creeper",
//!       "materials": {"default": "creeper"},
//!       "textures": {"default": "textures/entity/creeper/creeper"},
//!       "geometry": {"default": "geometry.creeper"},
//!       "animations": {"move": "animation.creeper.legs"}
//!     }
//!   }
//! }
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

/// Key of the client entity object.
pub const CLIENT_ENTITY_KEY: &str = "minecraft:client_entity";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientEntityFile {
    #[serde(default, rename = "minecraft:client_entity")]
    pub client_entity: Option<ClientEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientEntity {
    #[serde(default)]
    pub description: Option<EntityDescription>,
}

/// The `description` block. Role maps keep their declaration order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityDescription {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub geometry: Map<String, Value>,
    #[serde(default)]
    pub textures: Map<String, Value>,
    #[serde(default)]
    pub animations: Map<String, Value>,
    #[serde(default)]
    pub materials: Map<String, Value>,
}

impl ClientEntityFile {
    /// The description block, if this file is a client entity definition.
    pub fn description(&self) -> Option<&EntityDescription> {
        self.client_entity.as_ref()?.description.as_ref()
    }
}

/// String values of a role map in declaration order. Non-string values
/// (such as inline Molang objects) are skipped.
pub fn role_values(map: &Map<String, Value>) -> impl Iterator<Item = &str> {
    map.values().filter_map(Value::as_str)
}
