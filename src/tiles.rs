//! Game tile-type enumeration and the tileset tag resolver.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ldtk;

/// Semantic tile and entity types understood by the game runtime.
///
/// The discriminants are the byte values written into the level pack.
/// 0 is reserved for an empty cell and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TileType {
    Solid = 1,
    WoodenPlat = 2,
    Ladder = 3,
    LSpike = 4,
    RSpike = 5,
    USpike = 6,
    DSpike = 7,
    EmptyWCrate = 8,
    LArrowWCrate = 9,
    RArrowWCrate = 10,
    UArrowWCrate = 11,
    DArrowWCrate = 12,
    BombWCrate = 13,
    EmptyMCrate = 14,
    LArrowMCrate = 15,
    RArrowMCrate = 16,
    UArrowMCrate = 17,
    DArrowMCrate = 18,
    BombMCrate = 19,
    Boulder = 20,
    Runner = 21,
    Player = 22,
    Chest = 23,
    Exit = 24,
    Urchin = 25,
}

impl TileType {
    /// Fixed label -> type table. Labels are the editor-side enum value
    /// names and must match exactly; both tileset tags and entity
    /// identifiers resolve through this one table.
    pub fn from_name(name: &str) -> Option<TileType> {
        Some(match name {
            "Solid" => TileType::Solid,
            "WoodenPlat" => TileType::WoodenPlat,
            "Ladder" => TileType::Ladder,
            "LSpike" => TileType::LSpike,
            "RSpike" => TileType::RSpike,
            "USpike" => TileType::USpike,
            "DSpike" => TileType::DSpike,
            "EmptyWCrate" => TileType::EmptyWCrate,
            "LArrowWCrate" => TileType::LArrowWCrate,
            "RArrowWCrate" => TileType::RArrowWCrate,
            "UArrowWCrate" => TileType::UArrowWCrate,
            "DArrowWCrate" => TileType::DArrowWCrate,
            "BombWCrate" => TileType::BombWCrate,
            "EmptyMCrate" => TileType::EmptyMCrate,
            "LArrowMCrate" => TileType::LArrowMCrate,
            "RArrowMCrate" => TileType::RArrowMCrate,
            "UArrowMCrate" => TileType::UArrowMCrate,
            "DArrowMCrate" => TileType::DArrowMCrate,
            "BombMCrate" => TileType::BombMCrate,
            "Boulder" => TileType::Boulder,
            "Runner" => TileType::Runner,
            "Player" => TileType::Player,
            "Chest" => TileType::Chest,
            "Exit" => TileType::Exit,
            "Urchin" => TileType::Urchin,
            _ => return None,
        })
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Mapping from source-local tile ids to game tile types, built once per
/// document from the designated tileset's enum tags and immutable after.
pub type TileTypeMap = HashMap<i64, TileType>;

/// Build the tile-type mapping from the tileset named `tileset_name`.
///
/// Each enum tag contributes its first listed tile id; a tag whose label
/// is not in the fixed table is a fatal configuration error, as is a
/// missing tileset or one that yields an empty mapping.
pub fn resolve_tile_types(defs: &ldtk::Defs, tileset_name: &str) -> Result<TileTypeMap> {
    let tileset = defs
        .tilesets
        .iter()
        .find(|ts| ts.identifier == tileset_name)
        .ok_or_else(|| Error::TilesetNotFound(tileset_name.to_string()))?;

    let mut map = TileTypeMap::new();
    for tag in &tileset.enum_tags {
        let tile_type =
            TileType::from_name(&tag.enum_value_id).ok_or_else(|| Error::UnknownTileTag {
                tileset: tileset_name.to_string(),
                tag: tag.enum_value_id.clone(),
            })?;
        // The editor may tag several tile ids with one type; the first
        // listed id is the canonical one.
        if let Some(&id) = tag.tile_ids.first() {
            map.insert(id, tile_type);
        }
    }

    if map.is_empty() {
        return Err(Error::EmptyTileTypeMap(tileset_name.to_string()));
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defs(value: serde_json::Value) -> ldtk::Defs {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_resolve_takes_first_tile_id_per_tag() {
        let defs = defs(json!({
            "tilesets": [{
                "identifier": "Items_spritesheet",
                "enumTags": [
                    { "enumValueId": "Solid", "tileIds": [5, 6, 7] },
                    { "enumValueId": "Chest", "tileIds": [12] },
                ],
            }],
        }));

        let map = resolve_tile_types(&defs, "Items_spritesheet").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&5], TileType::Solid);
        assert_eq!(map[&12], TileType::Chest);
        assert!(!map.contains_key(&6));
    }

    #[test]
    fn test_missing_tileset_is_fatal() {
        let defs = defs(json!({
            "tilesets": [{ "identifier": "Other", "enumTags": [] }],
        }));

        let err = resolve_tile_types(&defs, "Items_spritesheet").unwrap_err();
        assert!(matches!(err, Error::TilesetNotFound(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unknown_tag_label_is_fatal() {
        let defs = defs(json!({
            "tilesets": [{
                "identifier": "Items_spritesheet",
                "enumTags": [{ "enumValueId": "Lava", "tileIds": [3] }],
            }],
        }));

        let err = resolve_tile_types(&defs, "Items_spritesheet").unwrap_err();
        assert!(matches!(err, Error::UnknownTileTag { .. }));
    }

    #[test]
    fn test_empty_enum_tags_is_fatal_and_distinct() {
        let defs = defs(json!({
            "tilesets": [{ "identifier": "Items_spritesheet", "enumTags": [] }],
        }));

        let err = resolve_tile_types(&defs, "Items_spritesheet").unwrap_err();
        assert!(matches!(err, Error::EmptyTileTypeMap(_)));
    }

    #[test]
    fn test_tag_with_no_tile_ids_is_skipped() {
        let defs = defs(json!({
            "tilesets": [{
                "identifier": "Items_spritesheet",
                "enumTags": [
                    { "enumValueId": "Solid", "tileIds": [] },
                    { "enumValueId": "Ladder", "tileIds": [9] },
                ],
            }],
        }));

        let map = resolve_tile_types(&defs, "Items_spritesheet").unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&9], TileType::Ladder);
    }
}
