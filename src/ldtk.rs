//! Serde model of the LDtk export subset the repacker consumes.
//!
//! The document schema is owned by the upstream editor tool; only the
//! fields the decoder actually reads are modeled here and everything
//! else in the export is ignored during deserialization.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Document {
    pub defs: Defs,
    pub levels: Vec<Level>,
}

#[derive(Debug, Deserialize)]
pub struct Defs {
    pub tilesets: Vec<TilesetDef>,
}

#[derive(Debug, Deserialize)]
pub struct TilesetDef {
    pub identifier: String,
    #[serde(rename = "enumTags", default)]
    pub enum_tags: Vec<EnumTag>,
}

/// Associates one semantic tile-type label with the tile ids carrying it.
#[derive(Debug, Deserialize)]
pub struct EnumTag {
    #[serde(rename = "enumValueId")]
    pub enum_value_id: String,
    #[serde(rename = "tileIds")]
    pub tile_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Level {
    /// Editor-side level identifier, used for diagnostics only; the
    /// runtime-facing name comes from the `Name` field instance.
    #[serde(default)]
    pub identifier: String,
    #[serde(rename = "fieldInstances", default)]
    pub field_instances: Vec<FieldInstance>,
    #[serde(rename = "layerInstances", default)]
    pub layer_instances: Vec<LayerInstance>,
}

#[derive(Debug, Deserialize)]
pub struct FieldInstance {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    #[serde(rename = "__value")]
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct LayerInstance {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    /// Grid width in cells.
    #[serde(rename = "__cWid", default)]
    pub c_wid: i64,
    /// Grid height in cells.
    #[serde(rename = "__cHei", default)]
    pub c_hei: i64,
    #[serde(rename = "gridTiles", default)]
    pub grid_tiles: Vec<GridTile>,
    #[serde(rename = "entityInstances", default)]
    pub entity_instances: Vec<EntityInstance>,
    /// Dense per-cell values, row-major; liquid fill levels here.
    #[serde(rename = "intGridCsv", default)]
    pub int_grid_csv: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GridTile {
    /// `d[0]` is the cell index into the row-major grid.
    pub d: Vec<i64>,
    /// Source-local tile id within the tileset.
    pub t: i64,
}

#[derive(Debug, Deserialize)]
pub struct EntityInstance {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    /// `[x, y]` in grid cells; may be absent in malformed exports, in
    /// which case the decoder skips the entity.
    #[serde(rename = "__grid", default)]
    pub grid: Vec<i64>,
}
