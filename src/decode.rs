//! Decoding LDtk level entries into dense cell grids.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ldtk;
use crate::tiles::{TileType, TileTypeMap};

pub const TILE_LAYER: &str = "Tiles";
pub const ENTITY_LAYER: &str = "Entities";
pub const LIQUID_LAYER: &str = "Water";

/// Order key assigned to levels without an `Order` field; pushes them
/// past every explicitly ordered level.
pub const UNORDERED_KEY: u32 = 65535;

/// Longest level name carried in metadata. 31 bytes keeps the 32-byte
/// pack header field NUL-terminated for the C-side loader.
pub const MAX_NAME_BYTES: usize = 31;

/// How entity placements land on the grid. The two observed pack
/// revisions disagree, so this stays a runtime switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EntityMode {
    /// Entities supersede the tile type at their cell (newer revision).
    #[default]
    Overlay,
    /// Entities occupy the dedicated entity slot (older revision).
    Separate,
}

/// One grid cell of a decoded level; matches the 4-byte wire record
/// minus the reserved padding byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub tile_type: u8,
    pub entity: u8,
    pub liquid: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelMeta {
    pub name: String,
    pub tileset_selector: u16,
    /// Sort key only; never written to the pack.
    pub order_key: u32,
    pub chest_count: u16,
}

/// A fully decoded level: metadata plus a dense row-major cell grid of
/// exactly `width * height` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub meta: LevelMeta,
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
}

impl Level {
    pub fn cell(&self, x: u16, y: u16) -> &Cell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }
}

/// A tile entry whose source id had no tile-type mapping or whose grid
/// index fell outside the level. The cell stays empty and decoding
/// continues; these are reported, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedTile {
    pub tile_id: i64,
    pub cell_index: usize,
}

/// Decode every level in the document and order them by ascending
/// `Order` key; the sort is stable, so ties keep document order.
pub fn decode_pack(
    doc: &ldtk::Document,
    tile_types: &TileTypeMap,
    mode: EntityMode,
) -> Result<Vec<(Level, Vec<UnresolvedTile>)>> {
    let mut decoded = Vec::with_capacity(doc.levels.len());
    for src in &doc.levels {
        decoded.push(decode_level(src, tile_types, mode)?);
    }
    decoded.sort_by_key(|(level, _)| level.meta.order_key);
    Ok(decoded)
}

/// Decode a single level entry.
///
/// The tile layer is mandatory and supplies the grid dimensions; entity
/// and liquid layers are optional and contribute nothing when absent.
pub fn decode_level(
    src: &ldtk::Level,
    tile_types: &TileTypeMap,
    mode: EntityMode,
) -> Result<(Level, Vec<UnresolvedTile>)> {
    let mut meta = decode_meta(src);

    let mut tile_layer = None;
    let mut entity_layer = None;
    let mut liquid_layer = None;
    for layer in &src.layer_instances {
        match layer.identifier.as_str() {
            TILE_LAYER => tile_layer = Some(layer),
            ENTITY_LAYER => entity_layer = Some(layer),
            LIQUID_LAYER => liquid_layer = Some(layer),
            other => debug!(level = %src.identifier, layer = other, "ignoring unknown layer"),
        }
    }
    let tile_layer = tile_layer.ok_or_else(|| Error::MissingTileLayer {
        level: src.identifier.clone(),
    })?;

    let (width, height) = grid_dimensions(src, tile_layer)?;
    let n_cells = width as usize * height as usize;
    let mut cells = vec![Cell::default(); n_cells];

    // Tile pass: sparse {index, source id} entries.
    let mut unresolved = Vec::new();
    for tile in &tile_layer.grid_tiles {
        let Some(idx) = tile.d.first().and_then(|&i| usize::try_from(i).ok()) else {
            warn!(level = %src.identifier, tile_id = tile.t, "tile entry without a grid index");
            continue;
        };
        if idx >= n_cells {
            unresolved.push(UnresolvedTile { tile_id: tile.t, cell_index: idx });
            continue;
        }
        match tile_types.get(&tile.t) {
            Some(tt) => cells[idx].tile_type = tt.value(),
            None => unresolved.push(UnresolvedTile { tile_id: tile.t, cell_index: idx }),
        }
    }

    // Liquid pass: dense per-cell fill levels, clamped to a byte. Out of
    // range values are lossy by contract, not an error.
    if let Some(layer) = liquid_layer {
        let mut clamped = false;
        for (idx, &raw) in layer.int_grid_csv.iter().take(n_cells).enumerate() {
            clamped |= !(0..=255).contains(&raw);
            cells[idx].liquid = raw.clamp(0, 255) as u8;
        }
        if clamped {
            warn!(level = %src.identifier, "liquid levels clamped to 0..=255");
        }
        if layer.int_grid_csv.len() > n_cells {
            warn!(level = %src.identifier, "liquid grid longer than the level, extra entries ignored");
        }
    }

    // Entity pass. Unknown identifiers are informational only.
    if let Some(layer) = entity_layer {
        for ent in &layer.entity_instances {
            let Some(tt) = TileType::from_name(&ent.identifier) else {
                debug!(level = %src.identifier, entity = %ent.identifier, "skipping unknown entity");
                continue;
            };
            let (Some(&x), Some(&y)) = (ent.grid.first(), ent.grid.get(1)) else {
                warn!(level = %src.identifier, entity = %ent.identifier, "entity without grid coordinates");
                continue;
            };
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                warn!(level = %src.identifier, entity = %ent.identifier, x, y, "entity outside the grid");
                continue;
            }
            let idx = y as usize * width as usize + x as usize;
            match mode {
                EntityMode::Overlay => cells[idx].tile_type = tt.value(),
                EntityMode::Separate => cells[idx].entity = tt.value(),
            }
        }
    }

    meta.chest_count = count_chests(&cells, mode);

    Ok((Level { meta, width, height, cells }, unresolved))
}

/// Chests are counted after all passes so an entity that supersedes a
/// chest tile in overlay mode is not counted twice.
fn count_chests(cells: &[Cell], mode: EntityMode) -> u16 {
    let chest = TileType::Chest.value();
    cells
        .iter()
        .filter(|c| match mode {
            EntityMode::Overlay => c.tile_type == chest,
            EntityMode::Separate => c.tile_type == chest || c.entity == chest,
        })
        .count() as u16
}

fn decode_meta(src: &ldtk::Level) -> LevelMeta {
    let mut meta = LevelMeta {
        order_key: UNORDERED_KEY,
        ..LevelMeta::default()
    };
    for field in &src.field_instances {
        match field.identifier.as_str() {
            "Order" => {
                meta.order_key = field
                    .value
                    .as_u64()
                    .map(|v| v.min(u32::MAX as u64) as u32)
                    .unwrap_or(UNORDERED_KEY);
            }
            "Name" => {
                meta.name = truncate_name(field.value.as_str().unwrap_or_default(), src);
            }
            "TileSet" => {
                meta.tileset_selector =
                    field.value.as_u64().map(|v| v.min(u16::MAX as u64) as u16).unwrap_or(0);
            }
            other => debug!(level = %src.identifier, field = other, "ignoring unknown level field"),
        }
    }
    meta
}

fn truncate_name(name: &str, src: &ldtk::Level) -> String {
    if name.len() <= MAX_NAME_BYTES {
        return name.to_string();
    }
    let mut end = MAX_NAME_BYTES;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    warn!(level = %src.identifier, bytes = end, "level name truncated");
    name[..end].to_string()
}

fn grid_dimensions(src: &ldtk::Level, layer: &ldtk::LayerInstance) -> Result<(u16, u16)> {
    let fit = |v: i64| u16::try_from(v).ok().filter(|&v| v > 0);
    match (fit(layer.c_wid), fit(layer.c_hei)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(Error::BadDimensions {
            level: src.identifier.clone(),
            width: layer.c_wid,
            height: layer.c_hei,
        }),
    }
}
