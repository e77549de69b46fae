//! LDtk level-pack repacker.
//!
//! Converts an LDtk editor export into the fixed-layout binary level
//! pack the game runtime loads: a u32 level count followed, per level,
//! by a 40-byte header and one 4-byte record per grid cell.

pub mod codec;
pub mod decode;
pub mod error;
pub mod ldtk;
pub mod tiles;

pub use codec::{encode_pack, read_pack, write_pack, PackReader, PackWriter, FORMAT_VERSION};
pub use decode::{
    decode_level, decode_pack, Cell, EntityMode, Level, LevelMeta, UnresolvedTile,
};
pub use error::{Error, Result};
pub use tiles::{resolve_tile_types, TileType, TileTypeMap};
