//! Fixed-layout binary encoding of a level pack.
//!
//! Stream layout, little-endian throughout:
//!
//! ```text
//! u32  level count
//! per level:
//!   [u8; 32]  name, UTF-8, zero-padded
//!   u16       width
//!   u16       height
//!   u16       chest count
//!   u16       tileset selector
//!   width*height x [tile_type u8, entity u8, liquid u8, reserved 0u8]
//! ```

use std::io::Write;

use crate::decode::Level;
use crate::error::Result;

/// Pack format revision implemented by this crate. Deliberately not
/// written to disk: the runtime loader expects the level count as the
/// first four bytes of the file.
pub const FORMAT_VERSION: u32 = 2;

pub const NAME_FIELD_LEN: usize = 32;
pub const LEVEL_HEADER_LEN: usize = NAME_FIELD_LEN + 4 * 2;
pub const CELL_RECORD_LEN: usize = 4;

/// Little-endian byte emitter for the fixed pack layout.
pub struct PackWriter {
    data: Vec<u8>,
}

impl PackWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_u16_le(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a string into a fixed-size field: truncated to fit,
    /// zero-padded to `len`.
    pub fn write_fixed_str(&mut self, s: &str, len: usize) {
        let bytes = s.as_bytes();
        let n = bytes.len().min(len);
        self.data.extend_from_slice(&bytes[..n]);
        self.data.resize(self.data.len() + (len - n), 0);
    }
}

impl Default for PackWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl From<PackWriter> for Vec<u8> {
    fn from(writer: PackWriter) -> Self {
        writer.into_vec()
    }
}

fn encoded_level_len(level: &Level) -> usize {
    LEVEL_HEADER_LEN + level.cells.len() * CELL_RECORD_LEN
}

/// Encode an ordered level sequence into one pack stream. Pure and
/// total; the decoder already guaranteed every level invariant.
pub fn encode_pack(levels: &[Level]) -> Vec<u8> {
    let total = 4 + levels.iter().map(encoded_level_len).sum::<usize>();
    let mut w = PackWriter::with_capacity(total);
    w.write_u32_le(levels.len() as u32);
    for level in levels {
        encode_level(&mut w, level);
    }
    w.into_vec()
}

fn encode_level(w: &mut PackWriter, level: &Level) {
    w.write_fixed_str(&level.meta.name, NAME_FIELD_LEN);
    w.write_u16_le(level.width);
    w.write_u16_le(level.height);
    w.write_u16_le(level.meta.chest_count);
    w.write_u16_le(level.meta.tileset_selector);
    for cell in &level.cells {
        w.write_u8(cell.tile_type);
        w.write_u8(cell.entity);
        w.write_u8(cell.liquid);
        w.write_u8(0); // reserved
    }
}

/// Write the pack stream to `out`, optionally wrapped in a zstd frame.
///
/// The stream is encoded in memory first and written in one go, so a
/// run that fails before this point never produces an output file.
pub fn write_pack<W: Write>(levels: &[Level], mut out: W, compress: bool) -> Result<()> {
    let data = encode_pack(levels);
    if compress {
        zstd::stream::copy_encode(&data[..], &mut out, 0)?;
    } else {
        out.write_all(&data)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{Cell, LevelMeta};
    use std::io::Read;

    fn hall_level() -> Level {
        Level {
            meta: LevelMeta {
                name: "Hall".into(),
                tileset_selector: 1,
                order_key: 10,
                chest_count: 0,
            },
            width: 2,
            height: 1,
            cells: vec![Cell { tile_type: 3, entity: 0, liquid: 0 }, Cell::default()],
        }
    }

    #[test]
    fn test_known_level_bytes() {
        let data = encode_pack(&[hall_level()]);

        // Count, then the 40-byte header, then two cell records.
        assert_eq!(&data[..4], &[1, 0, 0, 0]);
        assert_eq!(&data[4..8], b"Hall");
        assert!(data[8..36].iter().all(|&b| b == 0));
        assert_eq!(&data[36..44], &[2, 0, 1, 0, 0, 0, 1, 0]);
        assert_eq!(&data[44..], &[3, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_stream_length_matches_layout() {
        let mut level = hall_level();
        level.width = 3;
        level.height = 4;
        level.cells = vec![Cell::default(); 12];

        let data = encode_pack(&[level.clone(), hall_level()]);
        let expected = 4 + (LEVEL_HEADER_LEN + 12 * CELL_RECORD_LEN)
            + (LEVEL_HEADER_LEN + 2 * CELL_RECORD_LEN);
        assert_eq!(data.len(), expected);
    }

    #[test]
    fn test_empty_pack_is_just_the_count() {
        assert_eq!(encode_pack(&[]), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_fixed_str_truncates_and_pads() {
        let mut w = PackWriter::new();
        w.write_fixed_str("abcdef", 4);
        w.write_fixed_str("ab", 4);
        assert_eq!(w.as_slice(), b"abcdab\0\0");
    }

    #[test]
    fn test_write_pack_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pack.lvldata");

        let file = std::fs::File::create(&path).unwrap();
        write_pack(&[hall_level()], file, false).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, encode_pack(&[hall_level()]));
    }

    #[test]
    fn test_compressed_pack_round_trips() {
        let mut out = Vec::new();
        write_pack(&[hall_level()], &mut out, true).unwrap();

        let mut plain = Vec::new();
        zstd::stream::Decoder::new(&out[..])
            .unwrap()
            .read_to_end(&mut plain)
            .unwrap();
        assert_eq!(plain, encode_pack(&[hall_level()]));
    }
}
