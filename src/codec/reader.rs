//! Decoding a pack stream back into levels.
//!
//! The runtime has its own loader; this reader exists for round-trip
//! verification (`--verify`) and tests. It checks bounds everywhere the
//! C loader trusts the file.

use crate::decode::{Cell, Level, LevelMeta};
use crate::error::{Error, Result};

use super::writer::{CELL_RECORD_LEN, NAME_FIELD_LEN};

/// Bounds-checked reader over an encoded pack stream.
pub struct PackReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PackReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a fixed-size zero-padded string field.
    pub fn read_fixed_str(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(len);
        std::str::from_utf8(&bytes[..end])
            .map(str::to_string)
            .map_err(|_| Error::InvalidPack("level name is not UTF-8".into()))
    }
}

/// Decode a full pack stream. `order_key` is not on the wire and comes
/// back as zero for every level.
pub fn read_pack(data: &[u8]) -> Result<Vec<Level>> {
    let mut r = PackReader::new(data);
    let count = r.read_u32_le()? as usize;
    let mut levels = Vec::new();
    for _ in 0..count {
        levels.push(read_level(&mut r)?);
    }
    if !r.is_empty() {
        return Err(Error::InvalidPack(format!(
            "{} trailing bytes after the last level",
            r.remaining()
        )));
    }
    Ok(levels)
}

fn read_level(r: &mut PackReader) -> Result<Level> {
    let name = r.read_fixed_str(NAME_FIELD_LEN)?;
    let width = r.read_u16_le()?;
    let height = r.read_u16_le()?;
    let chest_count = r.read_u16_le()?;
    let tileset_selector = r.read_u16_le()?;

    // The header is untrusted; make sure the stream actually holds the
    // claimed cell payload before allocating for it.
    let n_cells = width as usize * height as usize;
    if r.remaining() < n_cells * CELL_RECORD_LEN {
        return Err(Error::UnexpectedEof);
    }
    let mut cells = Vec::with_capacity(n_cells);
    for _ in 0..n_cells {
        let record = r.read_bytes(4)?;
        if record[3] != 0 {
            return Err(Error::InvalidPack("nonzero reserved cell byte".into()));
        }
        cells.push(Cell {
            tile_type: record[0],
            entity: record[1],
            liquid: record[2],
        });
    }

    Ok(Level {
        meta: LevelMeta { name, tileset_selector, order_key: 0, chest_count },
        width,
        height,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::writer::encode_pack;

    fn sample_levels() -> Vec<Level> {
        vec![
            Level {
                meta: LevelMeta {
                    name: "Hall".into(),
                    tileset_selector: 1,
                    order_key: 0,
                    chest_count: 2,
                },
                width: 2,
                height: 2,
                cells: vec![
                    Cell { tile_type: 23, entity: 0, liquid: 0 },
                    Cell { tile_type: 23, entity: 0, liquid: 0 },
                    Cell { tile_type: 1, entity: 0, liquid: 4 },
                    Cell::default(),
                ],
            },
            Level {
                meta: LevelMeta {
                    name: "Vault".into(),
                    tileset_selector: 0,
                    order_key: 0,
                    chest_count: 0,
                },
                width: 1,
                height: 1,
                cells: vec![Cell { tile_type: 0, entity: 22, liquid: 0 }],
            },
        ]
    }

    #[test]
    fn test_round_trip() {
        let levels = sample_levels();
        let decoded = read_pack(&encode_pack(&levels)).unwrap();
        assert_eq!(decoded, levels);
    }

    #[test]
    fn test_truncated_stream() {
        let data = encode_pack(&sample_levels());
        let err = read_pack(&data[..data.len() - 3]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut data = encode_pack(&sample_levels());
        data.push(0);
        let err = read_pack(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidPack(_)));
    }

    #[test]
    fn test_oversized_dimensions_rejected_before_allocating() {
        // One level claiming 65535x65535 cells with an empty payload.
        let mut data = vec![1, 0, 0, 0];
        data.extend_from_slice(&[0u8; NAME_FIELD_LEN]);
        data.extend_from_slice(&u16::MAX.to_le_bytes()); // width
        data.extend_from_slice(&u16::MAX.to_le_bytes()); // height
        data.extend_from_slice(&0u16.to_le_bytes()); // chest count
        data.extend_from_slice(&0u16.to_le_bytes()); // tileset selector

        let err = read_pack(&data).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn test_count_must_match_levels() {
        let mut data = encode_pack(&sample_levels());
        data[0] = 3; // claim one more level than the stream holds
        let err = read_pack(&data).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn test_name_padding_stripped() {
        let levels = sample_levels();
        let decoded = read_pack(&encode_pack(&levels)).unwrap();
        assert_eq!(decoded[0].meta.name, "Hall");
        assert_eq!(decoded[1].meta.name, "Vault");
    }
}
