//! `avar` version 1 segment maps as plain data.
//!
//! Both the instancer (dropping pinned axes) and the variable font builder
//! (emitting designspace maps) need to write `avar`; the table is small
//! enough to encode directly.

use read_fonts::{FontData, ReadError, types::F2Dot14};

/// `(from, to)` pairs of normalized coordinates for one axis.
pub type SegmentMap = Vec<(F2Dot14, F2Dot14)>;

/// Decode the segment maps of an `avar` table, one per axis.
///
/// Version 2 tables are accepted; only their version 1 part is returned.
pub fn decode_avar(data: &[u8]) -> Result<Vec<SegmentMap>, ReadError> {
    let data = FontData::new(data);
    let axis_count = data.read_at::<u16>(6)?;
    let mut offset = 8;
    let mut maps = Vec::with_capacity(axis_count as usize);
    for _ in 0..axis_count {
        let count = data.read_at::<u16>(offset)?;
        offset += 2;
        let mut map = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let from = data.read_at::<F2Dot14>(offset)?;
            let to = data.read_at::<F2Dot14>(offset + 2)?;
            map.push((from, to));
            offset += 4;
        }
        maps.push(map);
    }
    Ok(maps)
}

/// Encode segment maps as an `avar` version 1.0 table.
pub fn encode_avar(maps: &[SegmentMap]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(1u16.to_be_bytes());
    out.extend(0u16.to_be_bytes());
    out.extend(0u16.to_be_bytes());
    out.extend((maps.len() as u16).to_be_bytes());
    for map in maps {
        out.extend((map.len() as u16).to_be_bytes());
        for (from, to) in map {
            out.extend(from.to_bits().to_be_bytes());
            out.extend(to.to_bits().to_be_bytes());
        }
    }
    out
}

/// `true` when the map leaves every coordinate where it was.
pub fn is_identity(map: &SegmentMap) -> bool {
    map.iter().all(|(from, to)| from == to)
}

/// The identity map every non-empty `avar` axis entry must at least contain.
pub fn identity_map() -> SegmentMap {
    [-1.0, 0.0, 1.0].into_iter().map(|v| (F2Dot14::from_f32(v), F2Dot14::from_f32(v))).collect()
}
