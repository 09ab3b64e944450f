//! Reading and writing the chunked binary container of `.vox` files.
//!
//! A file is the 4-byte magic [`MAGIC`], a little-endian `u32` version, and a single
//! [`MAIN`] chunk whose children are [`SIZE`], [`XYZI`], and [`RGBA`]. Every chunk is
//!
//! ```text
//! [id: 4 bytes][content length: u32][children length: u32][content][children]
//! ```
//!
//! The format's vertical axis is Z, so Y and Z are swapped on the way out.

use crate::math::{GridBox, GridPoint, GridSize, Rgba8};

/// Four-character chunk identifier.
pub type ChunkId = [u8; 4];

/// Magic number at the start of every file.
pub const MAGIC: [u8; 4] = *b"VOX ";
/// File format version written.
pub const VERSION: u32 = 150;
/// Largest model size, in voxels, along any axis.
pub const MAX_DIMENSION: u32 = 256;

/// Root chunk.
pub const MAIN: ChunkId = *b"MAIN";
/// Model dimensions chunk.
pub const SIZE: ChunkId = *b"SIZE";
/// Voxel list chunk.
pub const XYZI: ChunkId = *b"XYZI";
/// Palette chunk.
pub const RGBA: ChunkId = *b"RGBA";

/// Length of a chunk header.
pub const CHUNK_HEADER_LEN: usize = 12;
/// Length of the file header preceding the [`MAIN`] chunk.
pub const FILE_HEADER_LEN: usize = 8;

/// Errors in writing or reading chunk data.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ChunkError {
    /// Model is larger than [`MAX_DIMENSION`] along some axis.
    #[error("model size {0:?} exceeds the format limit of 256")]
    SizeTooLarge(GridSize),

    /// A length does not fit in the 32-bit length field.
    #[error("chunk length {0} does not fit in 32 bits")]
    LengthOverflow(usize),

    /// The data does not start with [`MAGIC`].
    #[error("not a .vox file (magic is {0:?})")]
    BadMagic([u8; 4]),

    /// The data ended in the middle of a header or chunk.
    #[error("data truncated at byte {offset}; needed {needed} more bytes")]
    Truncated {
        /// Position at which the missing data should have been.
        offset: usize,
        /// How many more bytes were needed.
        needed: usize,
    },

    /// A chunk other than the expected one was found.
    #[error("expected chunk {expected:?} at byte {offset}, found {found:?}")]
    UnexpectedChunk {
        #[allow(missing_docs)]
        expected: String,
        #[allow(missing_docs)]
        found: String,
        #[allow(missing_docs)]
        offset: usize,
    },

    /// A length field disagrees with the data.
    #[error("chunk {id:?} declares {declared} bytes but {actual} were found")]
    LengthMismatch {
        #[allow(missing_docs)]
        id: String,
        #[allow(missing_docs)]
        declared: usize,
        #[allow(missing_docs)]
        actual: usize,
    },
}

/// The serialized file and what was left out of it.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WrittenVox {
    /// Complete file contents.
    pub bytes: Vec<u8>,
    /// Number of voxels in the [`XYZI`] chunk.
    pub voxels_written: usize,
    /// Number of voxels omitted because they were outside the model bounds or the
    /// format's coordinate range.
    pub dropped_out_of_range: usize,
    /// Number of voxels omitted because their palette index was 0, which the format
    /// treats as empty space.
    pub dropped_transparent: usize,
}

/// Serializes a model.
///
/// * `bounds` determines the [`SIZE`] chunk; voxel positions are made relative to its
///   minimum corner, and voxels which then fall outside it are dropped.
/// * `voxels` are positions with palette indices. Their order is preserved.
/// * `palette` is written as is, except that entry 0 is always zeroed.
pub fn write_vox(
    bounds: GridBox,
    voxels: impl IntoIterator<Item = (GridPoint, u8)>,
    palette: &[Rgba8; 256],
) -> Result<WrittenVox, ChunkError> {
    let size = bounds.size();
    if size.width > MAX_DIMENSION || size.height > MAX_DIMENSION || size.depth > MAX_DIMENSION {
        return Err(ChunkError::SizeTooLarge(size));
    }
    let min = bounds.min();

    let mut voxel_bytes: Vec<u8> = Vec::new();
    let mut dropped_out_of_range = 0;
    let mut dropped_transparent = 0;
    let local = |coordinate: i32, origin: i32, extent: u32| -> Option<u8> {
        let offset = i64::from(coordinate) - i64::from(origin);
        if offset < i64::from(extent) {
            u8::try_from(offset).ok()
        } else {
            None
        }
    };
    for (position, index) in voxels {
        let (Some(x), Some(y), Some(z)) = (
            local(position.x, min.x, size.width),
            local(position.y, min.y, size.height),
            local(position.z, min.z, size.depth),
        ) else {
            dropped_out_of_range += 1;
            continue;
        };
        if index == 0 {
            dropped_transparent += 1;
            continue;
        }
        voxel_bytes.extend_from_slice(&[x, z, y, index]);
    }
    let voxels_written = voxel_bytes.len() / 4;

    let mut children = Vec::with_capacity(
        3 * CHUNK_HEADER_LEN + 12 + 4 + voxel_bytes.len() + 256 * 4,
    );

    let mut size_content = Vec::with_capacity(12);
    for dimension in [size.width, size.depth, size.height] {
        size_content.extend_from_slice(&dimension.to_le_bytes());
    }
    write_chunk(&mut children, SIZE, &size_content, &[])?;

    let mut xyzi_content = Vec::with_capacity(4 + voxel_bytes.len());
    xyzi_content.extend_from_slice(&len32(voxels_written)?.to_le_bytes());
    xyzi_content.extend_from_slice(&voxel_bytes);
    write_chunk(&mut children, XYZI, &xyzi_content, &[])?;

    let mut rgba_content = Vec::with_capacity(256 * 4);
    rgba_content.extend_from_slice(&[0; 4]);
    for &Rgba8 { r, g, b, a } in &palette[1..] {
        rgba_content.extend_from_slice(&[b, g, r, a]);
    }
    write_chunk(&mut children, RGBA, &rgba_content, &[])?;

    let mut bytes = Vec::with_capacity(FILE_HEADER_LEN + CHUNK_HEADER_LEN + children.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    write_chunk(&mut bytes, MAIN, &[], &children)?;

    Ok(WrittenVox {
        bytes,
        voxels_written,
        dropped_out_of_range,
        dropped_transparent,
    })
}

fn len32(len: usize) -> Result<u32, ChunkError> {
    u32::try_from(len).map_err(|_| ChunkError::LengthOverflow(len))
}

fn write_chunk(
    out: &mut Vec<u8>,
    id: ChunkId,
    content: &[u8],
    children: &[u8],
) -> Result<(), ChunkError> {
    out.extend_from_slice(&id);
    out.extend_from_slice(&len32(content.len())?.to_le_bytes());
    out.extend_from_slice(&len32(children.len())?.to_le_bytes());
    out.extend_from_slice(content);
    out.extend_from_slice(children);
    Ok(())
}

// -------------------------------------------------------------------------------------------------

/// The fixed-size header of a chunk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct ChunkHeader {
    #[allow(missing_docs)]
    pub id: ChunkId,
    /// Length of the chunk's own content.
    pub content_len: u32,
    /// Total length of the chunk's children.
    pub children_len: u32,
}

impl ChunkHeader {
    /// Reads the header at `offset` in `bytes`.
    pub fn read(bytes: &[u8], offset: usize) -> Result<Self, ChunkError> {
        let header = take(bytes, offset, CHUNK_HEADER_LEN)?;
        let word =
            |i: usize| u32::from_le_bytes([header[i], header[i + 1], header[i + 2], header[i + 3]]);
        Ok(Self {
            id: [header[0], header[1], header[2], header[3]],
            content_len: word(4),
            children_len: word(8),
        })
    }

    /// Length of the whole chunk, including header and children.
    pub fn total_len(&self) -> usize {
        CHUNK_HEADER_LEN + self.content_len as usize + self.children_len as usize
    }
}

/// Checks the file header and returns the version number.
pub fn parse_header(bytes: &[u8]) -> Result<u32, ChunkError> {
    let header = take(bytes, 0, FILE_HEADER_LEN)?;
    let magic = [header[0], header[1], header[2], header[3]];
    if magic != MAGIC {
        return Err(ChunkError::BadMagic(magic));
    }
    Ok(u32::from_le_bytes([header[4], header[5], header[6], header[7]]))
}

/// Summary of a file checked by [`verify()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct VoxSummary {
    /// Version from the file header.
    pub version: u32,
    /// Dimensions as stored, in the file's axis order (X, Z, Y of the model).
    pub size: [u32; 3],
    /// Number of voxels in the [`XYZI`] chunk.
    pub voxel_count: u32,
}

/// Checks that `bytes` has exactly the structure [`write_vox()`] produces, with all
/// length fields consistent.
pub fn verify(bytes: &[u8]) -> Result<VoxSummary, ChunkError> {
    let version = parse_header(bytes)?;

    let main = expect_chunk(bytes, FILE_HEADER_LEN, MAIN)?;
    let children_start = FILE_HEADER_LEN + CHUNK_HEADER_LEN + main.content_len as usize;
    let actual_children = bytes.len().saturating_sub(children_start);
    if main.children_len as usize != actual_children {
        return Err(ChunkError::LengthMismatch {
            id: display_id(MAIN),
            declared: main.children_len as usize,
            actual: actual_children,
        });
    }

    let mut offset = children_start;
    let size_header = expect_chunk(bytes, offset, SIZE)?;
    let size_content = take(bytes, offset + CHUNK_HEADER_LEN, 12)?;
    let size: [u32; 3] = core::array::from_fn(|i| {
        u32::from_le_bytes([
            size_content[4 * i],
            size_content[4 * i + 1],
            size_content[4 * i + 2],
            size_content[4 * i + 3],
        ])
    });
    offset += size_header.total_len();

    let xyzi_header = expect_chunk(bytes, offset, XYZI)?;
    let count_bytes = take(bytes, offset + CHUNK_HEADER_LEN, 4)?;
    let voxel_count =
        u32::from_le_bytes([count_bytes[0], count_bytes[1], count_bytes[2], count_bytes[3]]);
    let expected_len = 4 + 4 * voxel_count as usize;
    if xyzi_header.content_len as usize != expected_len {
        return Err(ChunkError::LengthMismatch {
            id: display_id(XYZI),
            declared: xyzi_header.content_len as usize,
            actual: expected_len,
        });
    }
    offset += xyzi_header.total_len();

    let rgba_header = expect_chunk(bytes, offset, RGBA)?;
    if rgba_header.content_len != 256 * 4 {
        return Err(ChunkError::LengthMismatch {
            id: display_id(RGBA),
            declared: rgba_header.content_len as usize,
            actual: 256 * 4,
        });
    }
    offset += rgba_header.total_len();

    if offset != bytes.len() {
        return Err(ChunkError::LengthMismatch {
            id: display_id(MAIN),
            declared: offset,
            actual: bytes.len(),
        });
    }

    Ok(VoxSummary {
        version,
        size,
        voxel_count,
    })
}

fn expect_chunk(bytes: &[u8], offset: usize, expected: ChunkId) -> Result<ChunkHeader, ChunkError> {
    let header = ChunkHeader::read(bytes, offset)?;
    if header.id != expected {
        return Err(ChunkError::UnexpectedChunk {
            expected: display_id(expected),
            found: display_id(header.id),
            offset,
        });
    }
    take(bytes, offset, header.total_len())?;
    Ok(header)
}

fn take(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], ChunkError> {
    bytes
        .get(offset..)
        .and_then(|rest| rest.get(..len))
        .ok_or(ChunkError::Truncated {
            offset,
            needed: (offset + len).saturating_sub(bytes.len()),
        })
}

fn display_id(id: ChunkId) -> String {
    String::from_utf8_lossy(&id).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NO_VOXELS: [(GridPoint, u8); 0] = [];

    fn palette_with(entries: &[(usize, Rgba8)]) -> [Rgba8; 256] {
        let mut palette = [Rgba8::TRANSPARENT; 256];
        for &(index, color) in entries {
            palette[index] = color;
        }
        palette
    }

    fn word_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn single_voxel_layout() {
        let written = write_vox(
            GridBox::single_cell([0, 0, 0]),
            [(GridPoint::new(0, 0, 0), 1)],
            &palette_with(&[(1, Rgba8::new(0x11, 0x22, 0x33, 0xff))]),
        )
        .unwrap();
        let bytes = &written.bytes;

        assert_eq!(&bytes[0..4], b"VOX ");
        assert_eq!(word_at(bytes, 4), 150);
        assert_eq!(&bytes[8..12], b"MAIN");
        assert_eq!(word_at(bytes, 12), 0);
        let size_len = 12 + 12;
        let xyzi_len = 12 + 4 + 4;
        let rgba_len = 12 + 1024;
        assert_eq!(word_at(bytes, 16) as usize, size_len + xyzi_len + rgba_len);
        assert_eq!(bytes.len(), 20 + size_len + xyzi_len + rgba_len);

        // SIZE
        assert_eq!(&bytes[20..24], b"SIZE");
        assert_eq!(word_at(bytes, 24), 12);
        assert_eq!(word_at(bytes, 28), 0);
        assert_eq!([word_at(bytes, 32), word_at(bytes, 36), word_at(bytes, 40)], [1, 1, 1]);

        // XYZI
        assert_eq!(&bytes[44..48], b"XYZI");
        assert_eq!(word_at(bytes, 48), 8);
        assert_eq!(word_at(bytes, 56), 1);
        assert_eq!(&bytes[60..64], &[0, 0, 0, 1]);

        // RGBA, entry 0 zero and entry 1 in B, G, R, A order
        assert_eq!(&bytes[64..68], b"RGBA");
        assert_eq!(word_at(bytes, 68), 1024);
        assert_eq!(&bytes[76..80], &[0, 0, 0, 0]);
        assert_eq!(&bytes[80..84], &[0x33, 0x22, 0x11, 0xff]);

        assert_eq!(written.voxels_written, 1);
        assert_eq!(
            verify(bytes).unwrap(),
            VoxSummary {
                version: 150,
                size: [1, 1, 1],
                voxel_count: 1
            }
        );
    }

    #[test]
    fn axes_swapped_and_translated() {
        let bounds = GridBox::from_min_max([10, 20, 30], [12, 23, 34]).unwrap();
        let written = write_vox(
            bounds,
            [(GridPoint::new(11, 22, 33), 7)],
            &palette_with(&[(7, Rgba8::new(1, 1, 1, 255))]),
        )
        .unwrap();
        let summary = verify(&written.bytes).unwrap();
        // x = 3, y = 4, z = 5 is stored as x, z, y
        assert_eq!(summary.size, [3, 5, 4]);
        assert_eq!(&written.bytes[60..64], &[1, 3, 2, 7]);
    }

    #[test]
    fn out_of_range_dropped() {
        let bounds = GridBox::from_min_max([0, 0, 0], [9, 9, 9]).unwrap();
        let voxels = [
            (GridPoint::new(0, 0, 0), 1),
            (GridPoint::new(300, 0, 0), 1),
            (GridPoint::new(-1, 0, 0), 1),
            (GridPoint::new(10, 0, 0), 1),
            (GridPoint::new(9, 9, 9), 1),
        ];
        let written = write_vox(bounds, voxels, &[Rgba8::new(9, 9, 9, 255); 256]).unwrap();
        assert_eq!(written.voxels_written, 2);
        assert_eq!(written.dropped_out_of_range, 3);
        assert_eq!(verify(&written.bytes).unwrap().voxel_count, 2);
        // Entry 0 is zeroed even though the input had a color there.
        assert_eq!(&written.bytes[80..84], &[0, 0, 0, 0]);
    }

    #[test]
    fn transparent_index_dropped() {
        let written = write_vox(
            GridBox::single_cell([0, 0, 0]),
            [(GridPoint::new(0, 0, 0), 0)],
            &[Rgba8::TRANSPARENT; 256],
        )
        .unwrap();
        assert_eq!(written.voxels_written, 0);
        assert_eq!(written.dropped_transparent, 1);
        assert_eq!(verify(&written.bytes).unwrap().voxel_count, 0);
    }

    #[test]
    fn too_large() {
        let bounds = GridBox::from_min_max([0, 0, 0], [256, 0, 0]).unwrap();
        assert!(matches!(
            write_vox(bounds, NO_VOXELS, &[Rgba8::TRANSPARENT; 256]),
            Err(ChunkError::SizeTooLarge(_))
        ));
    }

    #[test]
    fn max_size_allowed() {
        let bounds = GridBox::from_min_max([0, 0, 0], [255, 255, 255]).unwrap();
        let written =
            write_vox(bounds, [(GridPoint::new(255, 255, 255), 3)], &[Rgba8::TRANSPARENT; 256])
                .unwrap();
        assert_eq!(verify(&written.bytes).unwrap().size, [256, 256, 256]);
        assert_eq!(written.voxels_written, 1);
    }

    #[test]
    fn verify_rejects_damage() {
        let written =
            write_vox(GridBox::single_cell([0, 0, 0]), NO_VOXELS, &[Rgba8::TRANSPARENT; 256]).unwrap();
        let mut bytes = written.bytes.clone();

        bytes[0] = b'X';
        assert_eq!(verify(&bytes), Err(ChunkError::BadMagic(*b"XOX ")));

        let truncated = &written.bytes[..written.bytes.len() - 1];
        assert!(matches!(
            verify(truncated),
            Err(ChunkError::Truncated { .. })
        ));

        let mut bad_xyzi = written.bytes.clone();
        bad_xyzi[56] = 5; // voxel count
        assert!(matches!(
            verify(&bad_xyzi),
            Err(ChunkError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn chunk_header_read() {
        let written =
            write_vox(GridBox::single_cell([0, 0, 0]), NO_VOXELS, &[Rgba8::TRANSPARENT; 256]).unwrap();
        let header = ChunkHeader::read(&written.bytes, FILE_HEADER_LEN).unwrap();
        assert_eq!(header.id, MAIN);
        assert_eq!(header.content_len, 0);
        assert_eq!(header.total_len(), written.bytes.len() - FILE_HEADER_LEN);
        assert!(matches!(
            ChunkHeader::read(&written.bytes, written.bytes.len() - 4),
            Err(ChunkError::Truncated { needed: 8, .. })
        ));
    }
}
