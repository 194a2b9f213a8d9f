//! Binary hair asset reader and writer.
//!
//! Layout (little-endian, read sequentially):
//!
//! ```text
//! i32 strand_count
//! i32 segments_per_strand
//! i32 triangle_count
//! strand_count * (segments_per_strand + 1) * [f32; 3]   rest positions
//! triangle_count * [i32; 3]                              root triangles
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use thiserror::Error;

use super::StrandModel;

/// Largest capacity reserved up front from an untrusted header.
const MAX_PREALLOCATED_RECORDS: usize = 1 << 20;

/// Errors raised while loading a hair asset
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open hair asset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while reading hair asset: {0}")]
    Io(#[from] io::Error),

    #[error("invalid hair asset header: {0}")]
    InvalidHeader(String),

    #[error("truncated hair asset: expected {expected} {what} records, found {found}")]
    Truncated {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("triangle {triangle} has negative index {index}")]
    NegativeTriangleIndex { triangle: usize, index: i32 },

    #[error("triangle {triangle} references strand {index}, but the asset has {strand_count} strands")]
    TriangleIndexOutOfRange {
        triangle: usize,
        index: u32,
        strand_count: usize,
    },

    #[error("degenerate segment in strand {strand} starting at vertex {vertex} (length {length})")]
    DegenerateSegment {
        strand: usize,
        vertex: usize,
        length: f32,
    },
}

/// Root triangle record, padded to four slots for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct RootTriangle {
    pub indices: [u32; 3],
    _padding: u32,
}

impl RootTriangle {
    pub fn new(indices: [u32; 3]) -> Self {
        Self {
            indices,
            _padding: 0,
        }
    }
}

/// Decoded asset payload before frame precomputation
#[derive(Debug, Clone)]
pub struct RawAsset {
    pub strand_count: usize,
    pub segments_per_strand: usize,
    /// Strand-major rest positions
    pub positions: Vec<Vec3>,
    pub triangles: Vec<RootTriangle>,
}

impl RawAsset {
    pub fn vertices_per_strand(&self) -> usize {
        self.segments_per_strand + 1
    }
}

/// Open and decode an asset file
pub fn load_asset<P: AsRef<Path>>(path: P) -> Result<RawAsset, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_asset(BufReader::new(file))
}

/// Decode an asset from any byte stream
pub fn read_asset<R: Read>(mut reader: R) -> Result<RawAsset, LoadError> {
    let mut header = [0u8; 12];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            LoadError::InvalidHeader("file is shorter than the 12-byte header".to_string())
        }
        _ => LoadError::Io(e),
    })?;

    let strand_count = header_count(&header[0..4], "strand count")?;
    let segments_per_strand = header_count(&header[4..8], "segments per strand")?;
    let triangle_count = header_count(&header[8..12], "triangle count")?;

    if segments_per_strand == 0 {
        return Err(LoadError::InvalidHeader(
            "strands need at least one segment".to_string(),
        ));
    }

    let vertex_count = strand_count
        .checked_mul(segments_per_strand + 1)
        .ok_or_else(|| LoadError::InvalidHeader("vertex count overflows".to_string()))?;

    let mut positions = Vec::with_capacity(vertex_count.min(MAX_PREALLOCATED_RECORDS));
    let mut record = [0u8; 12];
    for found in 0..vertex_count {
        read_record(&mut reader, &mut record, "position", vertex_count, found)?;
        let [x, y, z] = decode_f32x3(&record);
        positions.push(Vec3::new(x, y, z));
    }

    let mut triangles = Vec::with_capacity(triangle_count.min(MAX_PREALLOCATED_RECORDS));
    for found in 0..triangle_count {
        read_record(&mut reader, &mut record, "triangle", triangle_count, found)?;
        let raw = decode_i32x3(&record);
        let mut indices = [0u32; 3];
        for (slot, &index) in indices.iter_mut().zip(raw.iter()) {
            *slot = u32::try_from(index).map_err(|_| LoadError::NegativeTriangleIndex {
                triangle: found,
                index,
            })?;
        }
        triangles.push(RootTriangle::new(indices));
    }

    Ok(RawAsset {
        strand_count,
        segments_per_strand,
        positions,
        triangles,
    })
}

/// Write a model's rest pose and root triangles to a file
pub fn save_asset<P: AsRef<Path>>(path: P, model: &StrandModel) -> io::Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_asset(&mut writer, model)?;
    writer.flush()
}

/// Encode a model's rest pose and root triangles
pub fn write_asset<W: Write>(writer: &mut W, model: &StrandModel) -> io::Result<()> {
    write_count(writer, model.strand_count())?;
    write_count(writer, model.segments_per_strand())?;
    write_count(writer, model.triangles().len())?;

    for vertex in model.rest_vertices() {
        for component in vertex.position {
            writer.write_all(&component.to_le_bytes())?;
        }
    }

    for triangle in model.triangles() {
        for index in triangle.indices {
            let index = i32::try_from(index)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "triangle index exceeds i32"))?;
            writer.write_all(&index.to_le_bytes())?;
        }
    }

    Ok(())
}

fn header_count(bytes: &[u8], field: &str) -> Result<usize, LoadError> {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    let value = i32::from_le_bytes(raw);
    usize::try_from(value)
        .map_err(|_| LoadError::InvalidHeader(format!("{} is negative ({})", field, value)))
}

fn write_count<W: Write>(writer: &mut W, count: usize) -> io::Result<()> {
    let count = i32::try_from(count)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "count exceeds i32"))?;
    writer.write_all(&count.to_le_bytes())
}

fn read_record<R: Read>(
    reader: &mut R,
    record: &mut [u8; 12],
    what: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), LoadError> {
    reader.read_exact(record).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => LoadError::Truncated {
            what,
            expected,
            found,
        },
        _ => LoadError::Io(e),
    })
}

fn decode_f32x3(record: &[u8; 12]) -> [f32; 3] {
    let mut out = [0.0f32; 3];
    for (value, chunk) in out.iter_mut().zip(record.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    out
}

fn decode_i32x3(record: &[u8; 12]) -> [i32; 3] {
    let mut out = [0i32; 3];
    for (value, chunk) in out.iter_mut().zip(record.chunks_exact(4)) {
        *value = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(header: [i32; 3], positions: &[[f32; 3]], triangles: &[[i32; 3]]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for value in header {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        for p in positions {
            for c in p {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        for t in triangles {
            for i in t {
                bytes.extend_from_slice(&i.to_le_bytes());
            }
        }
        bytes
    }

    #[test]
    fn test_read_single_strand() {
        let bytes = encode(
            [1, 2, 1],
            &[[0.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, -2.0, 0.0]],
            &[[0, 0, 0]],
        );
        let asset = read_asset(bytes.as_slice()).unwrap();

        assert_eq!(asset.strand_count, 1);
        assert_eq!(asset.segments_per_strand, 2);
        assert_eq!(asset.vertices_per_strand(), 3);
        assert_eq!(asset.positions[2], Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(asset.triangles, vec![RootTriangle::new([0, 0, 0])]);
    }

    #[test]
    fn test_truncated_positions() {
        // Declares 2 strands but only carries one strand of records
        let bytes = encode(
            [2, 1, 0],
            &[[0.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
            &[],
        );
        match read_asset(bytes.as_slice()) {
            Err(LoadError::Truncated { what, expected, found }) => {
                assert_eq!(what, "position");
                assert_eq!(expected, 4);
                assert_eq!(found, 2);
            }
            other => panic!("expected truncation error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_triangles() {
        let bytes = encode([1, 1, 3], &[[0.0, 0.0, 0.0], [0.0, -1.0, 0.0]], &[[0, 0, 0]]);
        assert!(matches!(
            read_asset(bytes.as_slice()),
            Err(LoadError::Truncated { what: "triangle", expected: 3, found: 1 })
        ));
    }

    #[test]
    fn test_short_header() {
        let bytes = 5i32.to_le_bytes();
        assert!(matches!(
            read_asset(&bytes[..]),
            Err(LoadError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_negative_counts_rejected() {
        let bytes = encode([-1, 2, 0], &[], &[]);
        assert!(matches!(
            read_asset(bytes.as_slice()),
            Err(LoadError::InvalidHeader(_))
        ));

        let bytes = encode([1, 0, 0], &[[0.0, 0.0, 0.0]], &[]);
        assert!(matches!(
            read_asset(bytes.as_slice()),
            Err(LoadError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_negative_triangle_index() {
        let bytes = encode([1, 1, 1], &[[0.0, 0.0, 0.0], [0.0, -1.0, 0.0]], &[[0, -4, 0]]);
        assert!(matches!(
            read_asset(bytes.as_slice()),
            Err(LoadError::NegativeTriangleIndex { triangle: 0, index: -4 })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_asset("no/such/asset.hgl").unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(err.to_string().contains("no/such/asset.hgl"));
    }
}
