//! Immutable strand model shared by simulation instances.

use std::ops::Range;
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

use super::asset::{self, LoadError, RawAsset, RootTriangle};
use super::frames::StrandFrames;

/// Segments shorter than this cannot define a frame and are rejected at load
pub const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// A rest-pose vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StrandVertex {
    /// Rest position
    pub position: [f32; 3],
    /// 0 for pinned roots, 1 for free vertices
    pub inv_mass: f32,
}

impl StrandVertex {
    pub fn new(position: Vec3, is_root: bool) -> Self {
        Self {
            position: position.to_array(),
            inv_mass: if is_root { 0.0 } else { 1.0 },
        }
    }

    pub fn position_vec3(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn is_root(&self) -> bool {
        self.inv_mass == 0.0
    }
}

/// Rest pose of a set of equal-length strands plus its precomputed frames.
///
/// Vertex `j` of strand `i` lives at flat index `i * V + j`, where
/// `V = segments_per_strand + 1`. Vertex 0 of every strand is the root.
#[derive(Debug, Clone)]
pub struct StrandModel {
    strand_count: usize,
    segments_per_strand: usize,
    rest_vertices: Vec<StrandVertex>,
    frames: StrandFrames,
    triangles: Vec<RootTriangle>,
}

impl StrandModel {
    /// Load an asset file and precompute its frames
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let raw = asset::load_asset(path.as_ref())?;
        let model = Self::from_raw(raw)?;

        log::info!(
            "Loaded hair model {:?}: {} strands x {} segments, {} root triangles",
            path.as_ref(),
            model.strand_count,
            model.segments_per_strand,
            model.triangles.len()
        );

        Ok(model)
    }

    /// Build from a decoded asset
    pub fn from_raw(raw: RawAsset) -> Result<Self, LoadError> {
        Self::from_rest_pose(
            raw.strand_count,
            raw.segments_per_strand,
            raw.positions,
            raw.triangles,
        )
    }

    /// Build from strand-major rest positions.
    ///
    /// Fails if the position count does not match the declared topology or
    /// if any segment is too short to carry a frame.
    pub fn from_rest_pose(
        strand_count: usize,
        segments_per_strand: usize,
        positions: Vec<Vec3>,
        triangles: Vec<RootTriangle>,
    ) -> Result<Self, LoadError> {
        if segments_per_strand == 0 {
            return Err(LoadError::InvalidHeader(
                "strands need at least one segment".to_string(),
            ));
        }

        let vertices_per_strand = segments_per_strand + 1;
        let expected = strand_count
            .checked_mul(vertices_per_strand)
            .ok_or_else(|| LoadError::InvalidHeader("vertex count overflows".to_string()))?;
        if positions.len() != expected {
            return Err(LoadError::Truncated {
                what: "position",
                expected,
                found: positions.len(),
            });
        }

        validate_segments(&positions, vertices_per_strand)?;
        validate_triangles(&triangles, strand_count)?;

        let frames = StrandFrames::compute(&positions, vertices_per_strand);
        let rest_vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| StrandVertex::new(p, i % vertices_per_strand == 0))
            .collect();

        Ok(Self {
            strand_count,
            segments_per_strand,
            rest_vertices,
            frames,
            triangles,
        })
    }

    pub fn strand_count(&self) -> usize {
        self.strand_count
    }

    pub fn segments_per_strand(&self) -> usize {
        self.segments_per_strand
    }

    pub fn vertices_per_strand(&self) -> usize {
        self.segments_per_strand + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.rest_vertices.len()
    }

    /// Flat index range covering one strand
    pub fn strand_range(&self, strand: usize) -> Range<usize> {
        let v = self.vertices_per_strand();
        strand * v..(strand + 1) * v
    }

    pub fn rest_vertices(&self) -> &[StrandVertex] {
        &self.rest_vertices
    }

    pub fn rest_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.rest_vertices.iter().map(StrandVertex::position_vec3)
    }

    pub fn rest_lengths(&self) -> &[f32] {
        &self.frames.rest_lengths
    }

    pub fn reference_directions(&self) -> &[Vec3] {
        &self.frames.reference_directions
    }

    pub fn global_rotations(&self) -> &[Quat] {
        &self.frames.global_rotations
    }

    pub fn frames(&self) -> &StrandFrames {
        &self.frames
    }

    pub fn triangles(&self) -> &[RootTriangle] {
        &self.triangles
    }
}

/// Root triangles index strands, not vertices
fn validate_triangles(triangles: &[RootTriangle], strand_count: usize) -> Result<(), LoadError> {
    for (triangle, record) in triangles.iter().enumerate() {
        if let Some(&index) = record.indices.iter().find(|&&i| i as usize >= strand_count) {
            return Err(LoadError::TriangleIndexOutOfRange {
                triangle,
                index,
                strand_count,
            });
        }
    }
    Ok(())
}

fn validate_segments(positions: &[Vec3], vertices_per_strand: usize) -> Result<(), LoadError> {
    for (strand, vertices) in positions.chunks_exact(vertices_per_strand).enumerate() {
        for (vertex, pair) in vertices.windows(2).enumerate() {
            let length = pair[0].distance(pair[1]);
            // Also catches NaN coordinates
            if !(length >= MIN_SEGMENT_LENGTH) || !length.is_finite() {
                return Err(LoadError::DegenerateSegment {
                    strand,
                    vertex,
                    length,
                });
            }
        }
    }
    Ok(())
}
