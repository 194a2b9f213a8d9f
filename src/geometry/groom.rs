//! Procedural groom generation.
//!
//! Builds a flat rectangular scalp patch in the XZ plane with one strand
//! per grid cell. Strands hang along -Y and curl gently toward +X, so the
//! rest pose has real curvature for the shape constraints to hold.

use glam::{Quat, Vec3};
use rand::prelude::*;

use super::asset::{LoadError, RootTriangle};
use super::StrandModel;
use crate::config::GroomParameters;

impl StrandModel {
    /// Generate a groom from parameters
    pub fn generate_groom(params: &GroomParameters) -> Result<Self, LoadError> {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let strand_count = params.strands_x * params.strands_z;
        let vertices_per_strand = params.segments_per_strand + 1;

        let half_x = (params.strands_x.saturating_sub(1)) as f32 * params.root_spacing * 0.5;
        let half_z = (params.strands_z.saturating_sub(1)) as f32 * params.root_spacing * 0.5;
        let jitter = params.root_jitter * params.root_spacing;
        let bend = Quat::from_rotation_z(params.curl_per_segment);

        let mut positions = Vec::with_capacity(strand_count * vertices_per_strand);
        for iz in 0..params.strands_z {
            for ix in 0..params.strands_x {
                let mut root = Vec3::new(
                    ix as f32 * params.root_spacing - half_x,
                    0.0,
                    iz as f32 * params.root_spacing - half_z,
                );
                if jitter > 0.0 {
                    root.x += rng.gen_range(-jitter..=jitter);
                    root.z += rng.gen_range(-jitter..=jitter);
                }

                let mut position = root;
                let mut direction = Vec3::NEG_Y;
                positions.push(position);
                for _ in 0..params.segments_per_strand {
                    position += direction * params.segment_length;
                    positions.push(position);
                    direction = (bend * direction).normalize();
                }
            }
        }

        let triangles = grid_triangles(params.strands_x, params.strands_z);

        Self::from_rest_pose(
            strand_count,
            params.segments_per_strand,
            positions,
            triangles,
        )
    }
}

/// Two triangles per grid cell, indexing strands row-major
fn grid_triangles(strands_x: usize, strands_z: usize) -> Vec<RootTriangle> {
    let mut triangles = Vec::new();
    if strands_x < 2 || strands_z < 2 {
        return triangles;
    }

    let index = |ix: usize, iz: usize| (iz * strands_x + ix) as u32;
    for iz in 0..strands_z - 1 {
        for ix in 0..strands_x - 1 {
            let a = index(ix, iz);
            let b = index(ix + 1, iz);
            let c = index(ix, iz + 1);
            let d = index(ix + 1, iz + 1);
            triangles.push(RootTriangle::new([a, c, b]));
            triangles.push(RootTriangle::new([b, c, d]));
        }
    }
    triangles
}
