//! Rest-pose frame precomputation.
//!
//! Each strand gets a chain of parent-relative frames:
//! - the root frame is built from the first segment, with X along the
//!   tangent and Z/Y completed from a fixed world axis
//! - every later vertex stores its rest tangent expressed in the parent's
//!   frame (the reference direction), and its cumulative orientation is the
//!   parent's orientation composed with the swing carrying X onto that
//!   tangent
//!
//! The solver's local shape constraint rebuilds the same chain from
//! current positions and pulls each vertex back toward its reference
//! direction.

use glam::{Mat3, Quat, Vec3};

/// Below this length the first cross product is considered degenerate
const ROOT_AXIS_EPSILON: f32 = 1e-4;

/// Swings smaller than this angle (radians) are treated as identity
const SWING_ANGLE_EPSILON: f32 = 0.001;

/// Swing axes with a smaller squared length are treated as identity
const SWING_AXIS_EPSILON_SQ: f32 = 0.001;

/// Precomputed per-vertex data, parallel to the rest positions
#[derive(Debug, Clone, PartialEq)]
pub struct StrandFrames {
    /// Length of the segment leaving each vertex (0 for tips)
    pub rest_lengths: Vec<f32>,
    /// Rest tangent in the parent's frame (unused for roots)
    pub reference_directions: Vec<Vec3>,
    /// Cumulative orientation of each vertex
    pub global_rotations: Vec<Quat>,
}

impl StrandFrames {
    /// Run both precomputation passes over strand-major positions
    pub fn compute(positions: &[Vec3], vertices_per_strand: usize) -> Self {
        let rest_lengths = compute_rest_lengths(positions, vertices_per_strand);
        let (global_rotations, reference_directions) =
            compute_rotations(positions, vertices_per_strand);

        Self {
            rest_lengths,
            reference_directions,
            global_rotations,
        }
    }
}

/// Segment lengths, stored at the index of the segment's first vertex
pub fn compute_rest_lengths(positions: &[Vec3], vertices_per_strand: usize) -> Vec<f32> {
    let mut lengths = vec![0.0; positions.len()];
    if vertices_per_strand < 2 {
        return lengths;
    }

    for (strand, out) in positions
        .chunks_exact(vertices_per_strand)
        .zip(lengths.chunks_exact_mut(vertices_per_strand))
    {
        for (length, pair) in out.iter_mut().zip(strand.windows(2)) {
            *length = pair[0].distance(pair[1]);
        }
    }

    lengths
}

/// Orientation of a root whose first segment points along `tangent`
pub fn root_frame(tangent: Vec3) -> Quat {
    let x_axis = tangent.normalize();
    let mut z_axis = x_axis.cross(Vec3::X);
    if z_axis.length() < ROOT_AXIS_EPSILON {
        z_axis = x_axis.cross(Vec3::Y);
    }
    let z_axis = z_axis.normalize();
    let y_axis = z_axis.cross(x_axis);

    Quat::from_mat3(&Mat3::from_cols(x_axis, y_axis, z_axis)).normalize()
}

/// Rotation carrying the local X axis onto a unit `direction`
pub fn swing_from_x(direction: Vec3) -> Quat {
    let axis = Vec3::X.cross(direction);
    let angle = Vec3::X.dot(direction).clamp(-1.0, 1.0).acos();

    if angle.abs() > SWING_ANGLE_EPSILON && axis.length_squared() > SWING_AXIS_EPSILON_SQ {
        Quat::from_axis_angle(axis.normalize(), angle)
    } else {
        Quat::IDENTITY
    }
}

/// Cumulative orientations and reference directions for every vertex
pub fn compute_rotations(positions: &[Vec3], vertices_per_strand: usize) -> (Vec<Quat>, Vec<Vec3>) {
    let mut global_rotations = vec![Quat::IDENTITY; positions.len()];
    let mut reference_directions = vec![Vec3::ZERO; positions.len()];
    if vertices_per_strand < 2 {
        return (global_rotations, reference_directions);
    }

    for ((strand, rotations), directions) in positions
        .chunks_exact(vertices_per_strand)
        .zip(global_rotations.chunks_exact_mut(vertices_per_strand))
        .zip(reference_directions.chunks_exact_mut(vertices_per_strand))
    {
        rotations[0] = root_frame(strand[1] - strand[0]);

        for j in 1..vertices_per_strand {
            let tangent = strand[j] - strand[j - 1];
            let local_tangent = (rotations[j - 1].inverse() * tangent).normalize();

            directions[j] = local_tangent;
            rotations[j] = (rotations[j - 1] * swing_from_x(local_tangent)).normalize();
        }
    }

    (global_rotations, reference_directions)
}
