//! Positional constraints applied after integration.
//!
//! All functions operate on one strand's slice of the flat buffers. The
//! root (inverse mass 0) is never moved.

use glam::{Mat4, Quat, Vec3};

use crate::geometry::frames::swing_from_x;
use crate::geometry::StrandVertex;

/// Segments shorter than this are left alone by the projections
const MIN_CURRENT_LENGTH: f32 = 1e-8;

/// Enforce the rest length of every segment, `iterations` times.
///
/// Each pair is corrected by inverse-mass weights: two free vertices share
/// the correction equally, a root-adjacent segment moves only the child.
/// The last pass moves only the child of every pair, so all segments leave
/// this stage at their exact rest length and slack is not left to creep
/// toward the tip over many frames.
pub fn apply_length_constraints(
    positions: &mut [Vec3],
    rest: &[StrandVertex],
    rest_lengths: &[f32],
    iterations: u32,
) {
    for iteration in 0..iterations {
        project_lengths(positions, rest, rest_lengths, iteration + 1 == iterations);
    }
}

/// One sweep from root to tip
fn project_lengths(positions: &mut [Vec3], rest: &[StrandVertex], rest_lengths: &[f32], child_only: bool) {
    for j in 0..positions.len().saturating_sub(1) {
        let w0 = if child_only { 0.0 } else { rest[j].inv_mass };
        let w1 = rest[j + 1].inv_mass;
        let w_sum = w0 + w1;
        if w_sum <= 0.0 {
            continue;
        }

        let delta = positions[j + 1] - positions[j];
        let length = delta.length();
        if length < MIN_CURRENT_LENGTH {
            continue;
        }

        let correction = delta * ((length - rest_lengths[j]) / (length * w_sum));
        positions[j] += correction * w0;
        positions[j + 1] -= correction * w1;
    }
}

/// Pull each vertex toward the position its reference direction implies.
///
/// The frame of vertex `j - 1` is rebuilt from current positions as the
/// pass walks down the strand, starting from `root_rotation` (the model
/// rotation composed with the rest root frame). Frames are chained with the
/// same swing rule the rest frames were precomputed with, so small bends
/// skipped at precompute time are skipped here too. Vertex `j` then moves the
/// fraction `stiffness` of the way to
/// `p[j-1] + R[j-1] * reference_directions[j] * rest_lengths[j-1]`.
pub fn apply_local_shape_constraints(
    positions: &mut [Vec3],
    rest_lengths: &[f32],
    reference_directions: &[Vec3],
    root_rotation: Quat,
    stiffness: f32,
    iterations: u32,
) {
    if stiffness <= 0.0 {
        return;
    }

    for _ in 0..iterations {
        let mut frame = root_rotation;
        for j in 1..positions.len() {
            let target = positions[j - 1] + frame * (reference_directions[j] * rest_lengths[j - 1]);
            positions[j] += (target - positions[j]) * stiffness;

            if let Some(direction) = (positions[j] - positions[j - 1]).try_normalize() {
                let local = frame.inverse() * direction;
                frame = (frame * swing_from_x(local)).normalize();
            }
        }
    }
}

/// Blend free vertices toward the transformed rest pose
pub fn apply_global_shape_constraint(
    positions: &mut [Vec3],
    rest: &[StrandVertex],
    model_matrix: &Mat4,
    stiffness: f32,
) {
    if stiffness == 0.0 {
        return;
    }

    for (pos, vertex) in positions.iter_mut().zip(rest) {
        if vertex.is_root() {
            continue;
        }
        let target = model_matrix.transform_point3(vertex.position_vec3());
        *pos += (target - *pos) * stiffness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::frames::compute_rotations;

    fn strand(points: &[Vec3]) -> Vec<StrandVertex> {
        points
            .iter()
            .enumerate()
            .map(|(j, &p)| StrandVertex::new(p, j == 0))
            .collect()
    }

    #[test]
    fn test_length_constraint_root_segment_moves_child_only() {
        let rest = strand(&[Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)]);
        let mut positions = vec![Vec3::ZERO, Vec3::new(0.0, -3.0, 0.0)];

        apply_length_constraints(&mut positions, &rest, &[1.0, 0.0], 1);

        assert_eq!(positions[0], Vec3::ZERO);
        assert!((positions[1] - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_length_constraint_free_pair_is_symmetric() {
        let rest = strand(&[Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, -2.0, 0.0)]);
        let mut positions = vec![Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, -3.0, 0.0)];

        project_lengths(&mut positions, &rest, &[1.0, 1.0, 0.0], false);

        // Segment 0 already satisfied; segment 1 splits its 1.0 excess
        assert!((positions[1].y + 1.5).abs() < 1e-6);
        assert!((positions[2].y + 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_final_pass_moves_child_only() {
        let rest = strand(&[Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, -2.0, 0.0)]);
        let mut positions = vec![Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, -3.0, 0.0)];

        apply_length_constraints(&mut positions, &rest, &[1.0, 1.0, 0.0], 1);

        assert!((positions[1].y + 1.0).abs() < 1e-6);
        assert!((positions[2].y + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_length_constraint_converges() {
        let points: Vec<Vec3> = (0..8).map(|j| Vec3::new(0.0, -(j as f32), 0.0)).collect();
        let rest = strand(&points);
        let lengths = vec![1.0; 8];
        let mut positions: Vec<Vec3> = points
            .iter()
            .enumerate()
            .map(|(j, p)| *p + Vec3::new(0.05 * j as f32, -0.02 * j as f32, 0.0))
            .collect();

        apply_length_constraints(&mut positions, &rest, &lengths, 5);

        for j in 0..7 {
            let d = positions[j].distance(positions[j + 1]);
            assert!((d - 1.0).abs() < 1e-4, "segment {} length {}", j, d);
        }
    }

    #[test]
    fn test_local_shape_rest_is_fixed_point() {
        let points = vec![
            Vec3::ZERO,
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.4, -1.9, 0.0),
            Vec3::new(1.0, -2.5, 0.2),
        ];
        let (rotations, directions) = compute_rotations(&points, 4);
        let lengths: Vec<f32> = points.windows(2).map(|w| w[0].distance(w[1])).chain([0.0]).collect();
        let mut positions = points.clone();

        apply_local_shape_constraints(&mut positions, &lengths, &directions, rotations[0], 0.4, 10);

        for (p, q) in positions.iter().zip(&points) {
            assert!((*p - *q).length() < 1e-4, "{:?} drifted from {:?}", p, q);
        }
    }

    #[test]
    fn test_local_shape_restores_bend() {
        let points = vec![
            Vec3::ZERO,
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.7, -1.7, 0.0),
        ];
        let (rotations, directions) = compute_rotations(&points, 3);
        let lengths = vec![1.0, points[1].distance(points[2]), 0.0];

        // Straightened tip
        let mut positions = vec![points[0], points[1], Vec3::new(0.0, -2.0, 0.0)];
        let before = positions[2].distance(points[2]);

        apply_local_shape_constraints(&mut positions, &lengths, &directions, rotations[0], 0.3, 10);

        let after = positions[2].distance(points[2]);
        assert!(after < before * 0.5, "tip moved from {} to {}", before, after);
    }

    #[test]
    fn test_local_shape_zero_stiffness_is_noop() {
        let points = vec![Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)];
        let (rotations, directions) = compute_rotations(&points, 2);
        let mut positions = vec![Vec3::ZERO, Vec3::new(0.5, -0.5, 0.0)];
        let before = positions.clone();

        apply_local_shape_constraints(&mut positions, &[1.0, 0.0], &directions, rotations[0], 0.0, 10);

        assert_eq!(positions, before);
    }

    #[test]
    fn test_global_shape_blend() {
        let rest = strand(&[Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)]);
        let mut positions = vec![Vec3::new(9.0, 9.0, 9.0), Vec3::new(1.0, -1.0, 0.0)];

        apply_global_shape_constraint(&mut positions, &rest, &Mat4::IDENTITY, 0.25);

        assert_eq!(positions[0], Vec3::new(9.0, 9.0, 9.0), "Roots are untouched");
        assert!((positions[1].x - 0.75).abs() < 1e-6);
    }
}
