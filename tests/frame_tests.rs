//! Rest-pose frame precomputation on generated and hand-built strands.

use std::sync::Arc;

use glam::{Quat, Vec3};
use strand_simulator::{
    config::{GroomParameters, HairConfig, SimulationParameters},
    geometry::{StrandFrames, StrandModel},
    physics::StrandSolver,
    state::StrandInstance,
};

const EPS: f32 = 1e-4;

fn curly_groom() -> StrandModel {
    let params = GroomParameters {
        strands_x: 3,
        strands_z: 3,
        segments_per_strand: 12,
        curl_per_segment: 0.3,
        ..Default::default()
    };
    StrandModel::generate_groom(&params).unwrap()
}

#[test]
fn test_precompute_is_idempotent() {
    let model = curly_groom();
    let positions: Vec<Vec3> = model.rest_positions().collect();
    let vps = model.vertices_per_strand();

    let first = StrandFrames::compute(&positions, vps);
    let second = StrandFrames::compute(&positions, vps);

    assert_eq!(first, second);
    assert_eq!(&first, model.frames());
}

#[test]
fn test_reference_directions_are_unit() {
    let model = curly_groom();
    for (i, dir) in model.reference_directions().iter().enumerate() {
        if i % model.vertices_per_strand() == 0 {
            continue;
        }
        assert!((dir.length() - 1.0).abs() < EPS, "vertex {}: |{}|", i, dir);
    }
}

#[test]
fn test_root_frame_aligns_x_with_first_segment() {
    let model = curly_groom();
    let rest: Vec<Vec3> = model.rest_positions().collect();

    for strand in 0..model.strand_count() {
        let root = model.strand_range(strand).start;
        let tangent = (rest[root + 1] - rest[root]).normalize();
        let x_axis = model.global_rotations()[root] * Vec3::X;
        assert!((x_axis - tangent).length() < EPS, "strand {}", strand);
    }
}

#[test]
fn test_frame_chain_reconstructs_rest_pose() {
    let model = curly_groom();
    let rest: Vec<Vec3> = model.rest_positions().collect();
    let rotations = model.global_rotations();
    let directions = model.reference_directions();
    let lengths = model.rest_lengths();

    for strand in 0..model.strand_count() {
        let range = model.strand_range(strand);
        let mut point = rest[range.start];
        for j in range.start + 1..range.end {
            point += rotations[j - 1] * directions[j] * lengths[j - 1];
            assert!((point - rest[j]).length() < EPS, "vertex {} drifted", j);
        }
    }
}

#[test]
fn test_rigid_rotation_keeps_local_shape() {
    let model = curly_groom();
    let vps = model.vertices_per_strand();
    let rotation = Quat::from_rotation_z(0.3);
    let rotated: Vec<Vec3> = model.rest_positions().map(|p| rotation * p).collect();

    let frames = StrandFrames::compute(&rotated, vps);

    for (a, b) in frames.rest_lengths.iter().zip(model.rest_lengths()) {
        assert!((a - b).abs() < EPS);
    }
    // The x component of a reference direction is the cosine of the bend at
    // its parent vertex
    for strand in 0..model.strand_count() {
        let range = model.strand_range(strand);
        for j in range.start + 1..range.end {
            let cos_bend = frames.reference_directions[j].x;
            assert!((cos_bend - model.reference_directions()[j].x).abs() < EPS, "vertex {}", j);
        }
    }
}

#[test]
fn test_rest_pose_is_equilibrium_without_forces() {
    let model = Arc::new(curly_groom());
    let params = SimulationParameters {
        gravity: Vec3::ZERO,
        ..Default::default()
    };
    let solver = StrandSolver::new(params);
    let config = HairConfig {
        local_constraint: 0.8,
        global_constraint: 0.1,
        ..Default::default()
    };
    let mut instance = StrandInstance::with_config(Arc::clone(&model), config);

    for _ in 0..20 {
        solver.simulate(&mut instance, 1.0 / 60.0);
    }

    for (p, rest) in instance.positions().iter().zip(model.rest_positions()) {
        assert!((*p - rest).length() < EPS, "{} vs {}", p, rest);
    }
}

#[test]
fn test_nearly_straight_strand_holds_rest_pose() {
    let params = SimulationParameters {
        gravity: Vec3::ZERO,
        ..Default::default()
    };
    let solver = StrandSolver::new(params);
    let config = HairConfig {
        local_constraint: 0.95,
        global_constraint: 0.0,
        ..Default::default()
    };

    // Bends below the swing threshold are folded into the reference
    // directions; rebuilding the frames must skip them the same way
    for curl in [0.0008, 0.0015] {
        let groom = GroomParameters {
            strands_x: 1,
            strands_z: 1,
            segments_per_strand: 30,
            segment_length: 0.05,
            curl_per_segment: curl,
            ..Default::default()
        };
        let model = Arc::new(StrandModel::generate_groom(&groom).unwrap());
        let mut instance = StrandInstance::with_config(Arc::clone(&model), config.clone());

        for _ in 0..300 {
            solver.simulate(&mut instance, 1.0 / 60.0);
        }

        let tip = model.vertex_count() - 1;
        let rest_tip = model.rest_vertices()[tip].position_vec3();
        let drift = instance.positions()[tip].distance(rest_tip);
        assert!(drift < 1e-4, "curl {}: tip drifted {}", curl, drift);
    }
}
