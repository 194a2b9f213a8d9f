//! Strand dynamics.
//!
//! One step runs these stages, in order, for every strand:
//! 1. Verlet integration under gravity with multiplicative friction
//! 2. Wind, sampled per strand from a four-corner turbulence cone
//! 3. Length (inextensibility) projection
//! 4. Local shape projection toward the rest curvature
//! 5. Global shape blend toward the transformed rest pose
//!
//! Strands are independent, so they are processed in parallel. Each
//! strand runs all of its stages on its own slice of the buffers; no
//! strand ever reads another strand's vertices.

pub mod constraints;
pub mod integrator;
pub mod wind;

pub use constraints::{
    apply_global_shape_constraint, apply_length_constraints, apply_local_shape_constraints,
};
pub use integrator::{apply_acceleration, integrate_strand};
pub use wind::{calculate_wind_vecs, gust_scale, WindCone};

use glam::{Mat4, Quat, Vec3};
use rayon::prelude::*;

use crate::config::{HairConfig, SimulationParameters};
use crate::geometry::StrandModel;
use crate::state::StrandInstance;

/// Values shared by every strand during one step
#[derive(Debug, Clone)]
pub struct StepUniforms {
    pub time_step_sec: f32,
    pub gravity: Vec3,
    pub friction: f32,
    pub model_matrix: Mat4,
    /// Rotation part of `model_matrix`
    pub model_rotation: Quat,
    pub wind: WindCone,
    /// Already clamped and halved
    pub local_constraint: f32,
    pub global_constraint: f32,
    pub length_iterations: u32,
    pub local_shape_iterations: u32,
}

impl StepUniforms {
    /// Derive the uniforms for the step about to run on `frame`
    pub fn new(
        params: &SimulationParameters,
        config: &HairConfig,
        frame: u64,
        time_step_sec: f32,
    ) -> Self {
        let (_, model_rotation, _) = config.model_matrix.to_scale_rotation_translation();

        let gust = gust_scale(
            frame,
            params.default_time_step_sec,
            params.gust_frequency_rad_per_sec,
            params.gust_amplitude,
        );
        let wind = WindCone::new(
            config.wind * gust,
            params.wind_cone_half_angle_deg.to_radians(),
        );

        Self {
            time_step_sec,
            gravity: params.gravity,
            friction: config.friction,
            model_matrix: config.model_matrix,
            model_rotation,
            wind,
            local_constraint: config.effective_local_constraint(),
            global_constraint: config.global_constraint,
            length_iterations: params.length_iterations,
            local_shape_iterations: params.local_shape_iterations,
        }
    }
}

/// Advances strand instances
#[derive(Debug, Clone, Default)]
pub struct StrandSolver {
    pub params: SimulationParameters,
}

impl StrandSolver {
    pub fn new(params: SimulationParameters) -> Self {
        Self { params }
    }

    /// Step with the default time step
    pub fn step(&self, instance: &mut StrandInstance) {
        self.simulate(instance, self.params.default_time_step_sec);
    }

    /// Advance one instance by one frame of `time_step_sec`
    pub fn simulate(&self, instance: &mut StrandInstance, time_step_sec: f32) {
        let uniforms = StepUniforms::new(&self.params, &instance.config, instance.frame, time_step_sec);
        let model = &*instance.model;
        let vertices_per_strand = model.vertices_per_strand();

        instance
            .positions
            .par_chunks_mut(vertices_per_strand)
            .zip(instance.previous_positions.par_chunks_mut(vertices_per_strand))
            .enumerate()
            .for_each(|(strand, (current, previous))| {
                step_strand(model, strand, current, previous, &uniforms);
            });

        instance.frame = instance.frame.saturating_add(1);
        instance.simulation_time_sec += time_step_sec as f64;
        instance.last_time_step_sec = time_step_sec;

        log::debug!(
            "Simulated frame {} ({} strands, dt = {:.4} s)",
            instance.frame,
            model.strand_count(),
            time_step_sec
        );
    }
}

/// Run every stage on one strand
pub fn step_strand(
    model: &StrandModel,
    strand: usize,
    current: &mut [Vec3],
    previous: &mut [Vec3],
    uniforms: &StepUniforms,
) {
    let range = model.strand_range(strand);
    let rest = &model.rest_vertices()[range.clone()];
    let rest_lengths = &model.rest_lengths()[range.clone()];
    let reference_directions = &model.reference_directions()[range.clone()];
    let root_rotation = uniforms.model_rotation * model.global_rotations()[range.start];
    let dt = uniforms.time_step_sec;

    integrate_strand(
        current,
        previous,
        rest,
        &uniforms.model_matrix,
        uniforms.gravity,
        uniforms.friction,
        dt,
    );

    if !uniforms.wind.is_calm() {
        apply_acceleration(current, rest, uniforms.wind.sample(strand), dt);
    }

    apply_length_constraints(current, rest, rest_lengths, uniforms.length_iterations);

    apply_local_shape_constraints(
        current,
        rest_lengths,
        reference_directions,
        root_rotation,
        uniforms.local_constraint,
        uniforms.local_shape_iterations,
    );

    apply_global_shape_constraint(
        current,
        rest,
        &uniforms.model_matrix,
        uniforms.global_constraint,
    );
}
