//! Per-step simulation metrics for diagnostics and export.

use serde::{Deserialize, Serialize};

use super::StrandInstance;

/// Snapshot of an instance's mechanical state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// Completed steps
    pub frame: u64,
    /// Simulated time (s)
    pub simulation_time_sec: f64,
    pub strand_count: usize,
    pub vertex_count: usize,
    /// Largest |length - rest length| over all segments
    pub max_length_error: f32,
    /// Mean |length - rest length| / rest length over all segments
    pub mean_relative_stretch: f32,
    /// Mean distance of strand tips from their rest positions
    pub mean_tip_displacement: f32,
    /// Largest per-vertex speed estimated from the last step (units/s)
    pub max_vertex_speed: f32,
    /// Sum of ½·v² over free vertices, unit mass
    pub kinetic_energy: f32,
}

impl SimulationMetrics {
    /// Measure an instance
    pub fn measure(instance: &StrandInstance) -> Self {
        let model = instance.model();
        let positions = instance.positions();
        let previous = instance.previous_positions();
        let rest_lengths = model.rest_lengths();
        let vertices_per_strand = model.vertices_per_strand();

        let mut max_length_error = 0.0f32;
        let mut stretch_sum = 0.0f32;
        let mut segment_count = 0usize;
        let mut tip_sum = 0.0f32;

        for strand in 0..model.strand_count() {
            let range = model.strand_range(strand);
            for j in range.start..range.end - 1 {
                let rest = rest_lengths[j];
                let error = (positions[j].distance(positions[j + 1]) - rest).abs();
                max_length_error = max_length_error.max(error);
                stretch_sum += error / rest;
                segment_count += 1;
            }

            let tip = range.end - 1;
            let rest_tip = model.rest_vertices()[tip].position_vec3();
            let rest_tip = instance.config().model_matrix.transform_point3(rest_tip);
            tip_sum += positions[tip].distance(rest_tip);
        }

        let dt = instance.last_time_step_sec();
        let mut max_vertex_speed = 0.0f32;
        let mut kinetic_energy = 0.0f32;
        if dt > 0.0 {
            for (i, (p, q)) in positions.iter().zip(previous).enumerate() {
                if i % vertices_per_strand == 0 {
                    continue;
                }
                let speed = p.distance(*q) / dt;
                max_vertex_speed = max_vertex_speed.max(speed);
                kinetic_energy += 0.5 * speed * speed;
            }
        }

        Self {
            frame: instance.frame(),
            simulation_time_sec: instance.simulation_time_sec(),
            strand_count: model.strand_count(),
            vertex_count: model.vertex_count(),
            max_length_error,
            mean_relative_stretch: if segment_count > 0 {
                stretch_sum / segment_count as f32
            } else {
                0.0
            },
            mean_tip_displacement: if model.strand_count() > 0 {
                tip_sum / model.strand_count() as f32
            } else {
                0.0
            },
            max_vertex_speed,
            kinetic_energy,
        }
    }
}
