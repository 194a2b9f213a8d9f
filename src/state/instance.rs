//! Per-instance dynamic state.

use std::sync::Arc;

use glam::Vec3;

use crate::config::HairConfig;
use crate::geometry::StrandModel;

/// One simulated hair object.
///
/// Owns its position buffers and configuration. The model is shared
/// read-only with any other instance created from it.
#[derive(Debug, Clone)]
pub struct StrandInstance {
    pub(crate) model: Arc<StrandModel>,
    pub(crate) frame: u64,
    pub(crate) positions: Vec<Vec3>,
    pub(crate) previous_positions: Vec<Vec3>,
    pub(crate) config: HairConfig,
    /// Accumulated simulated time (s)
    pub(crate) simulation_time_sec: f64,
    /// Step size used by the last `simulate` call (s)
    pub(crate) last_time_step_sec: f32,
}

impl StrandInstance {
    /// Create an instance at rest with the default configuration
    pub fn new(model: Arc<StrandModel>) -> Self {
        Self::with_config(model, HairConfig::default())
    }

    /// Create an instance at rest with the given configuration
    pub fn with_config(model: Arc<StrandModel>, config: HairConfig) -> Self {
        let positions: Vec<Vec3> = model.rest_positions().collect();
        let previous_positions = positions.clone();

        log::debug!(
            "Created strand instance: {} strands, {} vertices",
            model.strand_count(),
            positions.len()
        );

        Self {
            model,
            frame: 0,
            positions,
            previous_positions,
            config,
            simulation_time_sec: 0.0,
            last_time_step_sec: 0.0,
        }
    }

    pub fn model(&self) -> &Arc<StrandModel> {
        &self.model
    }

    /// Number of completed simulation steps
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn previous_positions(&self) -> &[Vec3] {
        &self.previous_positions
    }

    /// Current positions of one strand
    pub fn strand_positions(&self, strand: usize) -> &[Vec3] {
        &self.positions[self.model.strand_range(strand)]
    }

    pub fn config(&self) -> &HairConfig {
        &self.config
    }

    /// Replace the configuration; used from the next step on
    pub fn set_config(&mut self, config: HairConfig) {
        self.config = config;
    }

    pub fn simulation_time_sec(&self) -> f64 {
        self.simulation_time_sec
    }

    pub fn last_time_step_sec(&self) -> f32 {
        self.last_time_step_sec
    }

    /// Put every vertex back on the rest pose and zero the frame counter
    pub fn reset(&mut self) {
        for (dst, src) in self.positions.iter_mut().zip(self.model.rest_positions()) {
            *dst = src;
        }
        self.previous_positions.copy_from_slice(&self.positions);
        self.frame = 0;
        self.simulation_time_sec = 0.0;
        self.last_time_step_sec = 0.0;
    }

    /// Overwrite the current and previous buffers, e.g. to restore a snapshot.
    ///
    /// Both slices must hold one entry per model vertex. Returns `false` and
    /// leaves the instance untouched if either length is wrong.
    pub fn set_positions(&mut self, positions: &[Vec3], previous_positions: &[Vec3]) -> bool {
        let expected = self.positions.len();
        if positions.len() != expected || previous_positions.len() != expected {
            log::warn!(
                "Ignoring position update: expected {} vertices, got {} current and {} previous",
                expected,
                positions.len(),
                previous_positions.len()
            );
            return false;
        }

        self.positions.copy_from_slice(positions);
        self.previous_positions.copy_from_slice(previous_positions);
        true
    }
}
