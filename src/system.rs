//! Entry points for hosts embedding the simulation.
//!
//! Mirrors the lifecycle a renderer-driven application needs: load a
//! model, create instances from it, push settings, step, draw.

use std::path::Path;
use std::sync::Arc;

use glam::Mat4;

use crate::config::{HairConfig, SimulationParameters};
use crate::geometry::{LoadError, StrandModel};
use crate::physics::StrandSolver;
use crate::render::{RenderFrame, StrandRenderer};
use crate::state::StrandInstance;

/// Default simulation step (s)
pub const DEFAULT_TIME_STEP_SEC: f32 = 1.0 / 60.0;

/// Owns the solver and an optional renderer
#[derive(Default)]
pub struct HairSimulationSystem {
    solver: StrandSolver,
    renderer: Option<Box<dyn StrandRenderer + Send + Sync>>,
}

impl HairSimulationSystem {
    pub fn new(params: SimulationParameters) -> Self {
        Self {
            solver: StrandSolver::new(params),
            renderer: None,
        }
    }

    /// Attach the renderer used by [`Self::render_hair`]
    pub fn with_renderer<R>(mut self, renderer: R) -> Self
    where
        R: StrandRenderer + Send + Sync + 'static,
    {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn solver(&self) -> &StrandSolver {
        &self.solver
    }

    /// Load and precompute a model. No partial model is returned on error.
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<Arc<StrandModel>, LoadError> {
        StrandModel::load(path).map(Arc::new)
    }

    /// Release the caller's handle; the data lives on while instances hold it
    pub fn destroy_model(&self, model: Arc<StrandModel>) {
        let remaining = Arc::strong_count(&model) - 1;
        if remaining > 0 {
            log::warn!(
                "Model released while {} instance(s) still reference it",
                remaining
            );
        }
        drop(model);
    }

    pub fn create_instance(&self, model: &Arc<StrandModel>) -> StrandInstance {
        let instance = StrandInstance::new(Arc::clone(model));
        log::info!(
            "Created hair instance ({} strands, {} vertices)",
            model.strand_count(),
            model.vertex_count()
        );
        instance
    }

    pub fn update_instance_settings(&self, instance: &mut StrandInstance, config: HairConfig) {
        instance.set_config(config);
    }

    pub fn destroy_instance(&self, instance: StrandInstance) {
        drop(instance);
    }

    /// Advance by one frame of `time_step_sec`
    pub fn simulate_hair(&self, instance: &mut StrandInstance, time_step_sec: f32) {
        self.solver.simulate(instance, time_step_sec);
    }

    /// Advance by one frame of [`DEFAULT_TIME_STEP_SEC`]
    pub fn simulate_hair_default(&self, instance: &mut StrandInstance) {
        self.simulate_hair(instance, DEFAULT_TIME_STEP_SEC);
    }

    /// Hand the instance to the attached renderer, if any
    pub fn render_hair(&self, instance: &StrandInstance, view: Mat4, projection: Mat4) {
        if let Some(renderer) = &self.renderer {
            renderer.render(&RenderFrame::new(instance, view, projection));
        }
    }
}
