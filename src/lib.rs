//! Strand Simulator - position-based hair strand dynamics
//!
//! Loads rest-pose strand assets, precomputes per-vertex orientation
//! frames, and advances per-instance position buffers under gravity,
//! friction, wind and shape-preserving constraints. Drawing is left to an
//! external renderer behind [`render::StrandRenderer`].

pub mod config;
pub mod export;
pub mod geometry;
pub mod physics;
pub mod render;
pub mod state;
pub mod system;

pub use config::{GroomParameters, HairConfig, Parameters, SimulationParameters};
pub use geometry::{LoadError, RootTriangle, StrandModel, StrandVertex};
pub use physics::{calculate_wind_vecs, StrandSolver, WindCone};
pub use render::{RenderFrame, StrandRenderer};
pub use state::{SimulationMetrics, StrandInstance};
pub use system::{HairSimulationSystem, DEFAULT_TIME_STEP_SEC};
