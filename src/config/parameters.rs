//! Parameter structures for the strand simulation.
//!
//! Everything here is plain data that can be loaded from JSON and
//! swapped between frames.

use std::path::Path;

use glam::{Mat4, Vec3, Vec4};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Standard gravity along -Y (m/s²)
pub const GRAVITY_M_PER_SEC2: f32 = 9.8;

/// Upper bound applied to the local shape stiffness before it is halved
pub const MAX_LOCAL_CONSTRAINT: f32 = 0.95;

/// Top-level parameters container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameters {
    /// Fixed solver tuning
    pub simulation: SimulationParameters,
    /// Per-instance hair settings
    pub hair: HairConfig,
    /// Procedural groom used when no asset is given
    pub groom: GroomParameters,
}

impl Parameters {
    /// Load parameters from JSON files, or use defaults if files don't exist
    pub fn load_or_default() -> Self {
        Self::load_from_dir("data/parameters")
    }

    /// Load parameters from specific directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            simulation: load_json_or_default(dir.join("simulation.json"), "simulation"),
            hair: load_json_or_default(dir.join("hair.json"), "hair"),
            groom: load_json_or_default(dir.join("groom.json"), "groom"),
        }
    }
}

/// Read a JSON file into `T`, falling back to `T::default()` on any failure.
fn load_json_or_default<T, P>(path: P, label: &str) -> T
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    match std::fs::read_to_string(path.as_ref()) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(params) => {
                log::info!("Loaded {} parameters from {:?}", label, path.as_ref());
                params
            }
            Err(e) => {
                log::warn!("Failed to parse {} parameters: {}, using defaults", label, e);
                T::default()
            }
        },
        Err(_) => {
            log::info!("{} parameters file not found, using defaults", label);
            T::default()
        }
    }
}

/// Solver constants shared by every instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Gravity acceleration (m/s²)
    pub gravity: Vec3,
    /// Passes of the inextensibility projection per step
    pub length_iterations: u32,
    /// Passes of the local shape projection per step
    pub local_shape_iterations: u32,
    /// Step used when the caller does not supply one (s)
    pub default_time_step_sec: f32,
    /// Half-angle of the wind turbulence cone (degrees)
    pub wind_cone_half_angle_deg: f32,
    /// Angular frequency of the gust oscillation (rad/s)
    pub gust_frequency_rad_per_sec: f32,
    /// Relative strength of the gust oscillation
    pub gust_amplitude: f32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -GRAVITY_M_PER_SEC2, 0.0),
            length_iterations: 5,
            local_shape_iterations: 10,
            default_time_step_sec: 1.0 / 60.0,
            wind_cone_half_angle_deg: 20.0,
            gust_frequency_rad_per_sec: 20.0,
            gust_amplitude: 0.01,
        }
    }
}

/// Per-instance settings, replaced wholesale between frames.
///
/// Only the transform, wind, constraint and friction fields drive the
/// solver. The remaining fields belong to the renderer and are carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairConfig {
    pub render_hair: bool,
    pub render_strands: bool,
    pub render_root: bool,
    /// Model-to-world transform applied to the rest pose
    pub model_matrix: Mat4,
    /// Wind vector (direction and strength)
    pub wind: Vec3,
    /// Pull toward the world-space rest pose, per step
    pub global_constraint: f32,
    /// Pull toward the rest curvature, clamped to 0.95 and halved by the solver
    pub local_constraint: f32,
    /// Damping of the previous-frame displacement
    pub friction: f32,
    pub tessellation_factor: f32,
    pub root_width: f32,
    pub tip_width: f32,
    pub thinning_start: f32,
    pub density: f32,
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    pub specular_strength: f32,
    pub specular_power: f32,
    pub color: Vec4,
}

impl HairConfig {
    /// Local shape stiffness as the solver consumes it, in `[0, 0.475]`
    /// for non-negative input.
    pub fn effective_local_constraint(&self) -> f32 {
        self.local_constraint.min(MAX_LOCAL_CONSTRAINT) * 0.5
    }
}

impl Default for HairConfig {
    fn default() -> Self {
        Self {
            render_hair: true,
            render_strands: false,
            render_root: false,
            model_matrix: Mat4::IDENTITY,
            wind: Vec3::ZERO,
            global_constraint: 0.002,
            local_constraint: 0.01,
            friction: 0.05,
            tessellation_factor: 4.0,
            root_width: 0.002,
            tip_width: 0.0005,
            thinning_start: 0.5,
            density: 64.0,
            ambient_strength: 0.5,
            diffuse_strength: 0.5,
            specular_strength: 0.5,
            specular_power: 50.0,
            color: Vec4::new(0.95, 0.9, 0.625, 1.0),
        }
    }
}

/// Procedural groom: a rectangular scalp patch with hanging strands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroomParameters {
    /// Roots along X
    pub strands_x: usize,
    /// Roots along Z
    pub strands_z: usize,
    pub segments_per_strand: usize,
    /// Distance between neighbouring roots
    pub root_spacing: f32,
    /// Rest length of each segment
    pub segment_length: f32,
    /// Bend added per segment (radians)
    pub curl_per_segment: f32,
    /// Random root offset as a fraction of the spacing
    pub root_jitter: f32,
    /// Seed for the root jitter
    pub seed: u64,
}

impl Default for GroomParameters {
    fn default() -> Self {
        Self {
            strands_x: 16,
            strands_z: 16,
            segments_per_strand: 15,
            root_spacing: 0.02,
            segment_length: 0.02,
            curl_per_segment: 0.05,
            root_jitter: 0.25,
            seed: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_simulation_params() {
        let params = SimulationParameters::default();
        assert_eq!(params.length_iterations, 5);
        assert_eq!(params.local_shape_iterations, 10);
        assert!((params.gravity.y + 9.8).abs() < 1e-6);
        assert!((params.default_time_step_sec - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_local_constraint_clamped_then_halved() {
        let mut config = HairConfig::default();
        config.local_constraint = 0.5;
        assert!((config.effective_local_constraint() - 0.25).abs() < 1e-6);

        config.local_constraint = 3.0;
        assert!((config.effective_local_constraint() - 0.475).abs() < 1e-6);
    }

    #[test]
    fn test_serialization() {
        let mut params = Parameters::default();
        params.hair.wind = Vec3::new(2.0, 0.0, 1.0);
        params.hair.model_matrix = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));

        let json = serde_json::to_string_pretty(&params).unwrap();
        let parsed: Parameters = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.hair, params.hair);
        assert_eq!(parsed.groom.strands_x, params.groom.strands_x);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: HairConfig = serde_json::from_str(r#"{ "friction": 0.2 }"#).unwrap();
        assert!((parsed.friction - 0.2).abs() < 1e-6);
        assert_eq!(parsed.model_matrix, Mat4::IDENTITY);
        assert!(parsed.render_hair);
    }

    #[test]
    fn test_missing_dir_falls_back_to_defaults() {
        let params = Parameters::load_from_dir("does/not/exist");
        assert_eq!(params.simulation.length_iterations, 5);
        assert_eq!(params.hair, HairConfig::default());
    }
}
