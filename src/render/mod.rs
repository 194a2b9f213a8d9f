//! Rendering boundary.
//!
//! Drawing the strands (tessellation, lighting, debug lines) lives outside
//! this crate. A renderer receives a read-only [`RenderFrame`] for an
//! instance plus the camera transforms, and the uniform blocks it needs
//! are provided here in GPU layout.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::config::HairConfig;
use crate::geometry::RootTriangle;
use crate::state::StrandInstance;

/// Anything that can draw a simulated instance
pub trait StrandRenderer {
    fn render(&self, frame: &RenderFrame<'_>);
}

/// Read-only view of an instance for one draw
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub positions: &'a [Vec3],
    pub triangles: &'a [RootTriangle],
    pub segments_per_strand: usize,
    pub strand_count: usize,
    pub config: &'a HairConfig,
    pub view: Mat4,
    pub projection: Mat4,
}

impl<'a> RenderFrame<'a> {
    pub fn new(instance: &'a StrandInstance, view: Mat4, projection: Mat4) -> Self {
        let model = instance.model();
        Self {
            positions: instance.positions(),
            triangles: model.triangles(),
            segments_per_strand: model.segments_per_strand(),
            strand_count: model.strand_count(),
            config: instance.config(),
            view,
            projection,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Camera position recovered from the view transform
    pub fn eye_position(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    /// Cosmetic settings packed for upload
    pub fn hair_render_data(&self) -> HairRenderData {
        HairRenderData::new(self.config, self.segments_per_strand)
    }

    pub fn scene_render_data(&self) -> SceneRenderData {
        SceneRenderData {
            view_projection: self.view_projection().to_cols_array_2d(),
            eye_position: self.eye_position().extend(1.0).to_array(),
        }
    }

    /// Line-list vertices (two per segment) for a debug strand overlay
    pub fn segment_lines(&self) -> Vec<Vec3> {
        let vertices_per_strand = self.segments_per_strand + 1;
        self.positions
            .chunks_exact(vertices_per_strand)
            .flat_map(|strand| strand.windows(2).flat_map(|pair| [pair[0], pair[1]]))
            .collect()
    }
}

/// Hair uniform block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct HairRenderData {
    pub segments_count: i32,
    pub tessellation_factor: f32,
    pub density: f32,
    pub _padding0: f32,

    pub root_width: f32,
    pub tip_width: f32,
    pub thinning_start: f32,
    pub _padding1: f32,

    pub specular: f32,
    pub diffuse: f32,
    pub ambient: f32,
    pub specular_power: f32,
    pub color: [f32; 4],
}

impl HairRenderData {
    pub fn new(config: &HairConfig, segments_per_strand: usize) -> Self {
        Self {
            segments_count: segments_per_strand as i32,
            tessellation_factor: config.tessellation_factor,
            density: config.density,
            _padding0: 0.0,
            root_width: config.root_width,
            tip_width: config.tip_width,
            thinning_start: config.thinning_start,
            _padding1: 0.0,
            specular: config.specular_strength,
            diffuse: config.diffuse_strength,
            ambient: config.ambient_strength,
            specular_power: config.specular_power,
            color: config.color.to_array(),
        }
    }
}

/// Scene uniform block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneRenderData {
    pub view_projection: [[f32; 4]; 4],
    pub eye_position: [f32; 4],
}
