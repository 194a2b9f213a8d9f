//! Verlet time integration for strand vertices.
//!
//! Position Verlet with multiplicative damping:
//!
//! x(t + dt) = x(t) + (x(t) - x(t - dt)) * (1 - friction) + a * dt²
//!
//! Velocity is implicit in the previous-position buffer, which keeps the
//! scheme stable under the positional corrections applied afterwards.
//! Roots are not integrated; they are snapped to the transformed rest pose.

use glam::{Mat4, Vec3};

use crate::geometry::StrandVertex;

/// Advance one strand by one step.
///
/// `previous` receives the pre-integration positions. Root vertices are
/// placed at `model_matrix * rest` with no carried velocity.
pub fn integrate_strand(
    current: &mut [Vec3],
    previous: &mut [Vec3],
    rest: &[StrandVertex],
    model_matrix: &Mat4,
    acceleration: Vec3,
    friction: f32,
    dt: f32,
) {
    let accel_dt2 = acceleration * (dt * dt);
    let keep = 1.0 - friction;

    for ((pos, prev), vertex) in current.iter_mut().zip(previous.iter_mut()).zip(rest) {
        if vertex.is_root() {
            let pinned = model_matrix.transform_point3(vertex.position_vec3());
            *pos = pinned;
            *prev = pinned;
            continue;
        }

        let old = *pos;
        *pos = old + (old - *prev) * keep + accel_dt2;
        *prev = old;
    }
}

/// Add a displacement of `acceleration * dt²` to every free vertex
pub fn apply_acceleration(current: &mut [Vec3], rest: &[StrandVertex], acceleration: Vec3, dt: f32) {
    let delta = acceleration * (dt * dt);
    for (pos, vertex) in current.iter_mut().zip(rest) {
        if !vertex.is_root() {
            *pos += delta;
        }
    }
}
