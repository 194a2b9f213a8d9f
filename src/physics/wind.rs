//! Procedural wind approximation.
//!
//! A single uniform force makes every strand sway in lockstep. Instead the
//! wind vector is spread into four samples on a cone around its direction,
//! and each strand blends those samples with its own weight. The caller
//! modulates the wind strength over time (see [`gust_scale`]) before the
//! cone is built.

use glam::{Quat, Vec3};

/// Rotations smaller than this (radians) are skipped
const ALIGN_ANGLE_EPSILON: f32 = 0.001;

/// Winds weaker than this produce no force
const MIN_WIND_MAGNITUDE: f32 = 1e-6;

/// Number of distinct per-strand blend weights
const STRAND_WEIGHT_PERIOD: usize = 20;

/// Side axes the X axis is tilted around, in corner order
const CONE_SIDE_AXES: [Vec3; 4] = [Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];

/// Four wind samples arranged on a cone around the wind direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindCone {
    pub corners: [Vec3; 4],
}

impl WindCone {
    /// No wind
    pub const CALM: Self = Self {
        corners: [Vec3::ZERO; 4],
    };

    /// Build the cone for a wind vector with the given half-angle (radians)
    pub fn new(wind: Vec3, half_angle_rad: f32) -> Self {
        Self {
            corners: calculate_wind_vecs(wind, half_angle_rad),
        }
    }

    pub fn is_calm(&self) -> bool {
        self.corners.iter().all(|c| *c == Vec3::ZERO)
    }

    /// Wind acting on one strand.
    ///
    /// Strands cycle through 20 blend weights, mixing the ±Y and ±Z corner
    /// pairs so neighbouring strands get slightly different directions.
    pub fn sample(&self, strand_index: usize) -> Vec3 {
        let a = (strand_index % STRAND_WEIGHT_PERIOD) as f32 / STRAND_WEIGHT_PERIOD as f32;
        let [c0, c1, c2, c3] = self.corners;
        (c0 * a + c1 * (1.0 - a) + c2 * a + c3 * (1.0 - a)) * 0.5
    }
}

/// Rotation carrying +X onto the unit vector `dir`
fn rotation_from_x(dir: Vec3) -> Quat {
    let axis = Vec3::X.cross(dir);
    // Same as asin(|axis|) for winds facing +X, but also covers the back half
    let angle = axis.length().atan2(Vec3::X.dot(dir));

    if angle <= ALIGN_ANGLE_EPSILON {
        return Quat::IDENTITY;
    }
    match axis.try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, angle),
        // Pointing straight down -X
        None => Quat::from_axis_angle(Vec3::Y, angle),
    }
}

/// Four corner vectors of the turbulence cone around `wind`.
///
/// Corner `k` is +X tilted by `half_angle_rad` around the k-th side axis
/// (+Y, -Y, +Z, -Z), rotated onto the wind direction and scaled by the
/// wind magnitude.
pub fn calculate_wind_vecs(wind: Vec3, half_angle_rad: f32) -> [Vec3; 4] {
    let magnitude = wind.length();
    if !(magnitude > MIN_WIND_MAGNITUDE) {
        return [Vec3::ZERO; 4];
    }

    let to_wind = rotation_from_x(wind / magnitude);
    CONE_SIDE_AXES.map(|side| {
        let tilt = Quat::from_axis_angle(side, half_angle_rad);
        to_wind * (tilt * Vec3::X) * magnitude
    })
}

/// Multiplier applied to the wind strength on a given frame.
///
/// `1 + amplitude * sin²(frame * time_step * frequency)`, a smooth gust
/// that never drops below the base strength.
pub fn gust_scale(frame: u64, time_step_sec: f32, frequency_rad_per_sec: f32, amplitude: f32) -> f32 {
    let phase = (frame as f64 * time_step_sec as f64 * frequency_rad_per_sec as f64) as f32;
    let s = phase.sin();
    1.0 + amplitude * s * s
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_ANGLE: f32 = 20.0 * std::f32::consts::PI / 180.0;

    #[test]
    fn test_x_aligned_cone_is_symmetric() {
        let corners = calculate_wind_vecs(Vec3::new(3.0, 0.0, 0.0), HALF_ANGLE);

        for c in &corners {
            assert!((c.length() - 3.0).abs() < 1e-5);
            assert!((c.x - 3.0 * HALF_ANGLE.cos()).abs() < 1e-5);
        }
        // Tilts around ±Y swing the vector in Z, tilts around ±Z swing it in Y
        assert!((corners[0].z + corners[1].z).abs() < 1e-6);
        assert!(corners[0].z.abs() > 0.1);
        assert!((corners[2].y + corners[3].y).abs() < 1e-6);
        assert!(corners[2].y.abs() > 0.1);
    }

    #[test]
    fn test_cone_follows_wind_direction() {
        let wind = Vec3::new(0.0, 0.0, -2.0);
        let corners = calculate_wind_vecs(wind, HALF_ANGLE);
        let dir = wind.normalize();

        for c in &corners {
            assert!((c.length() - 2.0).abs() < 1e-4);
            let cos = c.normalize().dot(dir);
            assert!((cos - HALF_ANGLE.cos()).abs() < 1e-4, "cos {}", cos);
        }
    }

    #[test]
    fn test_backward_wind_points_backward() {
        let corners = calculate_wind_vecs(Vec3::new(-1.0, 0.0, 0.0), HALF_ANGLE);
        for c in &corners {
            assert!(c.x < 0.0);
        }
    }

    #[test]
    fn test_zero_wind_is_calm() {
        let cone = WindCone::new(Vec3::ZERO, HALF_ANGLE);
        assert!(cone.is_calm());
        assert_eq!(cone.sample(7), Vec3::ZERO);
    }

    #[test]
    fn test_sample_keeps_wind_axis() {
        let cone = WindCone::new(Vec3::new(4.0, 0.0, 0.0), HALF_ANGLE);
        for strand in 0..40 {
            let w = cone.sample(strand);
            assert!((w.x - 4.0 * HALF_ANGLE.cos()).abs() < 1e-4);
        }
        assert_eq!(cone.sample(3), cone.sample(23));
    }

    #[test]
    fn test_gust_scale_range() {
        for frame in 0..500 {
            let s = gust_scale(frame, 1.0 / 60.0, 20.0, 0.01);
            assert!((1.0..=1.01 + 1e-6).contains(&s));
        }
        assert_eq!(gust_scale(0, 1.0 / 60.0, 20.0, 0.01), 1.0);
    }
}
