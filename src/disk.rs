use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::field::BrightnessField;
use crate::integrator::BlackHole;

/// Disk lookup for one integration step.
#[derive(Clone, Copy, Debug)]
pub struct DiskSample {
    /// Planar distance from the hole in the disk plane.
    pub radial: f32,
    /// Swirl-adjusted polar angle.
    pub angle: f32,
    /// Coordinate handed to the brightness field.
    pub uv: Vec2,
    pub color: Vec3,
    pub intensity: f32,
}

impl DiskSample {
    pub fn emission(&self) -> Vec3 {
        self.color * self.intensity
    }
}

/// Maps ray positions to disk-local polar coordinates and looks up the
/// brightness field there.
#[derive(Clone, Copy, Debug)]
pub struct AccretionDisk {
    pub horizon_radius: f32,
}

impl AccretionDisk {
    pub const OUTER_COLOR: Vec3 = Vec3::new(1.0, 0.0, 1.0);
    pub const INNER_COLOR: Vec3 = Vec3::new(0.5, 0.0, 0.5);
    pub const COORD_SCALE: Vec2 = Vec2::new(30.0, 50.0);
    pub const LOOKUP_SCALE: Vec2 = Vec2::new(0.1, 0.5);
    pub const SWIRL_RATE: f32 = 0.005;
    pub const FLOOR_BIAS: f32 = 0.05;

    pub fn new(black_hole: &BlackHole) -> Self {
        Self { horizon_radius: black_hole.radius }
    }

    /// Polar coordinates of `to_center` in the XZ plane, with the angle
    /// sheared by radius and advanced by time. Outer rings get a larger
    /// angular factor than inner ones.
    pub fn swirl(&self, to_center: Vec3, time: f32) -> (f32, f32) {
        let radial = Vec2::new(to_center.x, to_center.z).length();
        let polar = to_center.x.atan2(to_center.z);
        let angle = polar * (0.01 + (radial - self.horizon_radius) * 0.002) + 2.0 * PI + time * Self::SWIRL_RATE;
        (radial, angle)
    }

    pub fn sample<F: BrightnessField + ?Sized>(&self, to_center: Vec3, time: f32, field: &F) -> DiskSample {
        let (radial, angle) = self.swirl(to_center, time);
        let uv = Vec2::new(radial, angle) * Self::COORD_SCALE * Self::LOOKUP_SCALE;

        let surface = to_center.length() - self.horizon_radius;
        // The blend weight is unclamped; far from the hole it extrapolates
        // past the outer color.
        let color = Self::INNER_COLOR.lerp(Self::OUTER_COLOR, surface * surface);
        let brightness = (field.sample(uv) + Self::FLOOR_BIAS).max(0.0);
        let intensity = brightness * (4.0 / (0.001 + surface * 50.0));

        DiskSample { radial, angle, uv, color, intensity }
    }
}

impl Default for AccretionDisk {
    fn default() -> Self {
        Self::new(&BlackHole::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ConstantField, SinusoidalField};

    #[test]
    fn time_advances_swirl_linearly() {
        let disk = AccretionDisk::default();
        let v = Vec3::new(0.7, 0.01, -1.3);
        let (r0, a0) = disk.swirl(v, 0.0);
        let (r1, a1) = disk.swirl(v, 2000.0);
        assert_eq!(r0, r1);
        assert!((a1 - a0 - 10.0).abs() < 1e-4);
    }

    #[test]
    fn lookup_uses_net_scale() {
        let disk = AccretionDisk::default();
        let v = Vec3::new(0.0, 0.3, 2.0);
        let s = disk.sample(v, 0.0, &ConstantField(0.0));
        assert!((s.uv.x - s.radial * 3.0).abs() < 1e-5);
        assert!((s.uv.y - s.angle * 25.0).abs() < 1e-3);
        // Straight along +Z the polar angle is zero.
        assert!((s.angle - 2.0 * PI).abs() < 1e-6);
    }

    #[test]
    fn floor_bias_keeps_dark_field_visible() {
        let disk = AccretionDisk::default();
        let s = disk.sample(Vec3::new(0.5, 0.0, 0.5), 0.0, &ConstantField(0.0));
        assert!(s.intensity > 0.0);
        let negative = disk.sample(Vec3::new(0.5, 0.0, 0.5), 0.0, &ConstantField(-1.0));
        assert_eq!(negative.intensity, 0.0);
    }

    #[test]
    fn intensity_rises_toward_horizon() {
        let disk = AccretionDisk::default();
        let field = ConstantField(1.0);
        let near = disk.sample(Vec3::new(0.0, 0.0, 0.2), 0.0, &field);
        let far = disk.sample(Vec3::new(0.0, 0.0, 2.0), 0.0, &field);
        assert!(near.intensity > far.intensity * 10.0);
    }

    #[test]
    fn color_blend_extrapolates_past_outer_color() {
        let disk = AccretionDisk::default();
        let at_surface = disk.sample(Vec3::new(0.0, 0.0, 0.15), 0.0, &ConstantField(1.0));
        assert!((at_surface.color - AccretionDisk::INNER_COLOR).length() < 1e-5);
        let far = disk.sample(Vec3::new(0.0, 0.0, 3.15), 0.0, &ConstantField(1.0));
        // Weight is 3^2 = 9.
        assert!((far.color.x - (0.5 + 0.5 * 9.0)).abs() < 1e-3);
        assert_eq!(far.color.y, 0.0);
        assert_eq!(far.color.x, far.color.z);
    }

    #[test]
    fn brightness_scales_intensity() {
        let disk = AccretionDisk::default();
        let v = Vec3::new(0.9, 0.0, -0.4);
        let bright = disk.sample(v, 3.0, &SinusoidalField { frequency: 0 });
        let dim = disk.sample(v, 3.0, &ConstantField(0.45));
        // A zero-frequency sinusoid is the constant 1.
        assert!((bright.intensity / dim.intensity - 1.05 / 0.5).abs() < 1e-4);
    }
}
