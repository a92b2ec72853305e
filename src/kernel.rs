use glam::{Vec2, Vec3, Vec4};

use crate::camera::{screen_offset, Camera};
use crate::disk::AccretionDisk;
use crate::field::BrightnessField;
use crate::integrator::{BlackHole, RayIntegrator};
use crate::radiance::RadianceAccumulator;
use crate::FrameUniforms;

/// Per-pixel evaluation: camera ray, fixed-step integration, and color
/// accumulation. Pure and total apart from the two unguarded divisions
/// (ray exactly through the center, zero-height viewport).
#[derive(Clone, Copy, Debug, Default)]
pub struct PixelKernel {
    pub black_hole: BlackHole,
}

impl PixelKernel {
    pub fn new(black_hole: BlackHole) -> Self {
        Self { black_hole }
    }

    /// Color for the fragment at `frag_coord` (pixel units, bottom-left
    /// origin). Alpha is always 1.
    pub fn shade<F: BrightnessField + ?Sized>(&self, frag_coord: Vec2, uniforms: &FrameUniforms, field: &F) -> Vec4 {
        let resolution = uniforms.resolution();
        let basis = Camera::from_pointer(uniforms.pointer(), resolution).basis();
        let direction = basis.ray_direction(screen_offset(frag_coord, resolution));
        self.trace(basis.origin, direction, uniforms.time, field)
    }

    pub fn trace<F: BrightnessField + ?Sized>(&self, origin: Vec3, direction: Vec3, time: f32, field: &F) -> Vec4 {
        let disk = AccretionDisk::new(&self.black_hole);
        let mut radiance = RadianceAccumulator::new(&self.black_hole);

        for step in RayIntegrator::new(origin, direction, self.black_hole) {
            let sample = disk.sample(step.to_center, time, field);
            radiance.accumulate(&step, &sample);
        }

        radiance.finish()
    }
}

/// Shade one fragment with the default scene.
pub fn shade_pixel<F: BrightnessField + ?Sized>(frag_coord: Vec2, uniforms: &FrameUniforms, field: &F) -> Vec4 {
    PixelKernel::default().shade(frag_coord, uniforms, field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ConstantField, NoiseField};

    fn uniforms() -> FrameUniforms {
        FrameUniforms::new(Vec2::new(64.0, 48.0), Vec2::new(20.0, 30.0), 1.5)
    }

    #[test]
    fn alpha_is_one() {
        let color = shade_pixel(Vec2::new(10.5, 7.5), &uniforms(), &ConstantField(1.0));
        assert_eq!(color.w, 1.0);
        assert!(color.truncate().is_finite());
    }

    #[test]
    fn repeated_evaluation_is_bitwise_identical() {
        let field = NoiseField::default();
        let frag = Vec2::new(31.5, 22.5);
        let a = shade_pixel(frag, &uniforms(), &field);
        let b = shade_pixel(frag, &uniforms(), &field);
        assert_eq!(a.to_array().map(f32::to_bits), b.to_array().map(f32::to_bits));
    }

    #[test]
    fn colors_are_non_negative() {
        let field = ConstantField(1.0);
        for y in (0..48).step_by(6) {
            for x in (0..64).step_by(8) {
                let c = shade_pixel(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), &uniforms(), &field);
                assert!(c.x >= 0.0 && c.y >= 0.0 && c.z >= 0.0, "pixel ({x}, {y}) = {c}");
            }
        }
    }

    #[test]
    fn green_channel_stays_dark() {
        // Neither the disk palette nor the glow carry green.
        let c = shade_pixel(Vec2::new(32.5, 24.5), &uniforms(), &ConstantField(1.0));
        assert_eq!(c.y, 0.0);
    }

    #[test]
    fn ray_aimed_at_hole_is_captured() {
        let kernel = PixelKernel::default();
        // Slightly off-axis so the ray never sits exactly on the center.
        let integrator = RayIntegrator::new(Vec3::new(0.01, 0.0, -4.0), Vec3::Z, kernel.black_hole);
        let last = integrator.last().unwrap();
        assert!(last.noncaptured < 0.05);
        assert!(last.position.length() < 0.2);
    }
}
