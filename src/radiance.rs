use glam::{Vec2, Vec3, Vec4};

use crate::disk::DiskSample;
use crate::integrator::{sd_torus, smoothstep, BlackHole, Step};

/// Running color sum for one pixel. Nothing is clamped between steps.
#[derive(Clone, Copy, Debug)]
pub struct RadianceAccumulator {
    center: Vec3,
    sum: Vec3,
}

impl RadianceAccumulator {
    pub const GLOW_COLOR: Vec3 = Vec3::new(0.7, 0.0, 0.0);
    pub const GLOW_STRENGTH: f32 = 0.005;
    /// Squashes the emission torus into a thin ring around the disk plane.
    pub const SHELL_SCALE: Vec3 = Vec3::new(0.5, 30.0, 0.5);
    pub const SHELL_RADII: Vec2 = Vec2::new(0.8, 0.99);
    pub const SHELL_FADE: f32 = 0.5;

    pub fn new(black_hole: &BlackHole) -> Self {
        Self { center: black_hole.position, sum: Vec3::ZERO }
    }

    /// 1 deep inside the flattened torus, fading to 0 at its boundary.
    pub fn shell_mask(&self, position: Vec3) -> f32 {
        let d = sd_torus(position * Self::SHELL_SCALE - self.center, Self::SHELL_RADII);
        smoothstep(0.0, Self::SHELL_FADE, -d)
    }

    pub fn disk_term(&self, step: &Step, disk: &DiskSample) -> Vec3 {
        (disk.emission() * self.shell_mask(step.position) * step.noncaptured).max(Vec3::ZERO)
    }

    pub fn glow_term(&self, step: &Step) -> Vec3 {
        Self::GLOW_COLOR * (1.0 / step.to_center.dot(step.to_center)) * Self::GLOW_STRENGTH * step.noncaptured
    }

    pub fn accumulate(&mut self, step: &Step, disk: &DiskSample) {
        self.sum += self.disk_term(step, disk);
        self.sum += self.glow_term(step);
    }

    pub fn color(&self) -> Vec3 {
        self.sum
    }

    pub fn finish(self) -> Vec4 {
        self.sum.extend(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::AccretionDisk;
    use crate::field::ConstantField;

    fn step_at(position: Vec3, noncaptured: f32) -> Step {
        Step { position, to_center: -position, noncaptured }
    }

    #[test]
    fn shell_is_thin_and_flat() {
        let acc = RadianceAccumulator::new(&BlackHole::DEFAULT);
        assert_eq!(acc.shell_mask(Vec3::new(1.6, 0.0, 0.0)), 1.0);
        assert_eq!(acc.shell_mask(Vec3::new(1.6, 0.1, 0.0)), 0.0);
        assert_eq!(acc.shell_mask(Vec3::new(4.0, 0.0, 0.0)), 0.0);
        assert!(acc.shell_mask(Vec3::new(0.0, 0.0, 3.0)) > 0.0);
    }

    #[test]
    fn captured_step_contributes_nothing() {
        let mut acc = RadianceAccumulator::new(&BlackHole::DEFAULT);
        let disk = AccretionDisk::default();
        let step = step_at(Vec3::new(0.1, 0.0, 0.05), 0.0);
        let sample = disk.sample(step.to_center, 0.0, &ConstantField(1.0));
        acc.accumulate(&step, &sample);
        assert_eq!(acc.color(), Vec3::ZERO);
    }

    #[test]
    fn glow_is_red_inverse_square() {
        let acc = RadianceAccumulator::new(&BlackHole::DEFAULT);
        let near = acc.glow_term(&step_at(Vec3::new(0.0, 1.0, 0.0), 1.0));
        let far = acc.glow_term(&step_at(Vec3::new(0.0, 2.0, 0.0), 1.0));
        assert!((near.x - 0.0035).abs() < 1e-7);
        assert!((near.x / far.x - 4.0).abs() < 1e-4);
        assert_eq!(near.y, 0.0);
        assert_eq!(near.z, 0.0);
    }

    #[test]
    fn disk_term_never_negative() {
        let acc = RadianceAccumulator::new(&BlackHole::DEFAULT);
        let disk = AccretionDisk::default();
        // Inside the horizon the hyperbolic falloff turns negative.
        let step = step_at(Vec3::new(0.1, 0.0, 0.0), 1.0);
        let sample = disk.sample(step.to_center, 0.0, &ConstantField(1.0));
        assert!(sample.intensity < 0.0);
        assert_eq!(acc.disk_term(&step, &sample), Vec3::ZERO);
    }

    #[test]
    fn sum_is_unclamped() {
        let mut acc = RadianceAccumulator::new(&BlackHole::DEFAULT);
        let disk = AccretionDisk::default();
        let step = step_at(Vec3::new(0.4, 0.0, 0.0), 1.0);
        let sample = disk.sample(step.to_center, 0.0, &ConstantField(1.0));
        for _ in 0..10 {
            acc.accumulate(&step, &sample);
        }
        let color = acc.finish();
        assert!(color.x > 1.0);
        assert_eq!(color.w, 1.0);
    }
}
