//! Fixed-step ray integration through the pseudo-gravitational field.
//!
//! The ray is advanced a constant number of times regardless of whether it
//! has been captured. A captured ray keeps stepping with its displacement and
//! color throttled to zero by the capture attenuation, so every pixel costs
//! the same amount of work.

use glam::{Vec2, Vec3};

/// The attractor at the center of the scene. The mass is already scaled
/// into the units the velocity update expects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlackHole {
    pub position: Vec3,
    pub radius: f32,
    pub mass: f32,
}

impl BlackHole {
    pub const DEFAULT: Self = Self {
        position: Vec3::ZERO,
        radius: 0.15,
        mass: 7.5 * 0.001,
    };
}

impl Default for BlackHole {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// State observed after one integration step.
#[derive(Clone, Copy, Debug)]
pub struct Step {
    pub position: Vec3,
    /// Vector from the ray position to the black hole center.
    pub to_center: Vec3,
    /// Capture attenuation in `[0, 1]` computed at the new position.
    pub noncaptured: f32,
}

pub struct RayIntegrator {
    position: Vec3,
    velocity: Vec3,
    noncaptured: f32,
    black_hole: BlackHole,
    remaining: u32,
}

impl RayIntegrator {
    pub const STEPS: u32 = 180;
    pub const DT: f32 = 0.03;
    /// Thickness of the shell over which capture attenuation fades in.
    pub const CAPTURE_SHELL: f32 = 0.8;
    /// Only scales the first displacement; the first step overwrites it
    /// before any color is accumulated.
    pub const INITIAL_NONCAPTURED: f32 = 2.0;

    pub fn new(origin: Vec3, direction: Vec3, black_hole: BlackHole) -> Self {
        Self {
            position: origin,
            velocity: direction,
            noncaptured: Self::INITIAL_NONCAPTURED,
            black_hole,
            remaining: Self::STEPS,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn noncaptured(&self) -> f32 {
        self.noncaptured
    }

    /// Perform one step. The displacement uses the attenuation of the
    /// previous step, then the velocity is bent and the attenuation is
    /// recomputed at the new position.
    ///
    /// A position exactly at the center divides by zero in the attraction
    /// term; that input is outside the supported domain.
    pub fn advance(&mut self) -> Step {
        self.position += self.velocity * Self::DT * self.noncaptured;

        let to_center = self.black_hole.position - self.position;
        let r2 = to_center.dot(to_center);
        self.velocity += to_center.normalize() * (self.black_hole.mass / r2);

        let surface = sd_sphere(self.position - self.black_hole.position, self.black_hole.radius);
        self.noncaptured = capture_attenuation(surface);

        Step {
            position: self.position,
            to_center,
            noncaptured: self.noncaptured,
        }
    }
}

impl Iterator for RayIntegrator {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.advance())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for RayIntegrator {}

/// Smooth falloff of the signed distance to the horizon surface: 0 on or
/// inside the surface, 1 beyond the capture shell.
pub fn capture_attenuation(surface_distance: f32) -> f32 {
    smoothstep(0.0, RayIntegrator::CAPTURE_SHELL, surface_distance)
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn sd_sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

/// Torus around the Y axis with major radius `t.x` and minor radius `t.y`.
pub fn sd_torus(p: Vec3, t: Vec2) -> f32 {
    let q = Vec2::new(Vec2::new(p.x, p.z).length() - t.x, p.y);
    q.length() - t.y
}
