use std::f32::consts::PI;

use glam::{Vec2, Vec3};

/// Orbit camera steered by the pointer. The orbit radius and look target are
/// fixed; only the two orbit angles follow the pointer.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub distance: f32,
    pub azimuth: f32,   // horizontal angle
    pub elevation: f32, // polar angle measured from +Y
    pub target: Vec3,
}

/// Orthonormal frame the primary rays are built from.
#[derive(Clone, Copy, Debug)]
pub struct CameraBasis {
    pub origin: Vec3,
    pub forward: Vec3,
    pub left: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub const ORBIT_RADIUS: f32 = 4.0;
    pub const ELEVATION_OFFSET: f32 = 0.24;
    pub const LOOK_AT: Vec3 = Vec3::new(0.0, -0.1, 0.0);
    pub const UP_HINT: Vec3 = Vec3::new(0.0, 1.0, -0.1);
    pub const FOCAL_WEIGHT: f32 = 1.5;

    /// Derive the orbit angles from a pointer position in pixels
    /// (bottom-left origin) over a viewport of `resolution` pixels.
    pub fn from_pointer(pointer: Vec2, resolution: Vec2) -> Self {
        let azimuth = (pointer.x / resolution.x) * PI * 2.0;
        let elevation = ((pointer.y / resolution.y) - Self::ELEVATION_OFFSET) * PI * 2.0;
        Self {
            distance: Self::ORBIT_RADIUS,
            azimuth,
            elevation,
            target: Self::LOOK_AT,
        }
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.azimuth.cos() * self.elevation.sin();
        let y = self.distance * self.elevation.cos();
        let z = self.distance * self.azimuth.sin() * self.elevation.sin();
        Vec3::new(x, y, z)
    }

    /// Build the view frame. When `forward` is parallel to the up hint the
    /// cross products degenerate and the basis contains NaNs; that case is
    /// left as is.
    pub fn basis(&self) -> CameraBasis {
        let origin = self.position();
        let forward = (self.target - origin).normalize();
        let left = Self::UP_HINT.normalize().cross(forward).normalize();
        let up = forward.cross(left).normalize();
        CameraBasis { origin, forward, left, up }
    }
}

impl CameraBasis {
    /// Primary ray direction through a normalized screen offset in
    /// `[-aspect, aspect] x [-1, 1]`.
    pub fn ray_direction(&self, screen: Vec2) -> Vec3 {
        (self.forward * Camera::FOCAL_WEIGHT + self.left * screen.x + self.up * screen.y).normalize()
    }
}

/// Map a fragment coordinate to the symmetric viewport space: `[-1, 1]`
/// vertically, stretched by the aspect ratio horizontally.
pub fn screen_offset(frag_coord: Vec2, resolution: Vec2) -> Vec2 {
    let mut pp = frag_coord / resolution;
    pp = Vec2::splat(-1.0) + 2.0 * pp;
    pp.x *= resolution.x / resolution.y;
    pp
}
