//! Stylized black hole renderer evaluated independently per pixel.
//!
//! Each pixel casts one ray from an orbit camera, steps it a fixed number of
//! times through an inverse-square pseudo-gravity field and sums the glow of
//! the hole plus the emission of a swirling accretion disk along the way.

mod camera;
mod disk;
mod error;
mod field;
mod integrator;
mod kernel;
mod radiance;
mod renderer;

use glam::Vec2;

pub use crate::camera::{screen_offset, Camera, CameraBasis};
pub use crate::disk::{AccretionDisk, DiskSample};
pub use crate::error::{RenderError, Result};
pub use crate::field::{BrightnessField, CheckerField, ConstantField, NoiseField, SinusoidalField, TextureField};
pub use crate::integrator::{capture_attenuation, sd_sphere, sd_torus, smoothstep, BlackHole, RayIntegrator, Step};
pub use crate::kernel::{shade_pixel, PixelKernel};
pub use crate::radiance::RadianceAccumulator;
pub use crate::renderer::{Framebuffer, Renderer};

/// Per-frame inputs shared by every pixel, laid out like the uniform block a
/// GPU host would upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub resolution: [f32; 2],
    /// Pointer in pixels, bottom-left origin.
    pub pointer: [f32; 2],
    /// Seconds since start.
    pub time: f32,
    pub _padding: [f32; 3],
}

impl FrameUniforms {
    pub fn new(resolution: Vec2, pointer: Vec2, time: f32) -> Self {
        Self {
            resolution: resolution.to_array(),
            pointer: pointer.to_array(),
            time,
            _padding: [0.0; 3],
        }
    }

    /// Take a pointer in window coordinates (top-left origin) and flip it
    /// into the kernel's bottom-left convention.
    pub fn from_window_pointer(resolution: Vec2, window_pointer: Vec2, time: f32) -> Self {
        let pointer = Vec2::new(window_pointer.x, resolution.y - window_pointer.y);
        Self::new(resolution, pointer, time)
    }

    pub fn with_time(self, time: f32) -> Self {
        Self { time, ..self }
    }

    pub fn resolution(&self) -> Vec2 {
        Vec2::from_array(self.resolution)
    }

    pub fn pointer(&self) -> Vec2 {
        Vec2::from_array(self.pointer)
    }

    /// Width over height. Unguarded: a zero height yields infinity or NaN.
    pub fn aspect(&self) -> f32 {
        self.resolution[0] / self.resolution[1]
    }

    /// Viewport size in whole pixels.
    pub fn viewport(&self) -> (u32, u32) {
        (self.resolution[0] as u32, self.resolution[1] as u32)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
