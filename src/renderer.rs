use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use glam::{Vec2, Vec4};
use image::{DynamicImage, ImageBuffer, Rgba, Rgba32FImage, RgbaImage};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{RenderError, Result};
use crate::field::BrightnessField;
use crate::kernel::PixelKernel;
use crate::FrameUniforms;

/// Unclamped RGBA colors, stored top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl Framebuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// Color at column `x`, row `y` counted from the top.
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        Vec4::from_array(self.pixels[(y * self.width + x) as usize])
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Clamp to `[0, 1]` and quantize, like writing to a unorm target.
    pub fn to_rgba8(&self) -> RgbaImage {
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let c = self.get(x, y);
            Rgba(c.to_array().map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
        })
    }

    pub fn to_rgba32f(&self) -> Rgba32FImage {
        ImageBuffer::from_fn(self.width, self.height, |x, y| Rgba(self.get(x, y).to_array()))
    }

    /// Write the frame; `.exr` keeps the unclamped float colors, anything
    /// else is quantized to 8 bits.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_exr = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("exr"));
        if is_exr {
            DynamicImage::ImageRgba32F(self.to_rgba32f()).save(path)?;
        } else {
            self.to_rgba8().save(path)?;
        }
        log::info!("saved {}", path.display());
        Ok(())
    }
}

/// CPU frame driver: one kernel evaluation per pixel, spread over a rayon
/// pool. Pixels share nothing mutable, so the result does not depend on the
/// number of workers.
pub struct Renderer {
    kernel: PixelKernel,
    pool: Option<ThreadPool>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Renderer running on the global rayon pool.
    pub fn new() -> Self {
        Self { kernel: PixelKernel::default(), pool: None }
    }

    /// Renderer with a dedicated pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("raymarch-{i}"))
            .build()?;
        Ok(Self { kernel: PixelKernel::default(), pool: Some(pool) })
    }

    pub fn with_kernel(self, kernel: PixelKernel) -> Self {
        Self { kernel, ..self }
    }

    pub fn kernel(&self) -> &PixelKernel {
        &self.kernel
    }

    pub fn render<F: BrightnessField + ?Sized>(&self, uniforms: &FrameUniforms, field: &F) -> Result<Framebuffer> {
        let (width, height) = uniforms.viewport();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyViewport { width, height });
        }

        let start = Instant::now();
        let mut pixels = vec![[0.0f32; 4]; width as usize * height as usize];
        match &self.pool {
            Some(pool) => pool.install(|| self.shade_rows(&mut pixels, width, height, uniforms, field)),
            None => self.shade_rows(&mut pixels, width, height, uniforms, field),
        }

        log::info!(
            "rendered {}x{} frame at t={:.3}s in {:.1?}",
            width,
            height,
            uniforms.time,
            start.elapsed()
        );
        Ok(Framebuffer { width, height, pixels })
    }

    fn shade_rows<F: BrightnessField + ?Sized>(
        &self,
        pixels: &mut [[f32; 4]],
        width: u32,
        height: u32,
        uniforms: &FrameUniforms,
        field: &F,
    ) {
        let progress = AtomicUsize::new(0);
        let report_every = (height as usize / 10).max(1);

        pixels
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(row, out)| {
                // Fragment rows count up from the bottom edge.
                let frag_y = (height as usize - 1 - row) as f32 + 0.5;
                for (x, px) in out.iter_mut().enumerate() {
                    let frag = Vec2::new(x as f32 + 0.5, frag_y);
                    *px = self.kernel.shade(frag, uniforms, field).to_array();
                }

                let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
                if done % report_every == 0 {
                    log::debug!("progress: {}/{} rows", done, height);
                }
            });
    }
}
