//! Brightness fields sampled by the accretion disk.
//!
//! A field is a read-only lookup shared by every pixel of a frame. Samples
//! are addressed in texture space and every implementation tiles with period
//! 1 along both axes, since the disk angle wraps around.

use std::f32::consts::PI;
use std::path::Path;

use glam::Vec2;
use image::DynamicImage;

use crate::error::{RenderError, Result};

pub trait BrightnessField: Sync {
    /// Red-channel brightness at `uv`, tiling in both axes.
    fn sample(&self, uv: Vec2) -> f32;
}

impl<F: BrightnessField + ?Sized> BrightnessField for &F {
    fn sample(&self, uv: Vec2) -> f32 {
        (**self).sample(uv)
    }
}

impl<F: BrightnessField + ?Sized> BrightnessField for Box<F> {
    fn sample(&self, uv: Vec2) -> f32 {
        (**self).sample(uv)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ConstantField(pub f32);

impl BrightnessField for ConstantField {
    fn sample(&self, _uv: Vec2) -> f32 {
        self.0
    }
}

/// Alternating 0/1 cells, `cells` per tile along each axis.
#[derive(Clone, Copy, Debug)]
pub struct CheckerField {
    pub cells: u32,
}

impl BrightnessField for CheckerField {
    fn sample(&self, uv: Vec2) -> f32 {
        let n = self.cells as f32;
        let cu = (uv.x.rem_euclid(1.0) * n).floor() as i64;
        let cv = (uv.y.rem_euclid(1.0) * n).floor() as i64;
        if (cu + cv) % 2 == 0 {
            1.0
        } else {
            0.0
        }
    }
}

/// Separable cosine pattern, even in both axes.
#[derive(Clone, Copy, Debug)]
pub struct SinusoidalField {
    pub frequency: u32,
}

impl BrightnessField for SinusoidalField {
    fn sample(&self, uv: Vec2) -> f32 {
        let w = 2.0 * PI * self.frequency as f32;
        0.5 + 0.5 * (w * uv.x).cos() * (w * uv.y).cos()
    }
}

/// Tileable value-noise fBm. The hash lattice wraps at `period` cells on the
/// first octave and doubles with every octave, so the pattern repeats exactly
/// once per unit of texture space.
#[derive(Clone, Copy, Debug)]
pub struct NoiseField {
    pub period: u32,
    pub octaves: u32,
    pub seed: u32,
}

impl Default for NoiseField {
    fn default() -> Self {
        Self { period: 8, octaves: 5, seed: 0 }
    }
}

impl NoiseField {
    fn hash(&self, cell: [i64; 2]) -> f32 {
        let offset = self.seed as f32 * 17.31;
        let p = [cell[0] as f32 + offset, cell[1] as f32 + offset];
        let p3 = [
            (p[0] * 0.1031).fract(),
            (p[1] * 0.1031).fract(),
            (p[0] * 0.1031).fract(),
        ];
        let dot = p3[0] * (p3[1] + 33.33) + p3[1] * (p3[2] + 33.33) + p3[2] * (p3[0] + 33.33);
        ((p3[0] + p3[1]) * (p3[2] + dot)).fract().abs()
    }

    fn noise(&self, p: Vec2, period: i64) -> f32 {
        let i = p.floor();
        let f = p - i;
        let u = f * f * (Vec2::splat(3.0) - 2.0 * f);

        let x0 = (i.x as i64).rem_euclid(period);
        let y0 = (i.y as i64).rem_euclid(period);
        let x1 = (x0 + 1) % period;
        let y1 = (y0 + 1) % period;

        let a = self.hash([x0, y0]);
        let b = self.hash([x1, y0]);
        let c = self.hash([x0, y1]);
        let d = self.hash([x1, y1]);

        a + (b - a) * u.x + (c - a) * u.y + (a - b - c + d) * u.x * u.y
    }
}

impl BrightnessField for NoiseField {
    fn sample(&self, uv: Vec2) -> f32 {
        let wrapped = Vec2::new(uv.x.rem_euclid(1.0), uv.y.rem_euclid(1.0));
        let mut period = self.period.max(1) as i64;
        let mut value = 0.0;
        let mut amplitude = 0.5;
        let mut norm = 0.0;
        for _ in 0..self.octaves.max(1) {
            value += amplitude * self.noise(wrapped * period as f32, period);
            norm += amplitude;
            period *= 2;
            amplitude *= 0.5;
        }
        value / norm
    }
}

/// Image-backed field. Rows are stored bottom-up (the image is flipped on
/// load) and only the red channel is kept; single-channel images count as
/// red. Lookups are bilinear with repeat wrapping.
#[derive(Clone, Debug)]
pub struct TextureField {
    width: u32,
    height: u32,
    texels: Vec<f32>,
}

impl TextureField {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| RenderError::TextureLoad {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "loaded brightness texture {} ({}x{}, {:?})",
            path.display(),
            img.width(),
            img.height(),
            img.color()
        );
        Self::from_image(&img)
    }

    pub fn from_image(img: &DynamicImage) -> Result<Self> {
        let (width, height) = (img.width(), img.height());
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTexture { width, height });
        }
        let rgb = img.flipv().to_rgb32f();
        let texels = rgb.pixels().map(|p| p.0[0]).collect();
        Ok(Self { width, height, texels })
    }

    /// Build from red values laid out bottom row first.
    pub fn from_texels(width: u32, height: u32, texels: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTexture { width, height });
        }
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(RenderError::TexelCount { expected, actual: texels.len() });
        }
        Ok(Self { width, height, texels })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn texel(&self, x: i64, y: i64) -> f32 {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        self.texels[y * self.width as usize + x]
    }
}

impl BrightnessField for TextureField {
    fn sample(&self, uv: Vec2) -> f32 {
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let a = self.texel(x0, y0);
        let b = self.texel(x0 + 1, y0);
        let c = self.texel(x0, y0 + 1);
        let d = self.texel(x0 + 1, y0 + 1);

        let bottom = a + (b - a) * fx;
        let top = c + (d - c) * fx;
        bottom + (top - bottom) * fy
    }
}
