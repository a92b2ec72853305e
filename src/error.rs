//! Error types for the host-side parts of the renderer. The per-pixel kernel
//! itself has no failure paths.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("viewport must be non-empty, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error("failed to load brightness texture {}: {source}", path.display())]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("brightness texture has no texels ({width}x{height})")]
    EmptyTexture { width: u32, height: u32 },

    #[error("texel buffer holds {actual} values, expected {expected}")]
    TexelCount { expected: usize, actual: usize },

    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
