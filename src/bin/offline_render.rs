//! Offline black hole renderer
//! Evaluates every pixel on the CPU and writes PNG (or EXR) frames

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use blackhole_raymarch::{BrightnessField, FrameUniforms, NoiseField, Renderer, TextureField};
use clap::Parser;
use glam::Vec2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Black hole with a swirling accretion disk, rendered per pixel on the CPU")]
struct Cli {
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Pointer x in window pixels (defaults to the window center)
    #[arg(long)]
    pointer_x: Option<f32>,
    /// Pointer y in window pixels, top-left origin (defaults to the window center)
    #[arg(long)]
    pointer_y: Option<f32>,
    /// Elapsed time in seconds for the first frame
    #[arg(long, default_value_t = 0.0)]
    time: f32,
    /// Disk brightness texture; a procedural noise field is used when absent
    #[arg(long)]
    texture: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    noise_seed: u32,
    /// Number of frames to render
    #[arg(long, default_value_t = 1)]
    frames: u32,
    #[arg(long, default_value_t = 30.0)]
    fps: f32,
    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long, default_value = "blackhole.png")]
    output: PathBuf,
}

fn validate(cli: &Cli) -> Result<()> {
    ensure!(cli.width > 0 && cli.height > 0, "resolution must be non-zero, got {}x{}", cli.width, cli.height);
    ensure!(cli.frames > 0, "at least one frame is required");
    ensure!(cli.fps > 0.0 && cli.fps.is_finite(), "fps must be positive, got {}", cli.fps);
    Ok(())
}

fn load_field(cli: &Cli) -> Result<Box<dyn BrightnessField>> {
    match &cli.texture {
        Some(path) => {
            let field = TextureField::open(path).with_context(|| format!("loading disk texture {}", path.display()))?;
            Ok(Box::new(field))
        }
        None => {
            log::info!("no texture given, using procedural noise (seed {})", cli.noise_seed);
            Ok(Box::new(NoiseField { seed: cli.noise_seed, ..NoiseField::default() }))
        }
    }
}

/// `out.png` stays as is for a single frame and becomes `out_0007.png` in a
/// sequence.
fn frame_path(output: &Path, index: u32, frames: u32) -> PathBuf {
    if frames == 1 {
        return output.to_path_buf();
    }
    let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let name = match output.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{index:04}.{ext}"),
        None => format!("{stem}_{index:04}"),
    };
    output.with_file_name(name)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    validate(&cli)?;

    let resolution = Vec2::new(cli.width as f32, cli.height as f32);
    let window_pointer = Vec2::new(
        cli.pointer_x.unwrap_or(resolution.x * 0.5),
        cli.pointer_y.unwrap_or(resolution.y * 0.5),
    );
    if window_pointer.cmplt(Vec2::ZERO).any() || window_pointer.cmpgt(resolution).any() {
        log::warn!(
            "pointer ({}, {}) lies outside the {}x{} window; orbit angles wrap past a full turn",
            window_pointer.x,
            window_pointer.y,
            cli.width,
            cli.height
        );
    }
    let uniforms = FrameUniforms::from_window_pointer(resolution, window_pointer, cli.time);

    let field = load_field(&cli)?;
    let renderer = match cli.threads {
        Some(threads) => Renderer::with_threads(threads).context("building worker pool")?,
        None => Renderer::new(),
    };

    log::info!(
        "rendering {} frame(s) at {}x{}, pointer ({:.1}, {:.1})",
        cli.frames,
        cli.width,
        cli.height,
        uniforms.pointer[0],
        uniforms.pointer[1]
    );

    let start = Instant::now();
    for index in 0..cli.frames {
        let time = cli.time + index as f32 / cli.fps;
        let frame = renderer
            .render(&uniforms.with_time(time), field.as_ref())
            .with_context(|| format!("rendering frame {index}"))?;
        let path = frame_path(&cli.output, index, cli.frames);
        frame.save(&path).with_context(|| format!("writing {}", path.display()))?;
    }
    log::info!("done in {:.1?}", start.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame_keeps_output_name() {
        assert_eq!(frame_path(Path::new("out/bh.png"), 0, 1), PathBuf::from("out/bh.png"));
    }

    #[test]
    fn sequence_numbers_frames() {
        assert_eq!(frame_path(Path::new("out/bh.png"), 7, 20), PathBuf::from("out/bh_0007.png"));
        assert_eq!(frame_path(Path::new("bh"), 12, 20), PathBuf::from("bh_0012"));
    }

    #[test]
    fn rejects_bad_arguments() {
        let cli = Cli::parse_from(["offline_render", "--width", "0"]);
        assert!(validate(&cli).is_err());
        let cli = Cli::parse_from(["offline_render", "--fps", "0"]);
        assert!(validate(&cli).is_err());
        let cli = Cli::parse_from(["offline_render", "--frames", "3", "--time", "2.5"]);
        assert!(validate(&cli).is_ok());
    }
}
