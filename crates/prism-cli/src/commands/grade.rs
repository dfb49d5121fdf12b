//! Grade command.
//!
//! Applies brightness, contrast and exposure (optionally in linear light)
//! and exports the result. Values outside `[0, 1]` are clipped on export.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use prism_core::image::{GradedImage, PixelBuffer};
use prism_core::scopes::histogram::compute_histogram_par;
use prism_core::scopes::plot::render_histogram;
use prism_core::transform::apply::grade_image;
use prism_core::transform::params::GradingParams;

use crate::config::CliConfig;

/// Arguments for the `grade` command.
#[derive(Args, Debug, Default)]
pub struct GradeArgs {
    /// Input image
    pub input: PathBuf,

    /// Output image (format from extension)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Value added to every channel
    #[arg(long, allow_hyphen_values = true)]
    pub brightness: Option<f32>,

    /// Contrast around mid grey; 0 keeps the image unchanged
    #[arg(long, allow_hyphen_values = true)]
    pub contrast: Option<f32>,

    /// Exposure; every 0.5 doubles the channel values
    #[arg(long, allow_hyphen_values = true)]
    pub exposure: Option<f32>,

    /// Grade in linear light (gamma 2.2 decode/encode around the adjustments)
    #[arg(long)]
    pub linearize: bool,

    /// JSON preset with base parameters; flags override its fields
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Grade on the GPU (falls back to CPU when no adapter is found)
    #[arg(long)]
    pub gpu: bool,

    /// Render the histogram of the graded image to this file
    #[arg(long)]
    pub histogram_plot: Option<PathBuf>,
}

impl GradeArgs {
    /// Merge the preset (if any) with the command-line overrides.
    pub fn resolve_params(&self) -> Result<GradingParams> {
        let mut params = match &self.preset {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read preset: {}", path.display()))?;
                GradingParams::from_json(&json)
                    .with_context(|| format!("Invalid preset: {}", path.display()))?
            }
            None => GradingParams::default(),
        };

        if let Some(b) = self.brightness {
            params.brightness = b;
        }
        if let Some(c) = self.contrast {
            params.contrast = c;
        }
        if let Some(e) = self.exposure {
            params.exposure = e;
        }
        if self.linearize {
            params.linearize = true;
        }
        Ok(params)
    }
}

/// Runs the grade command.
pub fn run(args: GradeArgs, config: &CliConfig) -> Result<()> {
    let params = args.resolve_params()?;
    tracing::info!(
        input = %args.input.display(),
        brightness = params.brightness,
        contrast = params.contrast,
        exposure = params.exposure,
        linearize = params.linearize,
        "grading"
    );

    let source = super::load_image(&args.input)?;
    let graded = grade(&source, &params, args.gpu || config.gpu)?;

    let clipped = graded.out_of_range_count();
    if clipped > 0 {
        tracing::debug!(clipped, "channel values outside [0, 1] clipped on export");
    }

    let output = graded.to_pixel_buffer();

    if let Some(path) = &args.histogram_plot {
        let hist = compute_histogram_par(config.bins, &output)
            .with_context(|| format!("Cannot count into {} bins", config.bins))?;
        let plot = render_histogram(&hist, config.plot_height);
        super::save_plot(path, &plot)?;
        tracing::info!(path = %path.display(), "wrote histogram plot");
    }

    super::save_image(&args.output, output)?;
    tracing::info!(output = %args.output.display(), "saved");
    Ok(())
}

/// Grade on the GPU when asked and available, on the CPU otherwise.
pub fn grade(source: &PixelBuffer, params: &GradingParams, use_gpu: bool) -> Result<GradedImage> {
    if use_gpu && !source.is_empty() {
        if let Some(pipeline) = super::gpu_pipeline() {
            match pipeline
                .upload_image(source)
                .and_then(|handle| pipeline.grade(&handle, params))
            {
                Ok(graded) => return Ok(graded),
                Err(e) if super::falls_back_to_cpu(&e) => {
                    tracing::warn!("{e}, grading on CPU");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(grade_image(source, params))
}
