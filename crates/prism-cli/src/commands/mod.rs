//! CLI command implementations.

pub mod grade;
pub mod histogram;
pub mod info;

use std::path::Path;

use anyhow::{Context, Result};
use prism_core::image::PixelBuffer;
use prism_gpu::{GpuContext, GpuError, GpuGradingPipeline};

use crate::image_io;

/// Load image from path.
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    image_io::load_image(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path.
pub fn save_image(path: &Path, buffer: PixelBuffer) -> Result<()> {
    image_io::save_image(path, buffer).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Save a rendered plot to path.
pub fn save_plot(path: &Path, plot: &image::RgbaImage) -> Result<()> {
    image_io::save_rgba(path, plot).with_context(|| format!("Failed to save plot: {}", path.display()))
}

/// Bring up the GPU pipeline, or `None` when no usable adapter exists.
///
/// Callers fall back to the CPU path on `None`.
pub fn gpu_pipeline() -> Option<GpuGradingPipeline> {
    match GpuContext::new() {
        Ok(ctx) => {
            tracing::info!(adapter = %ctx.adapter_name, "using GPU");
            Some(GpuGradingPipeline::new(ctx.device, ctx.queue))
        }
        Err(e) => {
            tracing::warn!("GPU unavailable, falling back to CPU: {e}");
            None
        }
    }
}

/// GPU errors that mean the input does not suit the GPU path, as opposed to
/// a device failure. Callers retry these on the CPU.
pub fn falls_back_to_cpu(err: &GpuError) -> bool {
    matches!(
        err,
        GpuError::TooLarge { .. } | GpuError::EmptyImage | GpuError::UnsupportedBins { .. }
    )
}
