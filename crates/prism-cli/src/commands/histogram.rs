//! Histogram command.
//!
//! Counts the R, G, B distribution of an image, prints a summary and
//! optionally exports the bins as JSON and the rendered plot as an image.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use prism_core::PixelBuffer;
use prism_core::scopes::histogram::{Channel, Histogram, compute_histogram, compute_histogram_par};
use prism_core::scopes::plot::render_histogram;
use prism_gpu::buffers::GPU_HISTOGRAM_BINS;

use crate::config::CliConfig;

/// Arguments for the `histogram` command.
#[derive(Args, Debug, Default)]
pub struct HistogramArgs {
    /// Input image
    pub input: PathBuf,

    /// Bins per channel (default: $PRISM_BINS or 256)
    #[arg(short, long)]
    pub bins: Option<usize>,

    /// Write the bins as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Render the histogram plot to this image file
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Plot height in pixels (default: $PRISM_PLOT_HEIGHT or 100)
    #[arg(long)]
    pub height: Option<u32>,

    /// Count row bands on the rayon pool
    #[arg(long)]
    pub parallel: bool,
}

/// Runs the histogram command.
pub fn run(args: HistogramArgs, config: &CliConfig) -> Result<()> {
    let buffer = super::load_image(&args.input)?;
    let bins = config.bins_or(args.bins);
    let hist = build(&buffer, bins, args.parallel, config.gpu)?;

    println!("{}", args.input.display());
    println!("  Bins:  {}", hist.num_bins());
    println!("  Total: {}", hist.total());
    println!("  Peak:  {}", hist.peak());
    for ch in Channel::ALL {
        if let Some(mean) = hist.mean(ch) {
            println!("  Mean {:<7}{mean:.2}", format!("{ch}:"));
        }
    }

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&hist)?;
        fs::write(path, json).with_context(|| format!("Failed to write: {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote histogram JSON");
    }

    if let Some(path) = &args.plot {
        let plot = render_histogram(&hist, config.plot_height_or(args.height));
        super::save_plot(path, &plot)?;
        tracing::info!(path = %path.display(), "wrote histogram plot");
    }

    Ok(())
}

/// Count `buffer` with the fastest path available for `bins`.
///
/// The GPU path only handles 256 bins; any other count, a missing adapter,
/// or an image too large for the device's buffers runs on the CPU.
pub fn build(buffer: &PixelBuffer, bins: usize, parallel: bool, use_gpu: bool) -> Result<Histogram> {
    if use_gpu && bins != GPU_HISTOGRAM_BINS {
        tracing::warn!(bins, "GPU histogram needs {GPU_HISTOGRAM_BINS} bins, counting on CPU");
    } else if use_gpu && !buffer.is_empty() {
        if let Some(pipeline) = super::gpu_pipeline() {
            match pipeline
                .upload_image(buffer)
                .and_then(|handle| pipeline.histogram(&handle))
            {
                Ok(hist) => return Ok(hist),
                Err(e) if super::falls_back_to_cpu(&e) => {
                    tracing::warn!("{e}, counting on CPU");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    let hist = if parallel {
        compute_histogram_par(bins, buffer)
    } else {
        compute_histogram(bins, buffer)
    };
    hist.with_context(|| format!("Cannot count into {bins} bins"))
}
