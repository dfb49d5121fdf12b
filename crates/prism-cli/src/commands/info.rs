//! Image info command.
//!
//! Prints dimensions, pixel count and the mean of each color channel.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use prism_core::PixelBuffer;
use prism_core::scopes::histogram::{Channel, DEFAULT_NUM_BINS, compute_histogram_par};

/// Arguments for the `info` command.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    pub input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    pub json: bool,
}

/// Summary of one decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub pixels: usize,
    /// Mean 8-bit value per channel, `None` for an empty image.
    pub means: [Option<f64>; 3],
}

impl ImageInfo {
    pub fn from_buffer(buffer: &PixelBuffer) -> Result<Self> {
        let hist = compute_histogram_par(DEFAULT_NUM_BINS, buffer)?;
        Ok(Self {
            width: buffer.width(),
            height: buffer.height(),
            pixels: buffer.pixel_count(),
            means: Channel::ALL.map(|ch| hist.mean(ch)),
        })
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "width": self.width,
            "height": self.height,
            "pixels": self.pixels,
            "mean": {
                "red": self.means[0],
                "green": self.means[1],
                "blue": self.means[2],
            },
        })
    }
}

/// Runs the info command.
pub fn run(args: InfoArgs) -> Result<()> {
    for (i, path) in args.input.iter().enumerate() {
        let buffer = super::load_image(path)?;
        let info = ImageInfo::from_buffer(&buffer)?;

        if args.json {
            let mut value = info.to_json();
            value["path"] = serde_json::Value::from(path.display().to_string());
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            if i > 0 {
                println!();
            }
            println!("{}", path.display());
            println!("  Resolution: {}x{}", info.width, info.height);
            println!("  Pixels:     {}", info.pixels);
            for (ch, mean) in Channel::ALL.iter().zip(info.means) {
                let label = format!("{ch}:");
                match mean {
                    Some(m) => println!("  Mean {label:<7}{m:.2}"),
                    None => println!("  Mean {label:<7}n/a"),
                }
            }
        }
    }
    Ok(())
}
