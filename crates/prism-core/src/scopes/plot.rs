//! Histogram plot rasterisation.
//!
//! Draws the three channel distributions as overlaid filled curves, one
//! column per bin. The area under each curve is tinted at low opacity and
//! the curve itself is stroked at full opacity, red first, then green,
//! then blue, using source-over blending on a transparent canvas.

use image::{Pixel, Rgba, RgbaImage};

use crate::scopes::histogram::{Channel, Histogram};

/// Default plot height in pixels.
pub const DEFAULT_PLOT_HEIGHT: u32 = 100;

/// Opacity of the area under each curve.
const FILL_ALPHA: f32 = 0.1;

/// Stroke / fill color per channel.
const fn channel_color(channel: Channel) -> [u8; 3] {
    match channel {
        Channel::Red => [255, 0, 0],
        Channel::Green => [0, 128, 0],
        Channel::Blue => [0, 0, 255],
    }
}

/// Render a histogram as an RGBA image `num_bins` wide and `height` tall.
///
/// Bins are scaled so the tallest bin across all channels touches the top
/// edge. An empty histogram produces a fully transparent image.
pub fn render_histogram(hist: &Histogram, height: u32) -> RgbaImage {
    let width = hist.num_bins() as u32;
    let mut canvas = RgbaImage::new(width, height);

    let peak = hist.peak();
    if peak == 0 || height == 0 {
        return canvas;
    }
    let scale = height as f64 / peak as f64;

    for channel in Channel::ALL {
        let [r, g, b] = channel_color(channel);
        let fill = Rgba([r, g, b, (FILL_ALPHA * 255.0).round() as u8]);
        let stroke = Rgba([r, g, b, 255]);

        let tops: Vec<u32> = hist
            .channel(channel)
            .iter()
            .map(|&count| curve_row(count, scale, height))
            .collect();

        // Fill everything from the curve down to the baseline.
        for (x, &top) in tops.iter().enumerate() {
            for y in top..height {
                canvas.get_pixel_mut(x as u32, y).blend(&fill);
            }
        }

        // Stroke the closed outline: baseline, both end risers, and a
        // vertical run joining each column to its left neighbour.
        let bottom = height - 1;
        let last = width - 1;
        for x in 0..width {
            *canvas.get_pixel_mut(x, bottom) = stroke;
        }
        for (x, top) in [(0, tops[0]), (last, tops[last as usize])] {
            for y in top.min(bottom)..=bottom {
                *canvas.get_pixel_mut(x, y) = stroke;
            }
        }
        for (x, &top) in tops.iter().enumerate() {
            let prev = if x == 0 { top } else { tops[x - 1] };
            let (lo, hi) = if prev < top { (prev, top) } else { (top, prev) };
            for y in lo..=hi.min(bottom) {
                *canvas.get_pixel_mut(x as u32, y) = stroke;
            }
        }
    }

    tracing::debug!(width, height, peak, "histogram plot rendered");
    canvas
}

/// Row of the curve for a bin count. Row 0 is the top edge.
fn curve_row(count: u64, scale: f64, height: u32) -> u32 {
    let bar = (count as f64 * scale).round() as u32;
    height - bar.min(height)
}
