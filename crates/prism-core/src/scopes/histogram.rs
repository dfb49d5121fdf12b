//! Per-channel RGB histogram computation.
//!
//! Channel values are used directly as bin indices, so an 8-bit buffer
//! needs at least 256 bins. A value that does not fit fails the whole
//! computation with [`ScopeError::IndexOutOfRange`] instead of being
//! clamped into the last bin.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ScopeError;
use crate::image::PixelBuffer;

/// Bin count matching the 8-bit channel range.
pub const DEFAULT_NUM_BINS: usize = 256;

/// Rows handed to a single rayon task by [`compute_histogram_par`].
const ROWS_PER_TASK: usize = 64;

/// A color channel covered by the histogram. Alpha is never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Offset of this channel inside an RGBA pixel.
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

/// Frequency distribution of R, G and B values over a whole buffer.
///
/// Every channel holds the same number of bins and the same total count,
/// which equals the pixel count of the source buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHistogram")]
pub struct Histogram {
    r_bins: Vec<u64>,
    g_bins: Vec<u64>,
    b_bins: Vec<u64>,
}

/// Unchecked wire form; deserialization goes through [`Histogram::from_bins`].
#[derive(Deserialize)]
struct RawHistogram {
    r_bins: Vec<u64>,
    g_bins: Vec<u64>,
    b_bins: Vec<u64>,
}

impl TryFrom<RawHistogram> for Histogram {
    type Error = ScopeError;

    fn try_from(raw: RawHistogram) -> Result<Self, Self::Error> {
        Histogram::from_bins(raw.r_bins, raw.g_bins, raw.b_bins)
    }
}

impl Histogram {
    /// An all-zero histogram with `num_bins` bins per channel.
    pub fn empty(num_bins: usize) -> Result<Self, ScopeError> {
        if num_bins == 0 {
            return Err(ScopeError::ZeroBins);
        }
        Ok(Self {
            r_bins: vec![0; num_bins],
            g_bins: vec![0; num_bins],
            b_bins: vec![0; num_bins],
        })
    }

    /// Rebuild a histogram from raw bin counts, e.g. a GPU readback.
    pub fn from_bins(r_bins: Vec<u64>, g_bins: Vec<u64>, b_bins: Vec<u64>) -> Result<Self, ScopeError> {
        let num_bins = r_bins.len();
        if num_bins == 0 {
            return Err(ScopeError::ZeroBins);
        }
        for other in [g_bins.len(), b_bins.len()] {
            if other != num_bins {
                return Err(ScopeError::BinMismatch {
                    left: num_bins,
                    right: other,
                });
            }
        }
        Ok(Self {
            r_bins,
            g_bins,
            b_bins,
        })
    }

    pub fn num_bins(&self) -> usize {
        self.r_bins.len()
    }

    pub fn r_bins(&self) -> &[u64] {
        &self.r_bins
    }

    pub fn g_bins(&self) -> &[u64] {
        &self.g_bins
    }

    pub fn b_bins(&self) -> &[u64] {
        &self.b_bins
    }

    /// Bins for one channel.
    pub fn channel(&self, channel: Channel) -> &[u64] {
        match channel {
            Channel::Red => &self.r_bins,
            Channel::Green => &self.g_bins,
            Channel::Blue => &self.b_bins,
        }
    }

    /// Number of pixels counted. Identical for every channel.
    pub fn total(&self) -> u64 {
        self.r_bins.iter().sum()
    }

    /// Largest single bin across all channels; the plot normalises by it.
    pub fn peak(&self) -> u64 {
        self.r_bins
            .iter()
            .chain(&self.g_bins)
            .chain(&self.b_bins)
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Mean bin index of one channel, or `None` for an empty histogram.
    pub fn mean(&self, channel: Channel) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let weighted: f64 = self
            .channel(channel)
            .iter()
            .enumerate()
            .map(|(value, &count)| value as f64 * count as f64)
            .sum();
        Some(weighted / total as f64)
    }

    /// Add another histogram's counts into this one.
    pub fn merge(&mut self, other: &Histogram) -> Result<(), ScopeError> {
        if self.num_bins() != other.num_bins() {
            return Err(ScopeError::BinMismatch {
                left: self.num_bins(),
                right: other.num_bins(),
            });
        }
        for (dst, src) in [
            (&mut self.r_bins, &other.r_bins),
            (&mut self.g_bins, &other.g_bins),
            (&mut self.b_bins, &other.b_bins),
        ] {
            for (d, s) in dst.iter_mut().zip(src) {
                *d += s;
            }
        }
        Ok(())
    }

    fn accumulate(&mut self, bytes: &[u8]) -> Result<(), ScopeError> {
        let num_bins = self.num_bins();
        for px in bytes.chunks_exact(4) {
            let (r, g, b) = (px[0] as usize, px[1] as usize, px[2] as usize);
            if r >= num_bins || g >= num_bins || b >= num_bins {
                return Err(out_of_range(px, num_bins));
            }
            self.r_bins[r] += 1;
            self.g_bins[g] += 1;
            self.b_bins[b] += 1;
        }
        Ok(())
    }
}

/// Compute the R, G, B histogram of a buffer in a single pass.
pub fn compute_histogram(num_bins: usize, buffer: &PixelBuffer) -> Result<Histogram, ScopeError> {
    let mut hist = Histogram::empty(num_bins)?;
    hist.accumulate(buffer.as_bytes())?;
    tracing::debug!(
        num_bins,
        pixels = buffer.pixel_count(),
        "histogram computed"
    );
    Ok(hist)
}

/// Row-parallel variant of [`compute_histogram`].
///
/// Rows are split into bands, each band is counted into its own partial
/// histogram, and the partials are merged. The result is identical to
/// the sequential computation.
pub fn compute_histogram_par(num_bins: usize, buffer: &PixelBuffer) -> Result<Histogram, ScopeError> {
    let empty = Histogram::empty(num_bins)?;
    let band_bytes = (buffer.width() as usize * 4 * ROWS_PER_TASK).max(4);

    let hist = buffer
        .as_bytes()
        .par_chunks(band_bytes)
        .map(|band| -> Result<Histogram, ScopeError> {
            let mut partial = empty.clone();
            partial.accumulate(band)?;
            Ok(partial)
        })
        .try_reduce(
            || empty.clone(),
            |mut acc, partial| {
                acc.merge(&partial)?;
                Ok(acc)
            },
        )?;

    tracing::debug!(
        num_bins,
        pixels = buffer.pixel_count(),
        "parallel histogram computed"
    );
    Ok(hist)
}

fn out_of_range(px: &[u8], num_bins: usize) -> ScopeError {
    let channel = Channel::ALL
        .into_iter()
        .find(|ch| px[ch.index()] as usize >= num_bins)
        .unwrap_or(Channel::Red);
    ScopeError::IndexOutOfRange {
        channel,
        value: px[channel.index()],
        num_bins,
    }
}
