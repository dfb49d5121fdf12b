//! Image representations for the histogram and grading pipeline.

use std::fmt;

use crate::error::CoreError;

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Decoded 8-bit RGBA image, row-major.
///
/// The buffer is immutable once constructed; both the histogram and the
/// grader only read from it.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 bytes. `data.len()` must equal `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(CoreError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a buffer from a list of pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: &[[u8; 4]]) -> Result<Self, CoreError> {
        let data = pixels.iter().flatten().copied().collect();
        Self::new(width, height, data)
    }

    /// A `width × height` buffer filled with a single color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, CoreError> {
        let count = byte_len(width, height)? / CHANNELS;
        let data = std::iter::repeat_n(rgba, count).flatten().collect();
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of pixels (`width × height`).
    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over pixels in row-major order.
    pub fn pixels(&self) -> impl ExactSizeIterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Iterate over rows as byte slices of `width * 4` bytes each.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        // chunks_exact panics on a zero chunk size, so guard empty rows.
        let stride = (self.width as usize * CHANNELS).max(1);
        self.data.chunks_exact(stride)
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.data[offset..offset + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Consume the buffer and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl From<image::RgbaImage> for PixelBuffer {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl From<PixelBuffer> for image::RgbaImage {
    fn from(buffer: PixelBuffer) -> Self {
        let (width, height) = (buffer.width, buffer.height);
        // Length is checked on construction, so from_raw cannot fail here.
        image::RgbaImage::from_raw(width, height, buffer.data)
            .unwrap_or_else(|| image::RgbaImage::new(width, height))
    }
}

/// Float RGBA image produced by the grader. Values are not clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data, RGBA f32, row-major.
    pub pixels: Vec<[f32; 4]>,
}

impl GradedImage {
    /// Normalise an 8-bit buffer to `[0, 1]` floats.
    pub fn from_pixel_buffer(buffer: &PixelBuffer) -> Self {
        let pixels = buffer.pixels().map(normalize).collect();
        Self {
            width: buffer.width,
            height: buffer.height,
            pixels,
        }
    }

    /// Quantise back to 8 bits, clamping every channel to `[0, 1]` first.
    ///
    /// NaN channels quantise to 0.
    pub fn to_pixel_buffer(&self) -> PixelBuffer {
        let data = self
            .pixels
            .iter()
            .flat_map(|px| px.map(quantize))
            .collect();
        PixelBuffer {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Number of pixels whose RGB channels leave `[0, 1]`.
    pub fn out_of_range_count(&self) -> usize {
        self.pixels
            .iter()
            .filter(|px| px[..3].iter().any(|c| !(0.0..=1.0).contains(c)))
            .count()
    }
}

/// Map an 8-bit pixel to `[0, 1]` floats.
pub fn normalize(px: [u8; 4]) -> [f32; 4] {
    px.map(|c| c as f32 / 255.0)
}

/// Map a float channel to 8 bits with clamping.
pub fn quantize(c: f32) -> u8 {
    // `clamp` propagates NaN; `as u8` saturates it to 0.
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn byte_len(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(CoreError::DimensionOverflow { width, height })
}
