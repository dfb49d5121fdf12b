//! GPU buffer management for the grade and histogram passes.

use prism_core::image::PixelBuffer;
use wgpu::util::DeviceExt;

use crate::error::GpuError;

/// Bins per channel in the GPU histogram.
pub const GPU_HISTOGRAM_BINS: usize = 256;

/// Bytes per pixel of the graded output (`vec4<f32>`).
const GRADED_BYTES_PER_PIXEL: u64 = 16;

/// Largest buffer the device can both allocate and bind as storage.
pub fn max_storage_bytes(limits: &wgpu::Limits) -> u64 {
    limits
        .max_buffer_size
        .min(u64::from(limits.max_storage_buffer_binding_size))
}

/// Reject a storage buffer of `bytes` before wgpu's validation would.
pub fn ensure_fits(bytes: u64, limits: &wgpu::Limits) -> Result<(), GpuError> {
    let limit = max_storage_bytes(limits);
    if bytes > limit {
        return Err(GpuError::TooLarge { bytes, limit });
    }
    Ok(())
}

/// Byte size of the graded output for a `width` x `height` image.
pub fn graded_byte_size(width: u32, height: u32) -> u64 {
    u64::from(width) * u64::from(height) * GRADED_BYTES_PER_PIXEL
}

fn checked_pixel_count(width: u32, height: u32) -> Result<u32, GpuError> {
    width.checked_mul(height).ok_or(GpuError::TooLarge {
        bytes: u64::from(width) * u64::from(height) * 4,
        limit: u64::from(u32::MAX) * 4,
    })
}

/// Handle to a source image stored as a storage buffer of packed RGBA8 `u32`s.
pub struct GpuImageHandle {
    pub buffer: wgpu::Buffer,
    pub width: u32,
    pub height: u32,
    pixel_count: u32,
}

impl GpuImageHandle {
    /// Upload a [`PixelBuffer`] to the GPU. Bytes are copied as-is; the shaders
    /// read one little-endian `u32` per pixel with red in the low byte.
    pub fn upload(device: &wgpu::Device, image: &PixelBuffer) -> Result<Self, GpuError> {
        if image.is_empty() {
            return Err(GpuError::EmptyImage);
        }
        let pixel_count = checked_pixel_count(image.width(), image.height())?;
        ensure_fits(image.as_bytes().len() as u64, &device.limits())?;

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism_image_upload"),
            contents: image.as_bytes(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        Ok(Self {
            buffer,
            width: image.width(),
            height: image.height(),
            pixel_count,
        })
    }

    /// Pixel count. Fits a `u32` because shader indices are `u32`.
    pub fn pixel_count(&self) -> u32 {
        self.pixel_count
    }
}

/// Float RGBA output of the grade pass (`vec4<f32>` per pixel).
pub struct GradedBuffer {
    pub buffer: wgpu::Buffer,
    pub width: u32,
    pub height: u32,
}

impl GradedBuffer {
    /// Create an uninitialized output buffer matching `source`.
    pub fn for_source(device: &wgpu::Device, source: &GpuImageHandle) -> Result<Self, GpuError> {
        let size = graded_byte_size(source.width, source.height);
        ensure_fits(size, &device.limits())?;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism_graded_output"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Ok(Self {
            buffer,
            width: source.width,
            height: source.height,
        })
    }

    /// Buffer size in bytes.
    pub fn byte_size(&self) -> u64 {
        graded_byte_size(self.width, self.height)
    }
}

/// Atomic `u32` histogram bins: 256 × (R, G, B).
pub struct HistogramBuffer {
    pub buffer: wgpu::Buffer,
}

impl HistogramBuffer {
    pub const BYTE_SIZE: u64 = (GPU_HISTOGRAM_BINS * 3 * 4) as u64;

    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism_histogram_buffer"),
            size: Self::BYTE_SIZE,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits_with(max_buffer_size: u64, max_binding: u32) -> wgpu::Limits {
        wgpu::Limits {
            max_buffer_size,
            max_storage_buffer_binding_size: max_binding.into(),
            ..wgpu::Limits::downlevel_defaults()
        }
    }

    #[test]
    fn test_storage_limit_is_the_smaller_of_both() {
        assert_eq!(max_storage_bytes(&limits_with(1 << 30, 128 << 20)), 128 << 20);
        assert_eq!(max_storage_bytes(&limits_with(64 << 20, 128 << 20)), 64 << 20);
    }

    #[test]
    fn test_twelve_megapixel_output_exceeds_128_mib_binding() {
        let limits = limits_with(1 << 30, 128 << 20);
        let size = graded_byte_size(4000, 3000);
        assert_eq!(size, 192_000_000);
        assert!(matches!(
            ensure_fits(size, &limits),
            Err(GpuError::TooLarge {
                bytes: 192_000_000,
                limit: 134_217_728
            })
        ));
        // The packed RGBA8 source itself still fits.
        assert!(ensure_fits(4000 * 3000 * 4, &limits).is_ok());
    }

    #[test]
    fn test_exact_limit_fits() {
        let limits = limits_with(1024, 1024);
        assert!(ensure_fits(1024, &limits).is_ok());
        assert!(ensure_fits(1025, &limits).is_err());
    }

    #[test]
    fn test_pixel_count_overflow_is_too_large() {
        assert_eq!(checked_pixel_count(4000, 3000).unwrap(), 12_000_000);
        assert!(matches!(
            checked_pixel_count(70_000, 70_000),
            Err(GpuError::TooLarge { .. })
        ));
    }
}
