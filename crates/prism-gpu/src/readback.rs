//! GPU-to-CPU readback for graded images and histogram bins.

use std::sync::Arc;

use parking_lot::Mutex;
use prism_core::image::GradedImage;
use prism_core::scopes::Histogram;

use crate::buffers::{GPU_HISTOGRAM_BINS, GradedBuffer, HistogramBuffer};
use crate::error::GpuError;

/// Staging buffers reused across readbacks.
pub struct Readback {
    histogram_staging: wgpu::Buffer,
    /// Grown on demand to fit the largest image read so far.
    image_staging: Mutex<Option<wgpu::Buffer>>,
}

impl Readback {
    pub fn new(device: &wgpu::Device) -> Self {
        let histogram_staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism_histogram_staging"),
            size: HistogramBuffer::BYTE_SIZE,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            histogram_staging,
            image_staging: Mutex::new(None),
        }
    }

    /// Copy histogram bins to staging, wait for the GPU, and rebuild a [`Histogram`].
    pub fn read_histogram(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bins: &HistogramBuffer,
        mut encoder: wgpu::CommandEncoder,
    ) -> Result<Histogram, GpuError> {
        encoder.copy_buffer_to_buffer(
            &bins.buffer,
            0,
            &self.histogram_staging,
            0,
            HistogramBuffer::BYTE_SIZE,
        );
        queue.submit(std::iter::once(encoder.finish()));

        let flat: Vec<u32> = map_and_read(device, &self.histogram_staging, HistogramBuffer::BYTE_SIZE, |data| {
            bytemuck::cast_slice::<u8, u32>(data).to_vec()
        })?;

        let channel = |ch: usize| -> Vec<u64> {
            flat[ch * GPU_HISTOGRAM_BINS..(ch + 1) * GPU_HISTOGRAM_BINS]
                .iter()
                .map(|&v| u64::from(v))
                .collect()
        };
        Ok(Histogram::from_bins(channel(0), channel(1), channel(2))?)
    }

    /// Copy a graded buffer to staging, wait for the GPU, and rebuild a [`GradedImage`].
    pub fn read_graded(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        output: &GradedBuffer,
        mut encoder: wgpu::CommandEncoder,
    ) -> Result<GradedImage, GpuError> {
        let size = output.byte_size();
        let mut cache = self.image_staging.lock();
        let staging = match cache.take() {
            Some(buf) if buf.size() >= size => buf,
            _ => device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("prism_image_staging"),
                size,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            }),
        };

        encoder.copy_buffer_to_buffer(&output.buffer, 0, &staging, 0, size);
        queue.submit(std::iter::once(encoder.finish()));

        let pixels = map_and_read(device, &staging, size, |data| {
            bytemuck::cast_slice::<u8, [f32; 4]>(data).to_vec()
        });
        *cache = Some(staging);
        let pixels = pixels?;

        Ok(GradedImage {
            width: output.width,
            height: output.height,
            pixels,
        })
    }
}

/// Map the first `size` bytes of `staging`, block until mapped, hand the bytes
/// to `read`, and unmap.
fn map_and_read<T>(
    device: &wgpu::Device,
    staging: &wgpu::Buffer,
    size: u64,
    read: impl FnOnce(&[u8]) -> T,
) -> Result<T, GpuError> {
    let slice = staging.slice(..size);
    let status: Arc<Mutex<Option<Result<(), wgpu::BufferAsyncError>>>> = Arc::new(Mutex::new(None));
    let callback_status = Arc::clone(&status);
    slice.map_async(wgpu::MapMode::Read, move |result| {
        *callback_status.lock() = Some(result);
    });

    device.poll(wgpu::PollType::wait_indefinitely())?;

    match status.lock().take() {
        Some(Ok(())) => {}
        Some(Err(e)) => return Err(GpuError::Map(e)),
        None => return Err(GpuError::MapPending),
    }

    let data = slice.get_mapped_range();
    let out = read(&data);
    drop(data);
    staging.unmap();
    Ok(out)
}
