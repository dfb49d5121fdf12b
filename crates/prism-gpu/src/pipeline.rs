//! Top-level GPU pipeline that orchestrates the grade and histogram passes.

use prism_core::image::{GradedImage, PixelBuffer};
use prism_core::scopes::Histogram;
use prism_core::transform::params::GradingParams;

use crate::buffers::{GPU_HISTOGRAM_BINS, GpuImageHandle, GradedBuffer, HistogramBuffer};
use crate::error::GpuError;
use crate::grader::Grader;
use crate::readback::Readback;
use crate::scope_dispatch::HistogramDispatch;

/// Owns the compiled pipelines and reusable buffers for one device.
///
/// Every call submits its work and waits for the readback, so results are
/// complete when the call returns.
pub struct GpuGradingPipeline {
    device: wgpu::Device,
    queue: wgpu::Queue,
    grader: Grader,
    histogram: HistogramDispatch,
    histogram_bins: HistogramBuffer,
    readback: Readback,
}

impl GpuGradingPipeline {
    /// Compile all pipelines on an existing device and queue.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let grader = Grader::new(&device);
        let histogram = HistogramDispatch::new(&device);
        let histogram_bins = HistogramBuffer::new(&device);
        let readback = Readback::new(&device);
        tracing::debug!("GPU grading pipeline ready");
        Self {
            device,
            queue,
            grader,
            histogram,
            histogram_bins,
            readback,
        }
    }

    /// Upload a source image for subsequent grade / histogram calls.
    pub fn upload_image(&self, image: &PixelBuffer) -> Result<GpuImageHandle, GpuError> {
        GpuImageHandle::upload(&self.device, image)
    }

    /// Grade an uploaded image and read the float result back.
    ///
    /// Fails with [`GpuError::TooLarge`] when the float output would not fit
    /// a storage binding on this device.
    pub fn grade(&self, source: &GpuImageHandle, params: &GradingParams) -> Result<GradedImage, GpuError> {
        let output = GradedBuffer::for_source(&self.device, source)?;
        let mut encoder = self.create_encoder("prism_grade_encoder");
        self.grader
            .dispatch(&self.device, &self.queue, params, source, &output, &mut encoder);
        self.readback.read_graded(&self.device, &self.queue, &output, encoder)
    }

    /// Count the 256-bin R, G, B histogram of an uploaded image.
    pub fn histogram(&self, source: &GpuImageHandle) -> Result<Histogram, GpuError> {
        let mut encoder = self.create_encoder("prism_histogram_encoder");
        self.histogram
            .dispatch(&self.device, source, &self.histogram_bins, &mut encoder);
        self.readback
            .read_histogram(&self.device, &self.queue, &self.histogram_bins, encoder)
    }

    /// Histogram with an explicit bin count. Only 256 bins run on the GPU.
    pub fn histogram_with_bins(&self, source: &GpuImageHandle, num_bins: usize) -> Result<Histogram, GpuError> {
        if num_bins != GPU_HISTOGRAM_BINS {
            return Err(GpuError::UnsupportedBins {
                requested: num_bins,
                supported: GPU_HISTOGRAM_BINS,
            });
        }
        self.histogram(source)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    fn create_encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }
}
