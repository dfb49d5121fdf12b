//! Prism GPU: wgpu compute passes for the color grade and the histogram.
//!
//! This crate owns all GPU resources. It exposes a plain wgpu API; results
//! come back as `prism-core` types so callers can switch between the CPU and
//! GPU paths freely.

pub mod buffers;
pub mod context;
pub mod error;
pub mod grader;
pub mod pipeline;
pub mod readback;
pub mod scope_dispatch;

pub use context::GpuContext;
pub use error::GpuError;
pub use pipeline::GpuGradingPipeline;

use prism_core::transform::params::GradingParams;

/// Threads per workgroup in every Prism compute shader.
pub const WORKGROUP_SIZE: u32 = 256;

/// Device features the Prism pipelines rely on. Core WebGPU is enough.
pub fn required_features() -> wgpu::Features {
    wgpu::Features::empty()
}

/// `GradingParams` packed for the `grade.wgsl` uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GradingParamsGpu {
    pub brightness: f32,
    pub contrast: f32,
    pub exposure: f32,
    /// 1.0 when grading in linear light, 0.0 otherwise.
    pub switch_to_linear: f32,
}

impl GradingParamsGpu {
    pub fn from_params(params: &GradingParams) -> Self {
        Self {
            brightness: params.brightness,
            contrast: params.contrast,
            exposure: params.exposure,
            switch_to_linear: if params.linearize { 1.0 } else { 0.0 },
        }
    }
}

/// Split `pixel_count` invocations into a dispatch grid that respects the
/// per-dimension workgroup limit. Shaders flatten `(x, y)` back to an index.
pub(crate) fn dispatch_grid(pixel_count: u32, max_per_dim: u32) -> (u32, u32) {
    let groups = pixel_count.div_ceil(WORKGROUP_SIZE).max(1);
    if groups <= max_per_dim {
        (groups, 1)
    } else {
        (max_per_dim, groups.div_ceil(max_per_dim))
    }
}
