//! GPU compute pass for the brightness / contrast / exposure grade.

use prism_core::transform::params::GradingParams;

use crate::GradingParamsGpu;
use crate::buffers::{GpuImageHandle, GradedBuffer};
use crate::scope_dispatch::{create_compute_pipeline, storage_ro_entry, storage_rw_entry, uniform_entry};

/// Manages the `grade.wgsl` compute pipeline and its uniform buffer.
pub struct Grader {
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
}

impl Grader {
    /// Create the grade pipeline. Compiles `grade.wgsl`.
    pub fn new(device: &wgpu::Device) -> Self {
        let params_size = std::mem::size_of::<GradingParamsGpu>() as u64;
        let (pipeline, layout) = create_compute_pipeline(
            device,
            "grade",
            include_str!("../shaders/grade.wgsl"),
            &[
                storage_ro_entry(0, 4),
                storage_rw_entry(1, 16),
                uniform_entry(2, params_size),
            ],
        );

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism_grade_params_uniform"),
            size: params_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            layout,
            params_buffer,
        }
    }

    /// Record the grade pass onto `encoder`, writing into `output`.
    ///
    /// The caller is responsible for submitting the encoder.
    pub fn dispatch(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        params: &GradingParams,
        source: &GpuImageHandle,
        output: &GradedBuffer,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let gpu_params = GradingParamsGpu::from_params(params);
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&gpu_params));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism_grade_bind_group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: source.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.params_buffer.as_entire_binding(),
                },
            ],
        });

        let (wg_x, wg_y) = crate::dispatch_grid(
            source.pixel_count(),
            device.limits().max_compute_workgroups_per_dimension,
        );
        tracing::debug!(wg_x, wg_y, ?params, "dispatching grade");

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("prism_grade_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(wg_x, wg_y, 1);
    }
}
