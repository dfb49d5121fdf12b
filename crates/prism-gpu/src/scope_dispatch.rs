//! GPU compute dispatch for the histogram scope.

use std::num::NonZeroU64;

use crate::buffers::{GpuImageHandle, HistogramBuffer};

/// Dispatches the histogram compute shader and owns its pipeline state.
pub struct HistogramDispatch {
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
}

impl HistogramDispatch {
    /// Create the histogram compute pipeline. Compiles `histogram.wgsl`.
    pub fn new(device: &wgpu::Device) -> Self {
        let (pipeline, layout) = create_compute_pipeline(
            device,
            "histogram",
            include_str!("../shaders/histogram.wgsl"),
            &[storage_ro_entry(0, 4), storage_rw_entry(1, HistogramBuffer::BYTE_SIZE)],
        );
        Self { pipeline, layout }
    }

    /// Record a cleared-then-counted histogram pass onto `encoder`.
    ///
    /// The caller submits the encoder and reads `bins` back afterwards.
    pub fn dispatch(
        &self,
        device: &wgpu::Device,
        image: &GpuImageHandle,
        bins: &HistogramBuffer,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        encoder.clear_buffer(&bins.buffer, 0, None);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism_histogram_bg"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: image.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: bins.buffer.as_entire_binding(),
                },
            ],
        });

        let (wg_x, wg_y) = crate::dispatch_grid(
            image.pixel_count(),
            device.limits().max_compute_workgroups_per_dimension,
        );
        tracing::debug!(wg_x, wg_y, pixels = image.pixel_count(), "dispatching histogram");

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("prism_histogram_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(wg_x, wg_y, 1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

pub(crate) fn storage_ro_entry(binding: u32, min_size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(min_size),
        },
        count: None,
    }
}

pub(crate) fn storage_rw_entry(binding: u32, min_size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(min_size),
        },
        count: None,
    }
}

pub(crate) fn uniform_entry(binding: u32, min_size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(min_size),
        },
        count: None,
    }
}

/// Compile `wgsl_source` and build a single-bind-group compute pipeline.
/// The entry point is the shader function named `name`.
pub(crate) fn create_compute_pipeline(
    device: &wgpu::Device,
    name: &str,
    wgsl_source: &str,
    layout_entries: &[wgpu::BindGroupLayoutEntry],
) -> (wgpu::ComputePipeline, wgpu::BindGroupLayout) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("prism_{name}_shader")),
        source: wgpu::ShaderSource::Wgsl(wgsl_source.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("prism_{name}_layout")),
        entries: layout_entries,
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("prism_{name}_pipeline_layout")),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(&format!("prism_{name}_pipeline")),
        layout: Some(&pipeline_layout),
        module: &shader,
        entry_point: Some(name),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    });

    (pipeline, bind_group_layout)
}
