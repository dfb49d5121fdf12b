//! Adapter and device acquisition.

use crate::error::GpuError;

/// A wgpu device and queue ready for the Prism compute pipelines.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Adapter name as reported by the driver.
    pub adapter_name: String,
}

impl GpuContext {
    /// Request the default high-performance adapter and create a device.
    ///
    /// Blocks on the async wgpu calls with `pollster`.
    pub fn new() -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async())
    }

    async fn new_async() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            })
            .await?;

        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU adapter selected");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism_device"),
                required_features: crate::required_features(),
                required_limits: adapter.limits(),
                ..Default::default()
            })
            .await?;

        Ok(Self {
            device,
            queue,
            adapter_name: info.name,
        })
    }
}
