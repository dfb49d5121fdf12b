use prism_core::ScopeError;

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),
    #[error("buffer map failed: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("buffer map callback never ran")]
    MapPending,
    #[error("GPU histogram supports {supported} bins, requested {requested}")]
    UnsupportedBins { requested: usize, supported: usize },
    #[error("cannot process an empty image on the GPU")]
    EmptyImage,
    #[error("image needs a {bytes}-byte GPU buffer, device allows {limit}")]
    TooLarge { bytes: u64, limit: u64 },
    #[error(transparent)]
    Scope(#[from] ScopeError),
}
