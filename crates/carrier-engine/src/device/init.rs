/// Parameters for creating the GPU context.
///
/// This is the requested "API" of the window record: which wgpu backends to
/// try, how the swapchain presents, and what the device must support.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends wgpu may pick from.
    pub backends: wgpu::Backends,

    /// Prefer an sRGB surface format when the surface offers one.
    pub prefer_srgb: bool,

    /// Swap behavior. `Fifo` waits for vertical sync.
    pub present_mode: wgpu::PresentMode,

    /// Alpha mode preference; an unsupported value falls back to the first supported mode.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Features the device must have.
    pub required_features: wgpu::Features,

    /// Request line polygon mode when the adapter offers it (wireframe rendering).
    pub request_wireframe: bool,

    pub required_limits: wgpu::Limits,

    /// Hint only; support depends on platform and backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            request_wireframe: true,
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Features to request from an adapter offering `available`.
    pub(crate) fn features_for(&self, available: wgpu::Features) -> wgpu::Features {
        let mut features = self.required_features;
        if self.request_wireframe && available.contains(wgpu::Features::POLYGON_MODE_LINE) {
            features |= wgpu::Features::POLYGON_MODE_LINE;
        }
        features
    }
}
